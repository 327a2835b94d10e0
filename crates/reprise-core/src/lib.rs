//! # State, Effects, and Failures
//!
//! Reprise rebuilds a plain `View` tree on every composition pass. State that
//! must survive between passes lives in remembered slots; work that reaches
//! outside the tree runs in keyed effects with cleanups. There are four main
//! pieces:
//!
//! - `remember*` and `key`: lifecycle‑aware storage bound to composition.
//! - `Signal<T>`: cloneable state handle; writes schedule another pass.
//! - `disposable_effect` / `use_request`: side‑effects keyed on a value.
//! - `ErrorBoundary` / `Boundary`: capture failures raised while composing.
//!
//! ## Remembered state
//!
//! ```rust
//! use reprise_core::*;
//!
//! fn counter() -> View {
//!     let count = remember_state(|| 0); // Rc<RefCell<i32>>
//!     *count.borrow_mut() += 1;
//!     View::new(ViewKind::Text {
//!         text: format!("composed {} times", count.borrow()),
//!         color: Color::WHITE,
//!         font_size: 16.0,
//!     })
//! }
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.compose(|_| counter());
//! let frame = scheduler.compose(|_| counter());
//! assert!(matches!(&frame.root.kind, ViewKind::Text { text, .. } if text == "composed 2 times"));
//! ```
//!
//! - `remember` and `remember_state` are order‑based: the Nth call in a group
//!   always refers to the Nth stored value.
//! - `remember_with_key` is name‑based and stable across conditional branches.
//! - `key(k, || ...)` opens a child group. A group that is not composed in a
//!   pass is unmounted at the end of it: its slots go away and the cleanups
//!   registered in its scope run. Changing `k` therefore remounts the content.
//!
//! ## Effects and requests
//!
//! `disposable_effect(key, effect)` runs `effect` whenever `key` changes and
//! runs the previous cleanup first. `use_request` builds the idle / pending /
//! resolved / rejected lifecycle on top of it, with a cancel token per
//! invocation so a superseded lookup can never write its result.
//!
//! Asynchronous work completes through the task queue (`post`,
//! `post_delayed`), which the host drains with `Scheduler::pump`.
//!
//! ## Failures
//!
//! `throw(err)` inside a boundary's content unwinds to the boundary, which
//! shows its fallback until reset, either explicitly through the
//! `ResetHandle` or automatically when its reset keys change.

pub mod clock;
pub mod color;
pub mod dispatch;
pub mod effect;
pub mod error;
pub mod locals;
pub mod modifier;
pub mod prelude;
pub mod request;
pub mod runtime;
pub mod scope;
pub mod semantics;
pub mod signal;
#[cfg(test)]
mod tests;
pub mod view;

pub use clock::*;
pub use color::*;
pub use dispatch::*;
pub use effect::*;
pub use error::*;
pub use locals::*;
pub use modifier::*;
pub use request::*;
pub use runtime::*;
pub use scope::*;
pub use semantics::*;
pub use signal::*;
pub use view::*;
