//! # Error boundaries
//!
//! A boundary composes its content under `catch_unwind`. Anything raised
//! while building that subtree (a `throw(err)`, a `panic!`, an
//! `unreachable!`) is captured, reported to the current [`ErrorReporter`],
//! and replaced by the fallback view until the boundary is reset.
//!
//! ```rust,ignore
//! Boundary::new()
//!     .reset_key(name.get())
//!     .on_reset(move || name.set(String::new()))
//!     .show(
//!         |info, reset| Column(Modifier::new()).child((
//!             Text(format!("There was an error: {}", info.message)),
//!             Button("Try again", move || reset.reset()),
//!         )),
//!         move || Details(name.get()),
//!     )
//! ```
//!
//! Resetting recomposes the content in a fresh group, so every piece of state
//! remembered inside it starts over.
#![allow(non_snake_case)]

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::{View, current_group_path, error_reporter, key, remember, request_frame};

/// Payload carried by a failure raised with [`throw`].
pub struct Thrown {
    pub message: String,
    pub component: String,
    pub error: Arc<dyn Any + Send + Sync>,
}

/// Raises `error` into the nearest enclosing [`ErrorBoundary`].
///
/// The boundary hands the same value back through [`ErrorInfo::downcast_ref`].
pub fn throw<E>(error: E) -> !
where
    E: fmt::Display + Send + Sync + 'static,
{
    let thrown = Thrown {
        message: error.to_string(),
        component: current_group_path(),
        error: Arc::new(error),
    };
    panic::panic_any(thrown)
}

/// What a boundary captured.
#[derive(Clone)]
pub struct ErrorInfo {
    pub message: String,
    /// Composition group path where the failure was raised.
    pub component: String,
    payload: Option<Arc<dyn Any + Send + Sync>>,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            component: component.into(),
            payload: None,
        }
    }

    fn from_panic(payload: Box<dyn Any + Send>, boundary: &str) -> Self {
        let payload = match payload.downcast::<Thrown>() {
            Ok(thrown) => {
                return Self {
                    message: thrown.message,
                    component: thrown.component,
                    payload: Some(thrown.error),
                };
            }
            Err(other) => other,
        };
        let message = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "Unknown panic".to_string()
        };
        Self::new(message, boundary)
    }

    /// The value passed to [`throw`], if that is how the failure was raised.
    pub fn downcast_ref<E: 'static>(&self) -> Option<&E> {
        self.payload.as_deref()?.downcast_ref::<E>()
    }

    /// Whether this failure came from [`throw`] rather than a plain panic.
    pub fn is_thrown(&self) -> bool {
        self.payload.is_some()
    }
}

impl fmt::Debug for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorInfo")
            .field("message", &self.message)
            .field("component", &self.component)
            .field("thrown", &self.is_thrown())
            .finish()
    }
}

/// One element of a boundary's reset keys, compared by value.
pub trait ResetKey: fmt::Debug + 'static {
    fn as_any(&self) -> &dyn Any;
    fn same_as(&self, other: &dyn ResetKey) -> bool;
}

impl<T: PartialEq + fmt::Debug + 'static> ResetKey for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn same_as(&self, other: &dyn ResetKey) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }
}

pub type ResetKeys = SmallVec<[Rc<dyn ResetKey>; 2]>;

/// Shallow comparison: different length or any differing element.
pub fn reset_keys_changed(prev: &[Rc<dyn ResetKey>], next: &[Rc<dyn ResetKey>]) -> bool {
    prev.len() != next.len()
        || prev
            .iter()
            .zip(next.iter())
            .any(|(a, b)| !a.same_as(b.as_ref()))
}

#[derive(Default)]
struct BoundaryState {
    captured: Option<ErrorInfo>,
    keys: ResetKeys,
    generation: u64,
}

impl BoundaryState {
    fn clear(&mut self) {
        self.captured = None;
        self.generation += 1;
    }
}

/// Handed to fallbacks; clears the boundary and recomposes its content.
#[derive(Clone)]
pub struct ResetHandle {
    state: Rc<RefCell<BoundaryState>>,
    on_reset: Option<Rc<dyn Fn()>>,
}

impl ResetHandle {
    pub fn reset(&self) {
        if self.state.borrow().captured.is_none() {
            return;
        }
        self.state.borrow_mut().clear();
        log::debug!("error boundary: reset");
        if let Some(on_reset) = &self.on_reset {
            on_reset();
        }
        request_frame();
    }
}

type KeysChanged = Rc<dyn Fn(&[Rc<dyn ResetKey>], &[Rc<dyn ResetKey>])>;

/// Configurable error boundary.
#[derive(Default)]
pub struct Boundary {
    keys: ResetKeys,
    on_reset: Option<Rc<dyn Fn()>>,
    on_reset_keys_change: Option<KeysChanged>,
}

impl Boundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reset key. While capturing, any change in the key list resets
    /// the boundary on the next pass.
    pub fn reset_key<K: PartialEq + fmt::Debug + 'static>(mut self, key: K) -> Self {
        self.keys.push(Rc::new(key));
        self
    }

    /// Called after an explicit reset from the fallback.
    pub fn on_reset(mut self, f: impl Fn() + 'static) -> Self {
        self.on_reset = Some(Rc::new(f));
        self
    }

    /// Called when a key change resets the boundary, with the old and new keys.
    pub fn on_reset_keys_change(
        mut self,
        f: impl Fn(&[Rc<dyn ResetKey>], &[Rc<dyn ResetKey>]) + 'static,
    ) -> Self {
        self.on_reset_keys_change = Some(Rc::new(f));
        self
    }

    pub fn show(
        self,
        fallback: impl Fn(&ErrorInfo, ResetHandle) -> View + 'static,
        content: impl Fn() -> View + 'static,
    ) -> View {
        let state = remember(|| RefCell::new(BoundaryState::default()));
        let path = current_group_path();

        {
            let mut s = state.borrow_mut();
            let prev = std::mem::replace(&mut s.keys, self.keys.clone());
            if s.captured.is_some() && reset_keys_changed(&prev, &self.keys) {
                s.clear();
                drop(s);
                log::debug!("error boundary: reset keys changed, {:?} -> {:?}", prev, self.keys);
                if let Some(f) = &self.on_reset_keys_change {
                    f(&prev, &self.keys);
                }
            }
        }

        let handle = ResetHandle {
            state: Rc::clone(&state),
            on_reset: self.on_reset.clone(),
        };

        let captured = state.borrow().captured.clone();
        if let Some(info) = captured {
            return fallback(&info, handle);
        }

        let generation = state.borrow().generation;
        let outcome = catch_unwind(AssertUnwindSafe(|| key(format!("eb{generation}"), &content)));
        match outcome {
            Ok(view) => view,
            Err(payload) => {
                let info = ErrorInfo::from_panic(payload, &path);
                log::debug!(
                    "error boundary at '{}' caught: {} (raised in '{}')",
                    path,
                    info.message,
                    info.component
                );
                error_reporter().report(&info);
                state.borrow_mut().captured = Some(info.clone());
                // One more pass unmounts what was left of the failed subtree.
                request_frame();
                fallback(&info, handle)
            }
        }
    }
}

/// Boundary without reset keys or reset notification.
pub fn ErrorBoundary(
    fallback: impl Fn(&ErrorInfo, ResetHandle) -> View + 'static,
    content: impl Fn() -> View + 'static,
) -> View {
    Boundary::new().show(fallback, content)
}

/// Routes panic messages to the log. Failures raised with [`throw`] are
/// expected and stay quiet; the boundary that catches them logs instead.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        if let Some(thrown) = info.payload().downcast_ref::<Thrown>() {
            log::debug!("thrown from '{}': {}", thrown.component, thrown.message);
            return;
        }
        let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        match info.location() {
            Some(loc) => log::error!("panic at {}:{}: {}", loc.file(), loc.line(), message),
            None => log::error!("panic: {}", message),
        }
    }));
}
