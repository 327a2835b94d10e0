//! # Theming and locals
//!
//! Reprise uses thread‑local “composition locals” for parameters that a whole
//! subtree shares:
//!
//! - `Theme`: colors read by widgets.
//! - `ErrorReporter`: where error boundaries send what they capture.
//!
//! Override them for a subtree with `with_theme` and `with_error_reporter`:
//!
//! ```rust
//! use reprise_core::*;
//!
//! let light = Theme {
//!     background: Color::WHITE,
//!     on_surface: Color::from_hex("#222222"),
//!     ..Theme::default()
//! };
//!
//! with_theme(light, || {
//!     // all views composed here will see the light theme
//!     assert_eq!(theme().background, Color::WHITE);
//! });
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::{Color, ErrorInfo};

thread_local! {
    static LOCALS_STACK: RefCell<Vec<HashMap<TypeId, Box<dyn Any>>>> = RefCell::new(Vec::new());
}

fn with_locals_frame<R>(f: impl FnOnce() -> R) -> R {
    // Non-panicking frame guard (ensures pop on unwind)
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            LOCALS_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    LOCALS_STACK.with(|st| st.borrow_mut().push(HashMap::new()));
    let _guard = Guard;
    f()
}

fn set_local_boxed(t: TypeId, v: Box<dyn Any>) {
    LOCALS_STACK.with(|st| {
        if let Some(top) = st.borrow_mut().last_mut() {
            top.insert(t, v);
        }
    });
}

fn local<T: Clone + 'static>() -> Option<T> {
    LOCALS_STACK.with(|st| {
        for frame in st.borrow().iter().rev() {
            if let Some(v) = frame.get(&TypeId::of::<T>())
                && let Some(t) = v.downcast_ref::<T>()
            {
                return Some(t.clone());
            }
        }
        None
    })
}

/// Small semantic color theme read by widgets.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    /// App root background.
    pub background: Color,
    /// Default text color.
    pub on_surface: Color,
    /// Background of alert blocks.
    pub error: Color,
    pub on_error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::from_hex("#121212"),
            on_surface: Color::from_hex("#DDDDDD"),
            error: Color::from_hex("#331111"),
            on_error: Color::from_hex("#FFB4AB"),
        }
    }
}

pub fn with_theme<R>(theme: Theme, f: impl FnOnce() -> R) -> R {
    with_locals_frame(|| {
        set_local_boxed(TypeId::of::<Theme>(), Box::new(theme));
        f()
    })
}

pub fn theme() -> Theme {
    local::<Theme>().unwrap_or_default()
}

/// Diagnostic sink for failures captured by error boundaries.
pub trait ErrorReporter {
    fn report(&self, info: &ErrorInfo);
}

/// Default sink: the log.
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, info: &ErrorInfo) {
        log::error!("captured failure in '{}': {}", info.component, info.message);
    }
}

#[derive(Clone)]
struct ReporterLocal(Rc<dyn ErrorReporter>);

pub fn with_error_reporter<R>(reporter: Rc<dyn ErrorReporter>, f: impl FnOnce() -> R) -> R {
    with_locals_frame(|| {
        set_local_boxed(TypeId::of::<ReporterLocal>(), Box::new(ReporterLocal(reporter)));
        f()
    })
}

pub fn error_reporter() -> Rc<dyn ErrorReporter> {
    match local::<ReporterLocal>() {
        Some(ReporterLocal(r)) => r,
        None => Rc::new(LogReporter),
    }
}
