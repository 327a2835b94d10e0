use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::{Dispose, remember};

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = const { RefCell::new(None) };
}

/// Owner of cleanups for one composition group.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                disposers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        // Restores the previous scope even if `f` unwinds.
        struct Restore(Option<Weak<ScopeInner>>);
        impl Drop for Restore {
            fn drop(&mut self) {
                let prev = self.0.take();
                CURRENT_SCOPE.with(|current| *current.borrow_mut() = prev);
            }
        }

        let prev = CURRENT_SCOPE.with(|current| {
            current
                .borrow_mut()
                .replace(Rc::downgrade(&self.inner))
        });
        let _restore = Restore(prev);
        f()
    }

    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    pub fn pending_disposers(&self) -> usize {
        self.inner.disposers.borrow().len()
    }

    pub fn dispose(self) {
        let disposers = std::mem::take(&mut *self.inner.disposers.borrow_mut());
        // Last registered, first cleaned up.
        for disposer in disposers.into_iter().rev() {
            disposer();
        }
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade().map(|inner| Scope { inner }))
    })
}

/// Runs `f` the first time this call site is composed in its group and
/// registers the returned cleanup with the group's scope. Later passes skip
/// `f`; the cleanup runs once, when the group is unmounted.
pub fn scoped_effect<F>(f: F)
where
    F: FnOnce() -> Dispose + 'static,
{
    let ran = remember(|| Cell::new(false));
    if ran.replace(true) {
        return;
    }
    register_cleanup(f());
}

/// Hands `cleanup` to the current scope, if there is one.
pub(crate) fn register_cleanup(cleanup: Dispose) {
    if let Some(scope) = current_scope() {
        scope.add_disposer(move || cleanup.run());
    } else {
        log::debug!("scoped_effect: no current scope; cleanup will never run");
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers.into_iter().rev() {
            disposer();
        }
    }
}
