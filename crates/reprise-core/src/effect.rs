//! Keyed side effects and their cleanups.

use std::cell::RefCell;
use std::rc::Rc;

use crate::remember;
use crate::scope::register_cleanup;

/// Single-shot cleanup handle. Clones share the same cleanup.
#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    pub fn none() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    /// Whether the cleanup is still waiting to run.
    pub fn is_armed(&self) -> bool {
        self.0.borrow().is_some()
    }

    /// Runs the cleanup at most once across all clones.
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }
}

pub fn on_unmount(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

struct EffectSlot<K> {
    key: Option<K>,
    cleanup: Dispose,
}

/// Runs `effect` when `key` changes; the previous cleanup runs first.
///
/// The effect runs synchronously during composition, so state it writes is
/// visible to the rest of the current pass. The last cleanup runs when the
/// enclosing group is unmounted.
pub fn disposable_effect<K: PartialEq + Clone + 'static>(
    key: K,
    effect: impl FnOnce(&K) -> Dispose + 'static,
) {
    // Slot-based. Wrap callers in `key()` for branch stability.
    let mut first = false;
    let slot = remember(|| {
        first = true;
        RefCell::new(EffectSlot::<K> {
            key: None,
            cleanup: Dispose::none(),
        })
    });

    if first {
        let slot = slot.clone();
        register_cleanup(on_unmount(move || {
            let cleanup = slot.borrow().cleanup.clone();
            cleanup.run();
        }));
    }

    if slot.borrow().key.as_ref() == Some(&key) {
        return;
    }
    let prev = slot.borrow().cleanup.clone();
    prev.run();

    let cleanup = effect(&key);
    let mut s = slot.borrow_mut();
    s.key = Some(key);
    s.cleanup = cleanup;
}
