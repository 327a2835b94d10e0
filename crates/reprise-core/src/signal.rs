use std::cell::RefCell;
use std::rc::Rc;

use crate::request_frame;

/// Observable value. Writes schedule a recomposition.
#[derive(Clone)]
pub struct Signal<T: 'static>(Rc<RefCell<T>>);

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().clone()
    }
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow())
    }
    pub fn set(&self, v: T) {
        *self.0.borrow_mut() = v;
        request_frame();
    }
    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        f(&mut self.0.borrow_mut());
        request_frame();
    }
}

impl<T: PartialEq> Signal<T> {
    /// Writes only when the value differs; returns whether it did.
    pub fn set_if_changed(&self, v: T) -> bool {
        if *self.0.borrow() == v {
            return false;
        }
        self.set(v);
        true
    }
}

pub fn signal<T>(t: T) -> Signal<T> {
    Signal::new(t)
}
