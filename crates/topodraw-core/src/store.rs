//! Observable state holders.
//!
//! Each engine keeps its published state in a [`Store`]. Listeners are
//! notified synchronously, on the calling thread, after every accepted
//! mutation.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A state change listener.
pub type Listener<T> = Rc<dyn Fn(&T)>;

type ListenerList<T> = Rc<RefCell<Vec<Listener<T>>>>;

/// A value with subscribers.
pub struct Store<T> {
    value: T,
    listeners: ListenerList<T>,
}

impl<T: Clone> Store<T> {
    /// Create a store holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Get a copy of the current value.
    pub fn get_current(&self) -> T {
        self.value.clone()
    }

    /// Replace the value and notify listeners.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.notify();
    }

    /// Mutate the value in place and notify listeners.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.notify();
    }
}

impl<T> Store<T> {
    /// Borrow the current value.
    pub fn current(&self) -> &T {
        &self.value
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription<T> {
        let listener: Listener<T> = Rc::new(listener);
        self.listeners.borrow_mut().push(Rc::clone(&listener));
        Subscription {
            listener,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Number of live listeners.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn notify(&self) {
        // Listeners may subscribe or unsubscribe while being notified.
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&self.value);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.value)
            .field("subscribers", &self.listeners.borrow().len())
            .finish()
    }
}

/// Handle returned by [`Store::subscribe`]; unsubscribes on drop.
pub struct Subscription<T> {
    listener: Listener<T>,
    listeners: Weak<RefCell<Vec<Listener<T>>>>,
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .borrow_mut()
                .retain(|item| !Rc::ptr_eq(item, &self.listener));
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
