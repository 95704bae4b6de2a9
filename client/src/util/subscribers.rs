//! Handler registry with RAII unsubscription.
//!
//! SYSTEM CONTEXT
//! ==============
//! Backs the identity provider's session-change stream and the session
//! mirror's observer list. Everything runs on the single browser event loop,
//! so handlers are held in `Rc` and dispatch clones the handler list first:
//! a handler may subscribe or unsubscribe while a delivery is in progress.

#[cfg(test)]
#[path = "subscribers_test.rs"]
mod subscribers_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Handler<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: u64,
    handlers: Vec<(u64, Handler<T>)>,
}

/// A set of handlers notified with `&T` on every [`Subscribers::emit`].
pub struct Subscribers<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for Subscribers<T> {
    fn clone(&self) -> Self {
        Self { registry: Rc::clone(&self.registry) }
    }
}

impl<T: 'static> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Subscribers<T> {
    pub fn new() -> Self {
        Self { registry: Rc::new(RefCell::new(Registry { next_id: 0, handlers: Vec::new() })) }
    }

    /// Register `handler`; it stays registered until the returned guard drops.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.handlers.push((id, Rc::new(handler)));
            id
        };
        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.borrow_mut().handlers.retain(|(hid, _)| *hid != id);
            }
        })
    }

    /// Deliver `value` to every handler registered at the time of the call.
    pub fn emit(&self, value: &T) {
        let handlers: Vec<Handler<T>> = self.registry.borrow().handlers.iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in handlers {
            handler(value);
        }
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registration guard. Dropping it (or calling [`Subscription::unsubscribe`])
/// deregisters the handler; repeated teardown is a no-op.
#[must_use = "dropping a Subscription immediately unsubscribes the handler"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new<F>(unsubscribe: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self { unsubscribe: Some(Box::new(unsubscribe)) }
    }

    pub fn unsubscribe(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.unsubscribe.is_some()).finish()
    }
}
