// ============================================================================
// nug - Subscriber List
// Ordered subscriber storage with snapshot notification
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::types::{Subscriber, Unsubscriber};

/// One registered callback.
///
/// `active` is cleared on removal so a notification pass that already took a
/// snapshot skips it.
struct Subscription<T> {
    active: Cell<bool>,
    run: Subscriber<T>,
}

/// Subscribers in insertion order.
///
/// Notification iterates a snapshot taken at the start of the pass. No borrow
/// is held while a callback runs, so callbacks may subscribe, unsubscribe or
/// trigger nested notifications on the same list.
pub(crate) struct SubscriberList<T> {
    entries: RefCell<Vec<Rc<Subscription<T>>>>,
}

impl<T: 'static> SubscriberList<T> {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            entries: RefCell::new(Vec::new()),
        })
    }

    /// Append `run` and return the handle that removes this entry.
    pub(crate) fn add(self: &Rc<Self>, run: Subscriber<T>) -> Unsubscriber {
        let entry = Rc::new(Subscription {
            active: Cell::new(true),
            run,
        });
        self.entries.borrow_mut().push(entry.clone());

        let list: Weak<Self> = Rc::downgrade(self);
        Unsubscriber::new(move || {
            entry.active.set(false);
            if let Some(list) = list.upgrade() {
                list.entries.borrow_mut().retain(|e| !Rc::ptr_eq(e, &entry));
            }
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Call every subscriber registered at the start of the pass.
    ///
    /// `current` is read again for each entry, so after a nested notification
    /// the remaining entries receive the value the nested pass left behind.
    pub(crate) fn notify(&self, current: impl Fn() -> Rc<T>) {
        let snapshot: Vec<_> = self.entries.borrow().clone();
        tracing::trace!(target: "nug::store", subscribers = snapshot.len(), "notifying subscribers");
        for entry in snapshot {
            if entry.active.get() {
                (entry.run)(&current());
            }
        }
    }
}
