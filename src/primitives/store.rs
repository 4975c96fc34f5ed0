// ============================================================================
// nug - Stores
// Readable and writable value holders with synchronous notification
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::subscribers::SubscriberList;
use crate::core::types::{Observable, SubscribeOptions, Subscriber, Unsubscriber};

// =============================================================================
// STORE INNER
// =============================================================================

/// Value cell plus subscriber list shared by the store handles.
///
/// The value sits behind an `Rc` so a notification pass can hand out `&T`
/// without holding the `RefCell` borrow, which lets subscribers call `set`
/// on the same store.
pub(crate) struct StoreInner<T> {
    value: RefCell<Rc<T>>,
    subscribers: Rc<SubscriberList<T>>,
}

impl<T: 'static> StoreInner<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            value: RefCell::new(Rc::new(value)),
            subscribers: SubscriberList::new(),
        }
    }

    pub(crate) fn current(&self) -> Rc<T> {
        self.value.borrow().clone()
    }

    pub(crate) fn subscribe_with(
        &self,
        run: Subscriber<T>,
        options: SubscribeOptions,
    ) -> Unsubscriber {
        let unsubscribe = self.subscribers.add(run.clone());
        if options.initial {
            run(&self.current());
        }
        unsubscribe
    }

    /// Replace the value and notify everyone registered at this point.
    pub(crate) fn replace(&self, value: T) {
        *self.value.borrow_mut() = Rc::new(value);
        self.subscribers.notify(|| self.current());
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

// =============================================================================
// READABLE
// =============================================================================

/// A store that can be observed but not set from the outside.
///
/// Either a constant built with [`readable`], or a read-only view of a
/// [`Writable`] obtained with [`Writable::readonly`].
///
/// # Example
///
/// ```
/// use nug::readable;
///
/// let greeting = readable("hello");
/// assert_eq!(greeting.get(), "hello");
/// ```
pub struct Readable<T> {
    inner: Rc<StoreInner<T>>,
}

impl<T> Clone for Readable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Readable<T> {
    /// Create a store holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StoreInner::new(value)),
        }
    }

    /// Get the current value (cloning).
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        T::clone(&self.inner.current())
    }

    /// Access the current value with a closure (avoids cloning).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.current())
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }

    /// Whether both handles observe the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> Observable for Readable<T> {
    type Value = T;

    fn subscribe_with(&self, run: Subscriber<T>, options: SubscribeOptions) -> Unsubscriber {
        self.inner.subscribe_with(run, options)
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Readable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Readable")
            .field("value", &self.inner.current())
            .finish()
    }
}

// =============================================================================
// WRITABLE
// =============================================================================

/// A store whose value is replaced with [`set`](Self::set) or
/// [`update`](Self::update).
///
/// Every write notifies all subscribers synchronously, in subscription order,
/// whether or not the value is equal to the previous one.
///
/// # Example
///
/// ```
/// use nug::{writable, Observable};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let count = writable(0);
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let seen_clone = seen.clone();
///
/// let unsubscribe = count.subscribe(move |n| seen_clone.borrow_mut().push(*n));
/// count.set(1);
/// count.update(|n| n + 1);
/// unsubscribe.unsubscribe();
/// count.set(10);
///
/// assert_eq!(*seen.borrow(), vec![0, 1, 2]);
/// ```
pub struct Writable<T> {
    inner: Rc<StoreInner<T>>,
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Writable<T> {
    /// Create a store holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StoreInner::new(value)),
        }
    }

    /// Get the current value (cloning).
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        T::clone(&self.inner.current())
    }

    /// Access the current value with a closure (avoids cloning).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.current())
    }

    /// Replace the value and notify every subscriber.
    pub fn set(&self, value: T) {
        self.inner.replace(value);
    }

    /// Set the value to `f(current)`.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.inner.current());
        self.set(next);
    }

    /// A read-only handle to the same store.
    pub fn readonly(&self) -> Readable<T> {
        Readable {
            inner: self.inner.clone(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }
}

impl<T: 'static> Observable for Writable<T> {
    type Value = T;

    fn subscribe_with(&self, run: Subscriber<T>, options: SubscribeOptions) -> Unsubscriber {
        self.inner.subscribe_with(run, options)
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writable")
            .field("value", &self.inner.current())
            .finish()
    }
}

// =============================================================================
// CREATION FUNCTIONS
// =============================================================================

/// Create a constant store.
pub fn readable<T: 'static>(value: T) -> Readable<T> {
    Readable::new(value)
}

/// Create a writable store.
pub fn writable<T: 'static>(value: T) -> Writable<T> {
    Writable::new(value)
}

// =============================================================================
// TESTS
// =============================================================================
