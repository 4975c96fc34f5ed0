// ============================================================================
// nug - Core Types
// The observable capability shared by every store
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

// =============================================================================
// CALLBACK TYPES
// =============================================================================

/// A subscriber callback. Receives the store's value on every notification.
pub type Subscriber<T> = Rc<dyn Fn(&T)>;

/// Options for [`Observable::subscribe_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Deliver the current value synchronously before `subscribe_with` returns.
    pub initial: bool,
}

impl SubscribeOptions {
    /// Subscribe without the initial delivery.
    pub const fn skip_initial() -> Self {
        Self { initial: false }
    }
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self { initial: true }
    }
}

// =============================================================================
// UNSUBSCRIBER
// =============================================================================

/// Handle returned by every subscribe call.
///
/// Calling [`unsubscribe`](Self::unsubscribe) removes exactly the subscription
/// that produced it. Further calls do nothing. Dropping the handle does NOT
/// unsubscribe.
#[must_use = "dropping an Unsubscriber leaves the subscription in place"]
pub struct Unsubscriber {
    release: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Unsubscriber {
    /// Wrap a release function.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Cell::new(Some(Box::new(release))),
        }
    }

    /// An unsubscriber with nothing to release.
    pub fn noop() -> Self {
        Self {
            release: Cell::new(None),
        }
    }

    /// Remove the subscription. Idempotent.
    pub fn unsubscribe(&self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Whether the subscription has already been released.
    pub fn is_released(&self) -> bool {
        let release = self.release.take();
        let released = release.is_none();
        self.release.set(release);
        released
    }
}

impl std::fmt::Debug for Unsubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscriber")
            .field("released", &self.is_released())
            .finish()
    }
}

// =============================================================================
// OBSERVABLE
// =============================================================================

/// A holder of a current value that notifies subscribers when it changes.
///
/// Implemented by [`Readable`](crate::Readable), [`Writable`](crate::Writable),
/// [`Derived`](crate::Derived) and [`Chunks`](crate::Chunks). The trait is
/// object safe, so `Rc<dyn Observable<Value = T>>` can stand in for any of them.
pub trait Observable {
    /// The value type delivered to subscribers.
    type Value: 'static;

    /// Register `run`, optionally delivering the current value first.
    fn subscribe_with(&self, run: Subscriber<Self::Value>, options: SubscribeOptions)
    -> Unsubscriber;

    /// Register `run` with initial delivery.
    fn subscribe(&self, run: impl Fn(&Self::Value) + 'static) -> Unsubscriber
    where
        Self: Sized,
    {
        self.subscribe_with(Rc::new(run), SubscribeOptions::default())
    }
}

/// Read the current value of any store.
///
/// Subscribes with initial delivery, captures the value and unsubscribes
/// immediately, so no subscription outlives the call.
///
/// # Example
///
/// ```
/// use nug::{get, writable};
///
/// let count = writable(3);
/// assert_eq!(get(&count), 3);
/// ```
pub fn get<S>(store: &S) -> S::Value
where
    S: Observable + ?Sized,
    S::Value: Clone,
{
    let captured = Rc::new(Cell::new(None));
    let slot = captured.clone();
    let unsubscribe = store.subscribe_with(
        Rc::new(move |value: &S::Value| slot.set(Some(value.clone()))),
        SubscribeOptions::default(),
    );
    unsubscribe.unsubscribe();
    captured
        .take()
        .unwrap_or_else(|| unreachable!("observable skipped the initial delivery"))
}

// =============================================================================
// WATCH - type-erased change notification
// =============================================================================

/// A store observed only for the fact that it changed.
///
/// Components hold heterogeneous watched stores as `Rc<dyn Watch>`.
pub trait Watch {
    /// Call `run` on every notification.
    fn watch(&self, run: Rc<dyn Fn()>, options: SubscribeOptions) -> Unsubscriber;
}

impl<S: Observable + ?Sized> Watch for S {
    fn watch(&self, run: Rc<dyn Fn()>, options: SubscribeOptions) -> Unsubscriber {
        self.subscribe_with(Rc::new(move |_: &S::Value| run()), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsubscriber_runs_release_once() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let unsub = Unsubscriber::new(move || calls_clone.set(calls_clone.get() + 1));

        assert!(!unsub.is_released());
        unsub.unsubscribe();
        unsub.unsubscribe();

        assert_eq!(calls.get(), 1);
        assert!(unsub.is_released());
    }

    #[test]
    fn default_options_deliver_initial_value() {
        assert!(SubscribeOptions::default().initial);
        assert!(!SubscribeOptions::skip_initial().initial);
    }
}
