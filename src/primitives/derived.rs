// ============================================================================
// nug - Derived Stores
// Values recomputed from one or more upstream stores
// ============================================================================
//
// A Derived subscribes to each upstream without initial delivery. Whichever
// upstream fires, the combiner re-reads ALL upstream values, so a recompute
// never mixes a fresh value with a stale cached one. There is no equality
// check: every upstream notification produces exactly one downstream
// notification.
// ============================================================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::core::types::{get, Observable, SubscribeOptions, Subscriber, Unsubscriber, Watch};
use crate::primitives::store::StoreInner;

// =============================================================================
// STORES - the set of upstream inputs
// =============================================================================

/// A fixed set of upstream stores a [`Derived`] reads from.
///
/// Implemented for tuples of up to six stores (each with its own value type)
/// and for `Vec<S>` of same-typed stores.
pub trait Stores: 'static {
    /// The values handed to the combiner, in the same shape as the stores.
    type Values;

    /// Read every store's current value.
    fn current(&self) -> Self::Values;

    /// Subscribe `run` to every store.
    fn watch_all(&self, run: &Rc<dyn Fn()>, options: SubscribeOptions) -> Vec<Unsubscriber>;
}

macro_rules! impl_stores_for_tuple {
    ($($store:ident => $idx:tt),+) => {
        impl<$($store),+> Stores for ($($store,)+)
        where
            $($store: Observable + 'static, $store::Value: Clone,)+
        {
            type Values = ($($store::Value,)+);

            fn current(&self) -> Self::Values {
                ($(get(&self.$idx),)+)
            }

            fn watch_all(&self, run: &Rc<dyn Fn()>, options: SubscribeOptions) -> Vec<Unsubscriber> {
                vec![$(self.$idx.watch(run.clone(), options)),+]
            }
        }
    };
}

impl_stores_for_tuple!(A => 0);
impl_stores_for_tuple!(A => 0, B => 1);
impl_stores_for_tuple!(A => 0, B => 1, C => 2);
impl_stores_for_tuple!(A => 0, B => 1, C => 2, D => 3);
impl_stores_for_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4);
impl_stores_for_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);

impl<S> Stores for Vec<S>
where
    S: Observable + 'static,
    S::Value: Clone,
{
    type Values = Vec<S::Value>;

    fn current(&self) -> Self::Values {
        self.iter().map(|store| get(store)).collect()
    }

    fn watch_all(&self, run: &Rc<dyn Fn()>, options: SubscribeOptions) -> Vec<Unsubscriber> {
        self.iter()
            .map(|store| store.watch(run.clone(), options))
            .collect()
    }
}

// =============================================================================
// DERIVED INNER
// =============================================================================

struct DerivedInner<T> {
    store: StoreInner<T>,

    /// Subscriptions to every upstream store, owned exclusively by this derived
    upstream: RefCell<Vec<Unsubscriber>>,
}

impl<T> DerivedInner<T> {
    fn release_upstream(&self) {
        let upstream: Vec<_> = self.upstream.borrow_mut().drain(..).collect();
        for unsubscribe in upstream {
            unsubscribe.unsubscribe();
        }
    }
}

impl<T> Drop for DerivedInner<T> {
    fn drop(&mut self) {
        self.release_upstream();
    }
}

// =============================================================================
// DERIVED<T> - The public handle
// =============================================================================

/// A read-only store computed from upstream stores.
///
/// Handles are cheap to clone and share one computation. The upstream
/// subscriptions are released by [`destroy`](Self::destroy) or when the last
/// handle is dropped.
///
/// # Example
///
/// ```
/// use nug::{derived, writable};
///
/// let width = writable(2);
/// let height = writable(3);
/// let area = derived((width.clone(), height.clone()), |(w, h)| w * h);
///
/// assert_eq!(area.get(), 6);
/// width.set(5);
/// assert_eq!(area.get(), 15);
/// ```
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Derived<T> {
    /// Build a derived store. The combiner runs once now, without notifying.
    pub fn new<S, F>(stores: S, combine: F) -> Self
    where
        S: Stores,
        F: Fn(S::Values) -> T + 'static,
    {
        let initial = combine(stores.current());
        let inner = Rc::new(DerivedInner {
            store: StoreInner::new(initial),
            upstream: RefCell::new(Vec::new()),
        });

        let weak: Weak<DerivedInner<T>> = Rc::downgrade(&inner);
        let stores = Rc::new(stores);
        let recompute: Rc<dyn Fn()> = {
            let stores = stores.clone();
            Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.store.replace(combine(stores.current()));
                }
            })
        };

        let upstream = stores.watch_all(&recompute, SubscribeOptions::skip_initial());
        tracing::trace!(target: "nug::store", upstream = upstream.len(), "derived store created");
        *inner.upstream.borrow_mut() = upstream;

        Self { inner }
    }

    /// Get the current value (cloning).
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        T::clone(&self.inner.store.current())
    }

    /// Access the current value with a closure (avoids cloning).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.store.current())
    }

    /// Unsubscribe from every upstream store. The value freezes at its last
    /// computation. Idempotent.
    pub fn destroy(&self) {
        self.inner.release_upstream();
    }

    /// Number of live downstream subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.store.subscriber_count()
    }
}

impl<T: 'static> Observable for Derived<T> {
    type Value = T;

    fn subscribe_with(&self, run: Subscriber<T>, options: SubscribeOptions) -> Unsubscriber {
        self.inner.store.subscribe_with(run, options)
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derived")
            .field("value", &self.inner.store.current())
            .field("upstream", &self.inner.upstream.borrow().len())
            .finish()
    }
}

/// Create a derived store from a tuple or `Vec` of upstream stores.
pub fn derived<S, T, F>(stores: S, combine: F) -> Derived<T>
where
    S: Stores,
    T: 'static,
    F: Fn(S::Values) -> T + 'static,
{
    Derived::new(stores, combine)
}

// =============================================================================
// TESTS
// =============================================================================
