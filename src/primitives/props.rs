// ============================================================================
// nug - Component Props
// Props are statically either plain values or observable stores
// ============================================================================

use std::rc::Rc;

use crate::core::types::{get, Observable, SubscribeOptions, Unsubscriber, Watch};
use crate::primitives::derived::Derived;
use crate::primitives::store::{Readable, Writable};

// =============================================================================
// PROP - A value that can be static or observable
// =============================================================================

/// A component prop.
///
/// The choice between a plain value and a store is made when the props are
/// built, so a component knows which inputs to subscribe to without
/// inspecting values at runtime.
///
/// # Example
///
/// ```
/// use nug::{writable, Prop};
///
/// let title = Prop::value("Inbox".to_string());
/// let unread = writable(3);
/// let count: Prop<i32> = unread.clone().into();
///
/// assert_eq!(title.get(), "Inbox");
/// assert!(count.is_observable());
///
/// unread.set(4);
/// assert_eq!(count.get(), 4);
/// ```
pub enum Prop<T: 'static> {
    /// A plain value fixed for the lifetime of the component.
    Value(T),

    /// A store; the component re-renders whenever it notifies.
    Store(Rc<dyn Observable<Value = T>>),
}

impl<T: 'static> Prop<T> {
    /// Create a plain-value prop.
    pub fn value(value: T) -> Self {
        Prop::Value(value)
    }

    /// Create a prop backed by any store.
    pub fn store(store: impl Observable<Value = T> + 'static) -> Self {
        Prop::Store(Rc::new(store))
    }

    /// The current value: the plain value, or the store's current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        match self {
            Prop::Value(v) => v.clone(),
            Prop::Store(s) => get(&**s),
        }
    }

    /// Whether this prop is backed by a store.
    pub fn is_observable(&self) -> bool {
        matches!(self, Prop::Store(_))
    }

    /// Subscribe `run` if this prop is backed by a store.
    pub fn watch(&self, run: &Rc<dyn Fn()>, options: SubscribeOptions) -> Option<Unsubscriber> {
        match self {
            Prop::Value(_) => None,
            Prop::Store(s) => Some(s.watch(run.clone(), options)),
        }
    }
}

impl<T: Clone + 'static> Clone for Prop<T> {
    fn clone(&self) -> Self {
        match self {
            Prop::Value(v) => Prop::Value(v.clone()),
            Prop::Store(s) => Prop::Store(s.clone()),
        }
    }
}

impl<T: 'static> From<Writable<T>> for Prop<T> {
    fn from(store: Writable<T>) -> Self {
        Prop::store(store)
    }
}

impl<T: 'static> From<Readable<T>> for Prop<T> {
    fn from(store: Readable<T>) -> Self {
        Prop::store(store)
    }
}

impl<T: 'static> From<Derived<T>> for Prop<T> {
    fn from(store: Derived<T>) -> Self {
        Prop::store(store)
    }
}

impl<T: std::fmt::Debug + Clone + 'static> std::fmt::Debug for Prop<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prop::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Prop::Store(_) => f.debug_tuple("Store").field(&self.get()).finish(),
        }
    }
}

// =============================================================================
// COMPONENT PROPS
// =============================================================================

/// The props type of a component.
///
/// `watch_props` subscribes `run` to every observable prop and returns the
/// subscriptions. Plain values contribute nothing.
///
/// Implemented for `()`, [`Prop<T>`] and tuples of up to four props types.
/// Struct props implement it by forwarding to their [`Prop`] fields:
///
/// ```
/// use nug::{ComponentProps, Prop, SubscribeOptions, Unsubscriber};
/// use std::rc::Rc;
///
/// struct BadgeProps {
///     label: Prop<String>,
///     count: Prop<u32>,
/// }
///
/// impl ComponentProps for BadgeProps {
///     fn watch_props(&self, run: &Rc<dyn Fn()>, options: SubscribeOptions) -> Vec<Unsubscriber> {
///         self.label
///             .watch(run, options)
///             .into_iter()
///             .chain(self.count.watch(run, options))
///             .collect()
///     }
/// }
/// ```
pub trait ComponentProps: 'static {
    /// Subscribe `run` to every observable prop.
    fn watch_props(&self, run: &Rc<dyn Fn()>, options: SubscribeOptions) -> Vec<Unsubscriber>;
}

impl ComponentProps for () {
    fn watch_props(&self, _run: &Rc<dyn Fn()>, _options: SubscribeOptions) -> Vec<Unsubscriber> {
        Vec::new()
    }
}

impl<T: 'static> ComponentProps for Prop<T> {
    fn watch_props(&self, run: &Rc<dyn Fn()>, options: SubscribeOptions) -> Vec<Unsubscriber> {
        self.watch(run, options).into_iter().collect()
    }
}

macro_rules! impl_component_props_for_tuple {
    ($($props:ident => $idx:tt),+) => {
        impl<$($props: ComponentProps),+> ComponentProps for ($($props,)+) {
            fn watch_props(&self, run: &Rc<dyn Fn()>, options: SubscribeOptions) -> Vec<Unsubscriber> {
                let mut subscriptions = Vec::new();
                $(subscriptions.extend(self.$idx.watch_props(run, options));)+
                subscriptions
            }
        }
    };
}

impl_component_props_for_tuple!(A => 0);
impl_component_props_for_tuple!(A => 0, B => 1);
impl_component_props_for_tuple!(A => 0, B => 1, C => 2);
impl_component_props_for_tuple!(A => 0, B => 1, C => 2, D => 3);

// =============================================================================
// TESTS
// =============================================================================
