// ============================================================================
// nug - Ergonomic Macros
// ============================================================================

/// Clone variables into a move closure.
///
/// Saves the manual `let x = x.clone();` lines before handing stores or
/// shared state to a subscriber or render function.
///
/// # Usage
///
/// ```rust
/// use nug::{cloned, writable, Observable};
///
/// let count = writable(0);
/// let seen = writable(Vec::new());
///
/// let unsubscribe = count.subscribe(cloned!(seen => move |n: &i32| {
///     seen.update(|all| [all.as_slice(), &[*n]].concat())
/// }));
/// count.set(1);
/// assert_eq!(seen.get(), vec![0, 1]);
/// unsubscribe.unsubscribe();
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}

/// Derive a store from named stores.
///
/// Each name is cloned as an input and rebound to its current value inside
/// the body.
///
/// # Usage
///
/// ```rust
/// use nug::writable;
///
/// let width = writable(3);
/// let height = writable(4);
///
/// let area = nug::derived!(width, height => width * height);
/// assert_eq!(area.get(), 12);
///
/// width.set(5);
/// assert_eq!(area.get(), 20);
/// ```
#[macro_export]
macro_rules! derived {
    ($($store:ident),+ => $body:expr) => {
        $crate::derived(
            ($($store.clone(),)+),
            move |($($store,)+)| $body,
        )
    };
}
