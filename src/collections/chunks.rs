// ============================================================================
// nug - Chunked Lists
// Split an observable list into fixed-size, independently notified chunks
// ============================================================================
//
// Two levels of notification:
//
// 1. Chunk stores: a chunk notifies only when the keyed identity of its own
//    slice changes. Consumers of one chunk never hear about edits elsewhere.
// 2. Chunk list: notifies only when chunks are added or removed (and on the
//    first settle), so the list-level consumer remounts on structural churn
//    alone.
//
// Chunk stores are mutated in place, never replaced, so anything subscribed
// to a chunk keeps its subscription across edits.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::error::{NugError, Result};
use crate::core::subscribers::SubscriberList;
use crate::core::types::{Observable, SubscribeOptions, Subscriber, Unsubscriber};
use crate::primitives::store::{Readable, Writable};

/// A read-only view of one chunk's slice of the source list.
pub type Chunk<T> = Readable<Vec<T>>;

// =============================================================================
// OPTIONS
// =============================================================================

/// Configuration for [`derive_chunks`].
pub struct ChunkOptions<S, F> {
    /// The source list store.
    pub store: S,

    /// Identity of an item. Must be a pure function of the item.
    pub get_key: F,

    /// Maximum items per chunk. Must be positive.
    pub chunk_size: usize,
}

impl<S, F> ChunkOptions<S, F> {
    pub fn new(store: S, get_key: F, chunk_size: usize) -> Self {
        Self {
            store,
            get_key,
            chunk_size,
        }
    }
}

// =============================================================================
// CHUNKS INNER
// =============================================================================

struct ChunksInner<T: 'static> {
    source: Rc<dyn Observable<Value = Vec<T>>>,
    same_key: Box<dyn Fn(&T, &T) -> bool>,
    chunk_size: usize,

    /// Chunk stores, index i covering source[i * chunk_size ..]
    chunks: RefCell<Vec<Writable<Vec<T>>>>,

    /// Chunk-list subscribers
    subscribers: Rc<SubscriberList<Vec<Chunk<T>>>>,

    /// Upstream subscription, present while there is at least one subscriber
    upstream: RefCell<Option<Unsubscriber>>,

    /// Whether the current upstream subscription has settled once
    settled: Cell<bool>,

    /// Bumped by every settle; a change seen mid-settle means a nested
    /// settle already reconciled the chunks with a newer source list
    generation: Cell<u64>,

    /// A structural change not yet announced to chunk-list subscribers
    structural: Cell<bool>,
}

impl<T: Clone + 'static> ChunksInner<T> {
    fn snapshot(&self) -> Vec<Chunk<T>> {
        self.chunks.borrow().iter().map(Writable::readonly).collect()
    }

    /// Bring the chunk stores in line with `items` and notify.
    fn settle(&self, items: &[T]) {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);

        let required = items.len().div_ceil(self.chunk_size);
        let mut stale: Vec<(Writable<Vec<T>>, Vec<T>)> = Vec::new();

        {
            let mut chunks = self.chunks.borrow_mut();

            if chunks.len() > required {
                tracing::debug!(target: "nug::chunks", from = chunks.len(), to = required, "truncating chunks");
                chunks.truncate(required);
                self.structural.set(true);
            }

            for index in 0..required {
                let offset = index * self.chunk_size;
                let fresh = &items[offset..items.len().min(offset + self.chunk_size)];

                if index == chunks.len() {
                    tracing::debug!(target: "nug::chunks", index, len = fresh.len(), "creating chunk");
                    chunks.push(Writable::new(fresh.to_vec()));
                    self.structural.set(true);
                    continue;
                }

                let chunk = &chunks[index];
                // A length change (tail shrink or growth) or any key mismatch
                // replaces the whole slice.
                let mismatch = chunk.with(|current| {
                    current.len() != fresh.len()
                        || current
                            .iter()
                            .zip(fresh)
                            .any(|(old, new)| !(self.same_key)(old, new))
                });

                if mismatch {
                    stale.push((chunk.clone(), fresh.to_vec()));
                }
            }
        }

        // No borrow held from here: chunk subscribers may read this list or
        // set the source again.
        for (chunk, slice) in stale {
            tracing::trace!(target: "nug::chunks", len = slice.len(), "chunk changed");
            chunk.set(slice);
            if self.generation.get() != generation {
                tracing::trace!(target: "nug::chunks", "source changed during settle, deferring to nested settle");
                return;
            }
        }

        let first_settle = !self.settled.replace(true);
        let structural = self.structural.replace(false);
        if structural || first_settle {
            self.subscribers.notify(|| Rc::new(self.snapshot()));
        }
    }

    fn release_upstream(&self) {
        let upstream = self.upstream.borrow_mut().take();
        if let Some(unsubscribe) = upstream {
            tracing::debug!(target: "nug::chunks", "last subscriber left, releasing source");
            unsubscribe.unsubscribe();
            self.settled.set(false);
            self.structural.set(false);
        }
    }
}

impl<T: 'static> Drop for ChunksInner<T> {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.upstream.get_mut().take() {
            unsubscribe.unsubscribe();
        }
    }
}

// =============================================================================
// CHUNKS<T> - The public handle
// =============================================================================

/// An observable list of chunk stores derived from a source list.
///
/// The source is subscribed lazily on the first subscriber and released when
/// the last one unsubscribes.
///
/// # Example
///
/// ```
/// use nug::{derive_chunks, get, writable, ChunkOptions};
///
/// let items = writable(vec!['a', 'b', 'c', 'd', 'e']);
/// let chunks = derive_chunks(ChunkOptions::new(items.clone(), |c: &char| *c, 2)).unwrap();
///
/// let list = get(&chunks);
/// assert_eq!(list.len(), 3);
/// assert_eq!(list[2].get(), vec!['e']);
/// ```
pub struct Chunks<T: 'static> {
    inner: Rc<ChunksInner<T>>,
}

impl<T: 'static> Clone for Chunks<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Chunks<T> {
    /// The chunk stores as of the last settle.
    ///
    /// Does not subscribe to the source, so the result is only current while
    /// something else keeps the chunk list subscribed. Use [`get`](crate::get)
    /// for a fresh read.
    pub fn chunks(&self) -> Vec<Chunk<T>> {
        self.inner.snapshot()
    }

    pub fn chunk_size(&self) -> usize {
        self.inner.chunk_size
    }

    /// Whether the source list is currently subscribed.
    pub fn is_connected(&self) -> bool {
        self.inner.upstream.borrow().is_some()
    }

    /// Number of chunk-list subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

impl<T: Clone + 'static> Observable for Chunks<T> {
    type Value = Vec<Chunk<T>>;

    fn subscribe_with(&self, run: Subscriber<Vec<Chunk<T>>>, options: SubscribeOptions) -> Unsubscriber {
        let inner = &self.inner;
        let entry = if inner.upstream.borrow().is_none() {
            // The first settle notifies the list, which covers the initial delivery.
            let entry = options.initial.then(|| inner.subscribers.add(run.clone()));

            // Placeholder so subscribers reached during the first settle
            // take the connected path instead of subscribing the source again.
            *inner.upstream.borrow_mut() = Some(Unsubscriber::noop());

            let weak: Weak<ChunksInner<T>> = Rc::downgrade(inner);
            let upstream = inner.source.subscribe_with(
                Rc::new(move |items: &Vec<T>| {
                    if let Some(inner) = weak.upgrade() {
                        inner.settle(items);
                    }
                }),
                SubscribeOptions::default(),
            );
            *inner.upstream.borrow_mut() = Some(upstream);

            entry.unwrap_or_else(|| inner.subscribers.add(run))
        } else {
            let entry = inner.subscribers.add(run.clone());
            if options.initial {
                run(&inner.snapshot());
            }
            entry
        };

        let weak = Rc::downgrade(inner);
        Unsubscriber::new(move || {
            entry.unsubscribe();
            if let Some(inner) = weak.upgrade() {
                if inner.subscribers.is_empty() {
                    inner.release_upstream();
                }
            }
        })
    }
}

impl<T: Clone + std::fmt::Debug + 'static> std::fmt::Debug for Chunks<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let chunks: Vec<Vec<T>> = self.chunks().iter().map(Readable::get).collect();
        f.debug_struct("Chunks")
            .field("chunk_size", &self.inner.chunk_size)
            .field("chunks", &chunks)
            .finish()
    }
}

// =============================================================================
// CREATION
// =============================================================================

/// Derive a chunk list from a list store.
///
/// Fails with [`NugError::InvalidConfiguration`] when `chunk_size` is zero.
pub fn derive_chunks<S, T, F, K>(options: ChunkOptions<S, F>) -> Result<Chunks<T>>
where
    S: Observable<Value = Vec<T>> + 'static,
    T: Clone + 'static,
    F: Fn(&T) -> K + 'static,
    K: PartialEq,
{
    let ChunkOptions {
        store,
        get_key,
        chunk_size,
    } = options;

    if chunk_size == 0 {
        return Err(NugError::InvalidConfiguration(
            "chunk_size must be a positive integer".to_string(),
        ));
    }

    Ok(Chunks {
        inner: Rc::new(ChunksInner {
            source: Rc::new(store),
            same_key: Box::new(move |a, b| get_key(a) == get_key(b)),
            chunk_size,
            chunks: RefCell::new(Vec::new()),
            subscribers: SubscriberList::new(),
            upstream: RefCell::new(None),
            settled: Cell::new(false),
            generation: Cell::new(0),
            structural: Cell::new(false),
        }),
    })
}

// =============================================================================
// TESTS
// =============================================================================
