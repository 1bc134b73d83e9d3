//! The in-memory ranked counter store.
//!
//! [`RankedCounterStore`] keeps one record per id and two
//! [`AddressableHeap`]s over those records: one ordered by view count, one
//! ordered by how recently the id was incremented. Records own the handles
//! that locate them in each heap, so an increment repairs both orderings in
//! `O(log n)` without scanning.
//!
//! ```text
//!              ┌──────────── RwLock ─────────────┐
//!              │  ids: id ──► RecordId           │
//!              │  records: [Record]              │
//!              │     ▲   count + by_count handle │
//!              │     │   seq + by_recency handle │
//!              │  by_count:   heap of RecordId   │
//!              │  by_recency: heap of RecordId   │
//!              └─────────────────────────────────┘
//! ```
//!
//! The map and both heaps sit behind one reader/writer lock. Increments
//! hold the write lock across lookup, mutation and both fix-ups, so readers
//! never see one ordering updated and the other stale. Queries hold the
//! read lock and extract top-K without touching the live heaps.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use log::{debug, trace};

use crate::error::{validate_id, validate_limit, Result};
use crate::heap::{AddressableHeap, Handle, HeapIndex};

/// An id together with its current view count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewCount {
    /// Content identifier.
    pub id: String,
    /// Number of recorded views.
    pub views: u64,
}

impl ViewCount {
    /// Creates a view count.
    pub fn new(id: impl Into<String>, views: u64) -> Self {
        Self {
            id: id.into(),
            views,
        }
    }
}

/// Order marker for the heap ranking records by view count.
///
/// Higher counts rank first; equal counts rank by ascending id.
#[derive(Debug)]
pub enum ByCount {}

/// Order marker for the heap ranking records by last update.
///
/// The most recently incremented id ranks first.
#[derive(Debug)]
pub enum ByRecency {}

/// Configuration for a [`RankedCounterStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Number of distinct ids to reserve room for up front.
    pub initial_capacity: usize,
}

impl StoreConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of ids to reserve room for.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordId(usize);

#[derive(Debug)]
struct Record {
    id: String,
    count: u64,
    last_updated: SystemTime,
    /// Store-wide increment sequence at the last update. Strictly
    /// increasing, so recency never ties.
    sequence: u64,
    by_count: Handle<ByCount>,
    by_recency: Handle<ByRecency>,
}

impl Record {
    fn view(&self) -> ViewCount {
        ViewCount::new(self.id.as_str(), self.count)
    }
}

/// How one heap orders records and where a record keeps its handle for it.
trait Ranking: Sized {
    fn compare(a: &Record, b: &Record) -> Ordering;
    fn handle_mut(record: &mut Record) -> &mut Handle<Self>;
}

impl Ranking for ByCount {
    fn compare(a: &Record, b: &Record) -> Ordering {
        a.count.cmp(&b.count).then_with(|| b.id.cmp(&a.id))
    }

    fn handle_mut(record: &mut Record) -> &mut Handle<Self> {
        &mut record.by_count
    }
}

impl Ranking for ByRecency {
    fn compare(a: &Record, b: &Record) -> Ordering {
        a.sequence.cmp(&b.sequence)
    }

    fn handle_mut(record: &mut Record) -> &mut Handle<Self> {
        &mut record.by_recency
    }
}

/// Drives a heap of ranking `R` over the store's record table.
struct RecordIndex<'a, R> {
    records: &'a mut [Record],
    _ranking: PhantomData<R>,
}

impl<'a, R: Ranking> RecordIndex<'a, R> {
    fn new(records: &'a mut [Record]) -> Self {
        Self {
            records,
            _ranking: PhantomData,
        }
    }
}

impl<R: Ranking> HeapIndex<RecordId> for RecordIndex<'_, R> {
    type Order = R;

    fn compare(&self, a: &RecordId, b: &RecordId) -> Ordering {
        R::compare(&self.records[a.0], &self.records[b.0])
    }

    fn moved(&mut self, item: &RecordId, handle: Handle<R>) {
        *R::handle_mut(&mut self.records[item.0]) = handle;
    }
}

#[derive(Debug, Default)]
struct Inner {
    ids: HashMap<String, RecordId>,
    records: Vec<Record>,
    by_count: AddressableHeap<RecordId, ByCount>,
    by_recency: AddressableHeap<RecordId, ByRecency>,
    sequence: u64,
}

impl Inner {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: HashMap::with_capacity(capacity),
            records: Vec::with_capacity(capacity),
            by_count: AddressableHeap::with_capacity(capacity),
            by_recency: AddressableHeap::with_capacity(capacity),
            sequence: 0,
        }
    }

    fn increment(&mut self, id: &str) -> u64 {
        self.sequence += 1;
        let sequence = self.sequence;
        let now = SystemTime::now();

        if let Some(&rid) = self.ids.get(id) {
            let record = &mut self.records[rid.0];
            record.count += 1;
            record.sequence = sequence;
            record.last_updated = now;
            let (count, by_count, by_recency) = (record.count, record.by_count, record.by_recency);

            self.by_count
                .fix(by_count, &mut RecordIndex::<ByCount>::new(&mut self.records));
            self.by_recency
                .fix(by_recency, &mut RecordIndex::<ByRecency>::new(&mut self.records));
            return count;
        }

        let rid = RecordId(self.records.len());
        self.records.push(Record {
            id: id.to_owned(),
            count: 1,
            last_updated: now,
            sequence,
            by_count: self.by_count.next_handle(),
            by_recency: self.by_recency.next_handle(),
        });
        self.ids.insert(id.to_owned(), rid);
        self.by_count
            .insert(rid, &mut RecordIndex::<ByCount>::new(&mut self.records));
        self.by_recency
            .insert(rid, &mut RecordIndex::<ByRecency>::new(&mut self.records));
        debug!("tracking new id {id:?} ({} ids)", self.records.len());
        1
    }

    fn record(&self, id: &str) -> Option<&Record> {
        self.ids.get(id).map(|rid| &self.records[rid.0])
    }

    fn top<R: Ranking>(&self, heap: &AddressableHeap<RecordId, R>, n: usize) -> Vec<ViewCount> {
        heap.peek_top(n, |a, b| R::compare(&self.records[a.0], &self.records[b.0]))
            .into_iter()
            .map(|rid| self.records[rid.0].view())
            .collect()
    }
}

/// Thread-safe view counters ranked by count and by recency.
///
/// # Examples
///
/// ```rust
/// use classifica::{RankedCounterStore, ViewCount};
///
/// let store = RankedCounterStore::new();
/// for id in ["a", "b", "b", "a", "c"] {
///     store.increment(id)?;
/// }
///
/// assert_eq!(store.get_view("a")?, 2);
/// assert_eq!(store.get_view("never-seen")?, 0);
/// assert_eq!(
///     store.get_top(2)?,
///     vec![ViewCount::new("a", 2), ViewCount::new("b", 2)]
/// );
/// assert_eq!(store.get_recent(1)?, vec![ViewCount::new("c", 1)]);
/// # Ok::<(), classifica::ViewError>(())
/// ```
#[derive(Debug, Default)]
pub struct RankedCounterStore {
    inner: RwLock<Inner>,
}

impl RankedCounterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with room for `capacity` distinct ids.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(StoreConfig::new().initial_capacity(capacity))
    }

    /// Creates an empty store from `config`.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: RwLock::new(Inner::with_capacity(config.initial_capacity)),
        }
    }

    /// Returns the number of distinct ids seen so far.
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    /// Returns `true` if no id has been incremented yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the view count of `id`, or 0 if it was never incremented.
    ///
    /// Unknown ids are not inserted.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidArgument`](crate::ViewError::InvalidArgument) if
    /// `id` is empty.
    pub fn get_view(&self, id: &str) -> Result<u64> {
        validate_id(id)?;
        Ok(self.read().record(id).map_or(0, |r| r.count))
    }

    /// Returns when `id` was last incremented, or `None` if it never was.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidArgument`](crate::ViewError::InvalidArgument) if
    /// `id` is empty.
    pub fn last_updated(&self, id: &str) -> Result<Option<SystemTime>> {
        validate_id(id)?;
        Ok(self.read().record(id).map(|r| r.last_updated))
    }

    /// Returns every known id with its count, in no particular order.
    pub fn get_all(&self) -> Vec<ViewCount> {
        self.read().records.iter().map(Record::view).collect()
    }

    /// Records one view of `id`.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidArgument`](crate::ViewError::InvalidArgument) if
    /// `id` is empty.
    pub fn increment(&self, id: &str) -> Result<()> {
        validate_id(id)?;
        let count = self.write().increment(id);
        trace!("incremented {id:?} to {count}");
        Ok(())
    }

    /// Returns up to `n` ids with the highest counts, highest first.
    ///
    /// Equal counts are ordered by ascending id. `n` larger than the number
    /// of known ids returns all of them.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidArgument`](crate::ViewError::InvalidArgument) if
    /// `n` is negative.
    pub fn get_top(&self, n: i64) -> Result<Vec<ViewCount>> {
        let n = validate_limit(n)?;
        let inner = self.read();
        Ok(inner.top(&inner.by_count, n))
    }

    /// Returns up to `n` ids by most recent increment, newest first.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidArgument`](crate::ViewError::InvalidArgument) if
    /// `n` is negative.
    pub fn get_recent(&self, n: i64) -> Result<Vec<ViewCount>> {
        let n = validate_limit(n)?;
        let inner = self.read();
        Ok(inner.top(&inner.by_recency, n))
    }

    // A poisoned lock means a writer panicked between the count update and
    // the heap fix-ups; the orderings can no longer be trusted.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner
            .read()
            .expect("ranked counter store lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner
            .write()
            .expect("ranked counter store lock poisoned")
    }
}
