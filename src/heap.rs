//! Binary max-heap whose elements can be re-located after their key changes.
//!
//! [`AddressableHeap`] stores small `Copy` items (typically ids into a table
//! owned by someone else) in an array laid out the usual way: the root at
//! index 0 and the children of `i` at `2i + 1` and `2i + 2`. Ordering is
//! not a property of the items themselves. It is injected on every mutating
//! call through a [`HeapIndex`], which also receives a [`Handle`] each time
//! an item lands on a new array position.
//!
//! The owner of the items keeps those handles next to the data that drives
//! the ordering. When that data changes, the owner passes the stored handle
//! back to [`AddressableHeap::fix`] and the item is repaired in `O(log n)`
//! without scanning the array.
//!
//! ```text
//!   owner table                    heap array
//!   ┌──────────────────────┐       ┌───┬───┬───┬───┐
//!   │ id 0  key 9  pos 0 ──┼──────►│ 0 │ 2 │ 1 │ 3 │
//!   │ id 1  key 4  pos 2 ──┼───┐   └───┴───┴───┴───┘
//!   │ id 2  key 7  pos 1   │   └───────────▲
//!   │ id 3  key 1  pos 3   │
//!   └──────────────────────┘
//! ```
//!
//! Handles carry the heap's order marker as a type parameter, so a handle
//! issued by a heap of `AddressableHeap<T, ByCount>` cannot be passed to a
//! heap of `AddressableHeap<T, ByRecency>`.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

/// Position of an item inside an [`AddressableHeap`] tagged with order `O`.
///
/// A handle is only valid until the next mutation of its heap. Owners should
/// keep the handle delivered through [`HeapIndex::moved`], which is always
/// current.
pub struct Handle<O> {
    pos: usize,
    _order: PhantomData<fn() -> O>,
}

impl<O> Handle<O> {
    fn at(pos: usize) -> Self {
        Self {
            pos,
            _order: PhantomData,
        }
    }

    /// Returns the array position this handle points at.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<O> Clone for Handle<O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for Handle<O> {}

impl<O> PartialEq for Handle<O> {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl<O> Eq for Handle<O> {}

impl<O> fmt::Debug for Handle<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.pos)
    }
}

/// Ordering and position bookkeeping injected into an [`AddressableHeap`].
pub trait HeapIndex<T> {
    /// Order marker of the heaps this index may drive.
    type Order;

    /// Compares two items. `Greater` means `a` belongs closer to the root.
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Called every time `item` is written to a new array position.
    fn moved(&mut self, item: &T, handle: Handle<Self::Order>);
}

/// Array-backed binary max-heap with externally tracked positions.
pub struct AddressableHeap<T, O> {
    items: Vec<T>,
    _order: PhantomData<fn() -> O>,
}

impl<T, O> Default for AddressableHeap<T, O> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            _order: PhantomData,
        }
    }
}

impl<T: fmt::Debug, O> fmt::Debug for AddressableHeap<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: Copy, O> AddressableHeap<T, O> {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty heap with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            _order: PhantomData,
        }
    }

    /// Returns the number of items in the heap.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the heap holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the handle the next inserted item starts from.
    ///
    /// Owners that must store a handle before calling [`insert`](Self::insert)
    /// can use this as a placeholder; `insert` overwrites it through
    /// [`HeapIndex::moved`].
    pub fn next_handle(&self) -> Handle<O> {
        Handle::at(self.items.len())
    }

    /// Returns the item at `handle`, if the position is occupied.
    pub fn get(&self, handle: Handle<O>) -> Option<&T> {
        self.items.get(handle.pos)
    }

    /// Returns the greatest item without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// Returns the items in array order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Inserts `item` and returns its final position.
    pub fn insert<I>(&mut self, item: T, index: &mut I) -> Handle<O>
    where
        I: HeapIndex<T, Order = O>,
    {
        let pos = self.items.len();
        self.items.push(item);
        index.moved(&item, Handle::at(pos));
        Handle::at(self.sift_up(pos, index))
    }

    /// Restores heap order after the key of the item at `handle` changed.
    ///
    /// The item moves toward the root or toward the leaves, whichever the
    /// new key requires. Every item displaced on the way is reported through
    /// [`HeapIndex::moved`]. Returns the item's final position.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is past the end of the heap.
    pub fn fix<I>(&mut self, handle: Handle<O>, index: &mut I) -> Handle<O>
    where
        I: HeapIndex<T, Order = O>,
    {
        let pos = handle.pos;
        assert!(
            pos < self.items.len(),
            "handle {pos} out of bounds for heap of length {}",
            self.items.len()
        );
        let up = self.sift_up(pos, index);
        if up != pos {
            return Handle::at(up);
        }
        Handle::at(self.sift_down(pos, index))
    }

    /// Removes and returns the greatest item.
    pub fn pop<I>(&mut self, index: &mut I) -> Option<T>
    where
        I: HeapIndex<T, Order = O>,
    {
        let last = self.items.len().checked_sub(1)?;
        self.items.swap(0, last);
        let top = self.items.pop()?;
        if let Some(root) = self.items.first().copied() {
            index.moved(&root, Handle::at(0));
            self.sift_down(0, index);
        }
        Some(top)
    }

    /// Returns the `k` greatest items in descending order.
    ///
    /// The heap is left untouched: the walk runs a small scratch heap over
    /// array positions, seeded with the root and fed with the children of
    /// every position it yields. Costs `O(k log k)`.
    ///
    /// `k` is clamped to the heap length; `k == 0` yields an empty vector.
    pub fn peek_top<F>(&self, k: usize, compare: F) -> Vec<T>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let k = k.min(self.items.len());
        if k == 0 {
            return Vec::new();
        }

        let mut frontier = AddressableHeap::<usize, Scratch>::with_capacity(k + 1);
        let mut scratch = Frontier {
            items: &self.items,
            compare: &compare,
        };
        frontier.insert(0, &mut scratch);

        let mut top = Vec::with_capacity(k);
        while top.len() < k {
            let Some(pos) = frontier.pop(&mut scratch) else {
                break;
            };
            top.push(self.items[pos]);
            for child in [2 * pos + 1, 2 * pos + 2] {
                if child < self.items.len() {
                    frontier.insert(child, &mut scratch);
                }
            }
        }
        top
    }

    /// Checks the max-heap property under `compare`.
    #[cfg(test)]
    pub(crate) fn is_ordered_by<F>(&self, compare: F) -> bool
    where
        F: Fn(&T, &T) -> Ordering,
    {
        (1..self.items.len())
            .all(|i| compare(&self.items[(i - 1) / 2], &self.items[i]) != Ordering::Less)
    }

    fn swap<I>(&mut self, a: usize, b: usize, index: &mut I)
    where
        I: HeapIndex<T, Order = O>,
    {
        self.items.swap(a, b);
        index.moved(&self.items[a], Handle::at(a));
        index.moved(&self.items[b], Handle::at(b));
    }

    fn sift_up<I>(&mut self, mut pos: usize, index: &mut I) -> usize
    where
        I: HeapIndex<T, Order = O>,
    {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if index.compare(&self.items[pos], &self.items[parent]) != Ordering::Greater {
                break;
            }
            self.swap(pos, parent, index);
            pos = parent;
        }
        pos
    }

    fn sift_down<I>(&mut self, mut pos: usize, index: &mut I) -> usize
    where
        I: HeapIndex<T, Order = O>,
    {
        let len = self.items.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut best = pos;
            if index.compare(&self.items[left], &self.items[best]) == Ordering::Greater {
                best = left;
            }
            if right < len && index.compare(&self.items[right], &self.items[best]) == Ordering::Greater
            {
                best = right;
            }
            if best == pos {
                break;
            }
            self.swap(pos, best, index);
            pos = best;
        }
        pos
    }
}

/// Order marker of the scratch heap used by [`AddressableHeap::peek_top`].
struct Scratch;

/// Orders positions of a borrowed heap array by the items they hold.
struct Frontier<'a, T, F> {
    items: &'a [T],
    compare: &'a F,
}

impl<T, F> HeapIndex<usize> for Frontier<'_, T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    type Order = Scratch;

    fn compare(&self, a: &usize, b: &usize) -> Ordering {
        (self.compare)(&self.items[*a], &self.items[*b])
    }

    fn moved(&mut self, _item: &usize, _handle: Handle<Scratch>) {}
}
