//! Sliding-window aggregation without subtraction.
//!
//! [`SlidingAggregate`] keeps the window as two stacks. New items go on the
//! back stack, which carries one running aggregate. When the oldest item has
//! to leave and the front stack is empty, the back stack is flipped onto the
//! front stack, storing at every slot the aggregate of that item and all
//! newer front items. Evicting is then a pop, and the window aggregate is
//! the top of the front stack merged with the back aggregate.
//!
//! Every item is inserted into at most two aggregates and never removed from
//! one, so a large value that has left the window leaves no rounding residue
//! behind. Each step is amortized O(1).
//!
//! # Example
//!
//! ```
//! use rolling_ta::kernels::running_stat::RunningStat;
//! use rolling_ta::kernels::sliding_aggregate::SlidingAggregate;
//!
//! let mut window: SlidingAggregate<RunningStat<f64>> = SlidingAggregate::new();
//! for x in [1e16, 1.0, 1.0] {
//!     window.push(x);
//! }
//! window.evict();
//! assert_eq!(window.aggregate().sum(), 2.0);
//! ```

/// A summary that items can be folded into and that can be combined.
///
/// `merge` must be associative and commutative on the represented multiset.
pub trait Aggregate: Copy {
    /// One observation.
    type Item: Copy;

    /// The summary of no items.
    fn empty() -> Self;

    /// Folds `item` into the summary.
    fn insert(&mut self, item: Self::Item);

    /// The summary of both inputs' items.
    #[must_use]
    fn merge(&self, other: &Self) -> Self;
}

/// Two-stack FIFO window over an [`Aggregate`].
#[derive(Debug, Clone)]
pub struct SlidingAggregate<A: Aggregate> {
    /// Suffix aggregates; the last slot is the oldest item.
    front: Vec<A>,
    back: Vec<A::Item>,
    back_total: A,
}

impl<A: Aggregate> Default for SlidingAggregate<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Aggregate> SlidingAggregate<A> {
    /// Creates an empty window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty window with room for `capacity` items.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            front: Vec::with_capacity(capacity),
            back: Vec::with_capacity(capacity),
            back_total: A::empty(),
        }
    }

    /// Number of items held.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.front.len() + self.back.len()
    }

    /// Returns `true` if no item is held.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends the newest item.
    pub fn push(&mut self, item: A::Item) {
        self.back.push(item);
        self.back_total.insert(item);
    }

    /// Drops the oldest item; does nothing when empty.
    pub fn evict(&mut self) {
        if self.front.is_empty() {
            let mut suffix = A::empty();
            for &item in self.back.iter().rev() {
                suffix.insert(item);
                self.front.push(suffix);
            }
            self.back.clear();
            self.back_total = A::empty();
        }
        self.front.pop();
    }

    /// Aggregate of every item held.
    #[must_use]
    pub fn aggregate(&self) -> A {
        match self.front.last() {
            Some(front) => front.merge(&self.back_total),
            None => self.back_total,
        }
    }
}
