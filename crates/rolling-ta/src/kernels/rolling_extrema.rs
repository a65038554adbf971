//! Rolling extrema using a monotonic deque.
//!
//! The deque holds positions whose values are monotonically ordered
//! (decreasing for max, increasing for min), so the front is always the
//! extremum of the current window. Each position is pushed and popped at
//! most once, giving O(n) total for n elements regardless of window size.
//!
//! Missing values never enter the deque. The caller tracks them separately
//! and reports the window as missing while any is inside it.
//!
//! # Example
//!
//! ```
//! use rolling_ta::kernels::rolling_extrema::{rolling_max, rolling_min};
//! use rolling_ta::Window;
//!
//! let data = [3.0_f64, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
//! let window = Window::new(3).unwrap();
//!
//! let max = rolling_max(&data, window);
//! assert!(max[1].is_nan());
//! assert_eq!(max[2], 4.0); // max of [3, 1, 4]
//! assert_eq!(max[5], 9.0); // max of [1, 5, 9]
//!
//! let min = rolling_min(&data, window);
//! assert_eq!(min[2], 1.0);
//! assert_eq!(min[7], 2.0);
//! ```

use std::collections::VecDeque;

use crate::traits::SeriesElement;
use crate::window::Window;

/// Which extremum a [`MonotonicDeque`] tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    /// Largest value in the window.
    Max,
    /// Smallest value in the window.
    Min,
}

impl Extremum {
    /// Returns `true` if `candidate` should evict `held` from the back.
    #[inline]
    fn dominates<T: SeriesElement>(self, candidate: T, held: T) -> bool {
        match self {
            Self::Max => candidate >= held,
            Self::Min => candidate <= held,
        }
    }
}

/// A monotonic deque of positions into a data slice.
#[derive(Debug, Clone)]
pub struct MonotonicDeque {
    deque: VecDeque<usize>,
    kind: Extremum,
}

impl MonotonicDeque {
    /// Creates an empty deque tracking `kind`.
    #[must_use]
    pub fn new(kind: Extremum, capacity: usize) -> Self {
        Self {
            deque: VecDeque::with_capacity(capacity),
            kind,
        }
    }

    /// Pushes position `index` of `data`. Missing values are ignored.
    #[inline]
    pub fn push<T: SeriesElement>(&mut self, index: usize, data: &[T]) {
        let value = data[index];
        if value.is_nan() {
            return;
        }
        while let Some(&back) = self.deque.back() {
            if self.kind.dominates(value, data[back]) {
                self.deque.pop_back();
            } else {
                break;
            }
        }
        self.deque.push_back(index);
    }

    /// Drops positions before `window_start`.
    #[inline]
    pub fn expire(&mut self, window_start: usize) {
        while let Some(&front) = self.deque.front() {
            if front < window_start {
                self.deque.pop_front();
            } else {
                break;
            }
        }
    }

    /// Position of the current extremum.
    #[inline]
    #[must_use]
    pub fn front_index(&self) -> Option<usize> {
        self.deque.front().copied()
    }

    /// Current extremum, or missing if the deque is empty.
    #[inline]
    pub fn extremum<T: SeriesElement>(&self, data: &[T]) -> T {
        self.front_index().map_or_else(T::nan, |i| data[i])
    }
}

/// Rolling maximum over `window`.
#[must_use]
pub fn rolling_max<T: SeriesElement>(data: &[T], window: Window) -> Vec<T> {
    rolling_extrema(data, window, Extremum::Max)
}

/// Rolling minimum over `window`.
#[must_use]
pub fn rolling_min<T: SeriesElement>(data: &[T], window: Window) -> Vec<T> {
    rolling_extrema(data, window, Extremum::Min)
}

/// Rolling extremum of `kind`, with warm-up and missing handling.
#[must_use]
pub fn rolling_extrema<T: SeriesElement>(data: &[T], window: Window, kind: Extremum) -> Vec<T> {
    let mut result = vec![T::nan(); data.len()];
    let mut deque = MonotonicDeque::new(kind, window.size().min(data.len()));
    let mut missing = 0_usize;

    for t in 0..data.len() {
        deque.push(t, data);
        if data[t].is_nan() {
            missing += 1;
        }
        let start = window.start(t);
        if start > 0 && data[start - 1].is_nan() {
            missing -= 1;
        }
        deque.expire(start);

        if window.is_ready(t) && missing == 0 {
            result[t] = deque.extremum(data);
        }
    }
    result
}

/// Naive O(n·k) rolling extremum, used to cross-check the deque.
#[must_use]
pub fn rolling_extrema_naive<T: SeriesElement>(data: &[T], window: Window, kind: Extremum) -> Vec<T> {
    (0..data.len())
        .map(|t| {
            let slice = &data[window.start(t)..=t];
            if !window.is_ready(t) || slice.iter().any(|v| v.is_nan()) {
                return T::nan();
            }
            slice.iter().copied().fold(slice[0], |acc, v| match kind {
                Extremum::Max => acc.max(v),
                Extremum::Min => acc.min(v),
            })
        })
        .collect()
}
