//! Incremental kernels behind the rolling reducers.
//!
//! - [`running_stat`]: Welford mean/variance with pairwise merge
//! - [`sliding_aggregate`]: two-stack window over any mergeable summary
//! - [`rolling_extrema`]: monotonic deque for O(n) rolling max/min
//! - [`comoment`]: bivariate Welford for covariance and correlation

pub mod comoment;
pub mod rolling_extrema;
pub mod running_stat;
pub mod sliding_aggregate;

pub use comoment::CoMoment;
pub use rolling_extrema::{rolling_max, rolling_min, Extremum, MonotonicDeque};
pub use running_stat::RunningStat;
pub use sliding_aggregate::{Aggregate, SlidingAggregate};
