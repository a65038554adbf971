//! Fan-out of independent computations.
//!
//! Every primitive is pure and its inputs are immutable, so independent jobs
//! (many series through one primitive, or one series through many
//! primitives) can run concurrently without coordination. With the
//! `parallel` feature enabled, [`BatchProcessor`] uses Rayon once the number
//! of jobs reaches its threshold; otherwise it runs them in order. Results
//! are identical either way.
//!
//! ```toml
//! [dependencies]
//! rolling-ta = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! # Example
//!
//! ```
//! use rolling_ta::batch::BatchProcessor;
//! use rolling_ta::moving_average::MovingAverage;
//! use rolling_ta::Series;
//!
//! let close = Series::new(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0]);
//! let methods = [MovingAverage::Sma(3), MovingAverage::Ema(3)];
//!
//! let results = BatchProcessor::new().moving_averages(&close, &methods).unwrap();
//! assert_eq!(results.len(), 2);
//! assert!((results[0][4] - 4.0).abs() < 1e-12);
//! ```

use crate::error::Result;
use crate::moving_average::MovingAverage;
use crate::series::Series;
use crate::traits::SeriesElement;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs batches of independent jobs, in parallel when enabled.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    /// Minimum number of jobs before Rayon is used.
    min_parallel_threshold: usize,
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchProcessor {
    /// Creates a processor with the default threshold of 4 jobs.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_parallel_threshold: 4,
        }
    }

    /// Sets the minimum number of jobs required to go parallel.
    #[must_use]
    pub const fn min_parallel_threshold(mut self, threshold: usize) -> Self {
        self.min_parallel_threshold = threshold;
        self
    }

    /// Applies `f` to every series.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    #[cfg(feature = "parallel")]
    pub fn process<T, F, R>(&self, series: &[Series<T>], f: F) -> Result<Vec<R>>
    where
        T: SeriesElement,
        F: Fn(&Series<T>) -> Result<R> + Send + Sync,
        R: Send,
    {
        if series.len() < self.min_parallel_threshold {
            series.iter().map(f).collect()
        } else {
            series.par_iter().map(f).collect()
        }
    }

    /// Applies `f` to every series.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    #[cfg(not(feature = "parallel"))]
    pub fn process<T, F, R>(&self, series: &[Series<T>], f: F) -> Result<Vec<R>>
    where
        T: SeriesElement,
        F: Fn(&Series<T>) -> Result<R>,
    {
        series.iter().map(f).collect()
    }

    /// Applies `f` to one shared series once per job.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    #[cfg(feature = "parallel")]
    pub fn fan_out<T, J, F, R>(&self, series: &Series<T>, jobs: &[J], f: F) -> Result<Vec<R>>
    where
        T: SeriesElement,
        J: Sync,
        F: Fn(&Series<T>, &J) -> Result<R> + Send + Sync,
        R: Send,
    {
        if jobs.len() < self.min_parallel_threshold {
            jobs.iter().map(|job| f(series, job)).collect()
        } else {
            jobs.par_iter().map(|job| f(series, job)).collect()
        }
    }

    /// Applies `f` to one shared series once per job.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    #[cfg(not(feature = "parallel"))]
    pub fn fan_out<T, J, F, R>(&self, series: &Series<T>, jobs: &[J], f: F) -> Result<Vec<R>>
    where
        T: SeriesElement,
        F: Fn(&Series<T>, &J) -> Result<R>,
    {
        jobs.iter().map(|job| f(series, job)).collect()
    }

    /// Computes several moving averages of one series.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error among `methods`.
    pub fn moving_averages<T: SeriesElement>(
        &self,
        series: &Series<T>,
        methods: &[MovingAverage],
    ) -> Result<Vec<Series<T>>> {
        self.fan_out(series, methods, |s, ma| ma.apply(s))
    }
}
