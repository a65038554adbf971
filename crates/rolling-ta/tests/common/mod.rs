//! Shared test utilities for rolling-ta tests.

#[allow(unused_imports)]
pub use rolling_ta::{approx_eq, EPSILON, LOOSE_EPSILON};
use rolling_ta::{count_nan_prefix, count_nans, Series};

/// Twenty closes used throughout the integration tests.
#[allow(dead_code)]
pub const PRICES: [f64; 20] = [
    44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03, 45.61,
    46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
];

/// Deterministic synthetic price path.
#[allow(dead_code)]
pub fn generate_series(size: usize) -> Series<f64> {
    let mut price = 100.0;
    (0..size)
        .map(|i| {
            let i = i as f64;
            price += (i * 0.1).sin() * 2.0 + (i * 0.03).cos() * 1.5;
            price = f64::max(price, 10.0);
            price
        })
        .collect()
}

/// Verify that exactly the first `n` values are NaN.
#[allow(dead_code)]
pub fn verify_nan_prefix(data: &[f64], expected_nan_count: usize) -> bool {
    count_nan_prefix(data) == expected_nan_count && count_nans(data) == expected_nan_count
}

/// Assert elementwise equality with NaN matching NaN.
#[allow(dead_code)]
pub fn assert_series_eq(actual: &[f64], expected: &[f64], eps: f64, label: &str) {
    assert_eq!(actual.len(), expected.len(), "{label}: length mismatch");
    for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        assert!(approx_eq(a, e, eps), "{label}[{i}]: expected {e}, got {a}");
    }
}
