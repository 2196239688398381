//! Indicator implementations.
//!
//! The oscillator is computed once over the full return series before the
//! signal scan; every value at step `t` depends only on returns up to `t`.

pub mod oscillator;

pub use oscillator::{oscillator_value, Oscillator, OscillatorPoint};

/// Create synthetic bars from adjusted closes for testing.
///
/// open = previous adjusted close (or the close itself for the first bar),
/// dates are consecutive calendar days from 2024-01-02.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::PriceBar> {
    use crate::domain::PriceBar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar::new(base_date + chrono::Duration::days(i as i64), open, close)
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
