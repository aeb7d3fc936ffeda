//! Shared test utilities for the wk-spectrum workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic wave and noise generators
//! - Coordinate and parameter fixtures
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, equatorial_wave, WaveSpec};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::{latitudes, longitudes};
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro asserting that every element of two arrays agrees within epsilon.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_all_close;
///
/// assert_all_close!(computed.iter(), expected.iter(), 1e-9);
/// ```
#[macro_export]
macro_rules! assert_all_close {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        for (i, (l, r)) in $left.into_iter().zip($right.into_iter()).enumerate() {
            let diff: f64 = (*l as f64 - *r as f64).abs();
            if diff > $epsilon {
                panic!(
                    "arrays differ at element {}: {:?} vs {:?} (diff {:?} > {:?})",
                    i, l, r, diff, $epsilon
                );
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_all_close_passes() {
        let a = [1.0_f64, 2.0, 3.0];
        let b = [1.0_f64, 2.0 + 1e-12, 3.0];
        assert_all_close!(a.iter(), b.iter(), 1e-9);
    }

    #[test]
    #[should_panic(expected = "arrays differ")]
    fn test_assert_all_close_fails() {
        let a = [1.0_f64, 2.0];
        let b = [1.0_f64, 2.5];
        assert_all_close!(a.iter(), b.iter(), 1e-9);
    }
}
