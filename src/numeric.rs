//! Floating point comparison helpers, thin wrappers around the `approx` crate.

use approx::AbsDiffEq;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum absolute difference
/// (epsilon) of `acc`. Two infinities compare equal when they have the same sign.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// Mean of a slice, or `None` if it is empty.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[macro_export]
macro_rules! assert_almost_eq {
    ($a:expr, $b:expr, $prec:expr $(,)?) => {
        if !$crate::numeric::almost_eq($a, $b, $prec) {
            panic!(
                "assertion failed: `abs(left - right) < {:e}`, (left: `{}`, right: `{}`)",
                $prec, $a, $b
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn almost_eq_within_tolerance() {
        assert!(almost_eq(1.0, 1.0 + 0.5e-11, 1e-10));
        assert!(!almost_eq(1.0, 1.1, 1e-10));
    }

    #[test]
    fn infinities() {
        assert!(almost_eq(f64::INFINITY, f64::INFINITY, 1e-10));
        assert!(!almost_eq(f64::INFINITY, f64::NEG_INFINITY, 1e-10));
    }

    #[test]
    fn mean_of_values() {
        assert_eq!(mean(&[]), None);
        assert_almost_eq!(mean(&[1.0, 2.0, 6.0]).unwrap(), 3.0, 1e-12);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn macro_panics_outside_tolerance() {
        assert_almost_eq!(1.0, 2.0, 1e-3);
    }
}
