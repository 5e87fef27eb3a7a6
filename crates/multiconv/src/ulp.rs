//! ULP (unit in the last place) distance between `f32` outputs.
//!
//! The equivalence checker reports the worst ULP gap next to the absolute
//! error sum; for kernel order 1 the two convolutions must be 0 ULP apart.

/// Number of representable `f32` values between `a` and `b`.
///
/// NaN on either side, or opposite non-zero signs, yields `u32::MAX`.
/// `+0.0` and `-0.0` are 0 apart.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn ulp_distance(a: f32, b: f32) -> u32 {
    if a.is_nan() || b.is_nan() {
        return u32::MAX;
    }
    if a == b {
        return 0;
    }
    let a_bits = a.to_bits() as i32;
    let b_bits = b.to_bits() as i32;
    if (a_bits < 0) != (b_bits < 0) {
        return u32::MAX;
    }
    a_bits.abs_diff(b_bits)
}

/// Largest [`ulp_distance`] over paired elements; 0 for empty input.
///
/// # Panics
///
/// Panics if the slices differ in length.
#[must_use]
pub fn max_ulp_distance(a: &[f32], b: &[f32]) -> u32 {
    assert_eq!(a.len(), b.len(), "slice length mismatch: {} vs {}", a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(&x, &y)| ulp_distance(x, y))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_values() {
        assert_eq!(ulp_distance(9.0, 9.0), 0);
        assert_eq!(ulp_distance(0.0, -0.0), 0);
    }

    #[test]
    fn test_adjacent_and_gapped() {
        let a = 23.0_f32;
        assert_eq!(ulp_distance(a, f32::from_bits(a.to_bits() + 1)), 1);
        assert_eq!(ulp_distance(f32::from_bits(a.to_bits() + 10), a), 10);
    }

    #[test]
    fn test_nan_and_sign_mismatch() {
        assert_eq!(ulp_distance(f32::NAN, 1.0), u32::MAX);
        assert_eq!(ulp_distance(1.0, -1.0), u32::MAX);
    }

    #[test]
    fn test_max_over_slice() {
        let a = [1.0_f32, 2.0, 3.0];
        let b = [1.0_f32, f32::from_bits(2.0_f32.to_bits() + 3), 3.0];
        assert_eq!(max_ulp_distance(&a, &b), 3);
        assert_eq!(max_ulp_distance(&[], &[]), 0);
    }

    #[test]
    #[should_panic(expected = "slice length mismatch")]
    fn test_max_length_mismatch() {
        let _ = max_ulp_distance(&[1.0], &[1.0, 2.0]);
    }
}
