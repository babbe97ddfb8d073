//! Small numeric helpers shared by every function type.

/// Clamp `v` into `[lo, hi]`.
///
/// Callers are expected to have already checked `lo <= hi`; if they
/// haven't, the result is whichever bound `v` lands closest to through
/// the two `min`/`max` calls below.
#[inline]
pub fn clip(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

/// Affinely map `x` from `[x_min, x_max]` to `[y_min, y_max]`.
///
/// Returns `y_min` if the source interval is empty or inverted
/// (`x_max <= x_min`), which is the documented degenerate-interval
/// behavior used by the Type 3 stitching dispatcher.
#[inline]
pub fn interpolate(x: f64, x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> f64 {
    if x_max <= x_min {
        return y_min;
    }
    y_min + (x - x_min) * (y_max - y_min) / (x_max - x_min)
}

/// `a` and `b` form a valid PDF interval: both finite and `a <= b`.
///
/// Used for `Domain`/`Range` pairs, which PDF always orders low-to-high.
#[inline]
pub fn is_range(a: f64, b: f64) -> bool {
    a.is_finite() && b.is_finite() && a <= b
}

/// `a` and `b` are both finite, in either order.
///
/// Used for `Encode`/`Decode` pairs, which may legitimately run high-to-low
/// to flip a function's orientation.
#[inline]
pub fn is_finite_pair(a: f64, b: f64) -> bool {
    a.is_finite() && b.is_finite()
}

/// `a` and `b` are within `tol` of each other, treating exact equality
/// (including both infinite with the same sign) as a match.
#[inline]
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    a == b || (a - b).abs() <= tol
}

/// Pairwise [`approx_eq`] over two equal-length slices.
pub fn approx_eq_slice(a: &[f64], b: &[f64], tol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| approx_eq(x, y, tol))
}

/// Tolerance used by the crate's own structural-equality tests.
pub const STRUCTURAL_TOLERANCE: f64 = 1e-9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_clamps_both_ends() {
        assert_eq!(clip(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clip(-5.0, 0.0, 1.0), 0.0);
        assert_eq!(clip(0.5, 0.0, 1.0), 0.5);
    }

    #[test]
    fn interpolate_affine_map() {
        assert_eq!(interpolate(0.5, 0.0, 1.0, 0.0, 10.0), 5.0);
        assert_eq!(interpolate(2.0, 0.0, 1.0, 0.0, 10.0), 20.0);
    }

    #[test]
    fn interpolate_degenerate_domain_returns_y_min() {
        assert_eq!(interpolate(5.0, 3.0, 3.0, 7.0, 9.0), 7.0);
        assert_eq!(interpolate(5.0, 3.0, 1.0, 7.0, 9.0), 7.0);
    }

    #[test]
    fn is_range_rejects_inverted_or_non_finite() {
        assert!(is_range(0.0, 1.0));
        assert!(!is_range(1.0, 0.0));
        assert!(!is_range(f64::NAN, 1.0));
        assert!(!is_range(0.0, f64::INFINITY));
    }

    #[test]
    fn approx_eq_tolerates_small_drift_but_not_large() {
        assert!(approx_eq(1.0, 1.0 + 1e-12, STRUCTURAL_TOLERANCE));
        assert!(!approx_eq(1.0, 1.1, STRUCTURAL_TOLERANCE));
    }

    #[test]
    fn approx_eq_slice_requires_matching_lengths_and_values() {
        assert!(approx_eq_slice(&[1.0, 2.0], &[1.0, 2.0 + 1e-12], STRUCTURAL_TOLERANCE));
        assert!(!approx_eq_slice(&[1.0, 2.0], &[1.0], STRUCTURAL_TOLERANCE));
        assert!(!approx_eq_slice(&[1.0, 2.0], &[1.0, 2.5], STRUCTURAL_TOLERANCE));
    }
}
