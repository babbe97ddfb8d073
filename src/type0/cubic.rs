//! Multi-dimensional recursive Catmull-Rom interpolation (PDF's `Order 3`,
//! α = -0.5, the "centripetal" choice).

/// Interpolate an `n_out`-vector at encoded coordinate `e` (one entry per
/// input dimension, already clipped to `[0, size[d] - 1]`), recursing one
/// dimension at a time from `0` to `e.len()`.
///
/// `sample_at` fetches the already-decoded output vector for one grid
/// corner, given as one index per input dimension. Near either edge of a
/// dimension's grid, a missing control point is reconstructed by
/// duplicating the nearest real one, which degrades the curve to a
/// quadratic there (and to a straight line once that dimension's `size`
/// is 2 or less). The spline is exact at every grid point.
pub fn interpolate(e: &[f64], size: &[u32], n_out: usize, sample_at: &impl Fn(&[u32]) -> Vec<f64>) -> Vec<f64> {
    let m = e.len();
    let mut i0 = vec![0u32; m];
    let mut frac = vec![0.0f64; m];
    for d in 0..m {
        let max_index = size[d].saturating_sub(1);
        let clamped = e[d].clamp(0.0, max_index as f64);
        let base = (clamped.floor() as u32).min(max_index);
        i0[d] = base;
        frac[d] = if size[d] <= 1 { 0.0 } else { clamped - base as f64 };
    }
    let mut idx = vec![0u32; m];
    recurse(0, size, &i0, &frac, &mut idx, n_out, sample_at)
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    dim: usize,
    size: &[u32],
    i0: &[u32],
    frac: &[f64],
    idx: &mut [u32],
    n_out: usize,
    sample_at: &impl Fn(&[u32]) -> Vec<f64>,
) -> Vec<f64> {
    let m = size.len();
    if dim == m {
        return sample_at(idx);
    }

    let t = frac[dim];
    if t == 0.0 {
        idx[dim] = i0[dim];
        return recurse(dim + 1, size, i0, frac, idx, n_out, sample_at);
    }

    let max_index = size[dim].saturating_sub(1);
    let mut fetch = |i: u32, idx: &mut [u32]| -> Vec<f64> {
        idx[dim] = i;
        recurse(dim + 1, size, i0, frac, idx, n_out, sample_at)
    };

    if size[dim] <= 2 {
        let p0 = fetch(i0[dim], idx);
        let p1 = fetch((i0[dim] + 1).min(max_index), idx);
        lerp_vec(&p0, &p1, t)
    } else if i0[dim] == 0 {
        let p_cur = fetch(0, idx);
        let p_next = fetch(1, idx);
        let p_next2 = fetch(2, idx);
        catmull_rom_vec(t, &p_cur, &p_cur, &p_next, &p_next2)
    } else if i0[dim] == max_index - 1 {
        let p_next = fetch(i0[dim] + 1, idx);
        let p_cur = fetch(i0[dim], idx);
        let p_prev = fetch(i0[dim] - 1, idx);
        catmull_rom_vec(1.0 - t, &p_next, &p_next, &p_cur, &p_prev)
    } else {
        let p_prev = fetch(i0[dim] - 1, idx);
        let p0 = fetch(i0[dim], idx);
        let p1 = fetch(i0[dim] + 1, idx);
        let p_next = fetch(i0[dim] + 2, idx);
        catmull_rom_vec(t, &p_prev, &p0, &p1, &p_next)
    }
}

fn lerp_vec(a: &[f64], b: &[f64], t: f64) -> Vec<f64> {
    a.iter().zip(b).map(|(&x, &y)| x + t * (y - x)).collect()
}

/// The uniform Catmull-Rom basis with tension α = -0.5, applied
/// componentwise to four control vectors `p_prev, p0, p1, p_next`.
fn catmull_rom_vec(t: f64, p_prev: &[f64], p0: &[f64], p1: &[f64], p_next: &[f64]) -> Vec<f64> {
    const A: f64 = -0.5;
    let x = t + 1.0;
    let u = t;
    let v = 1.0 - t;
    let w = 2.0 - t;
    let c_prev = A * x.powi(3) - 5.0 * A * x.powi(2) + 8.0 * A * x - 4.0 * A;
    let c0 = (A + 2.0) * u.powi(3) - (A + 3.0) * u.powi(2) + 1.0;
    let c1 = (A + 2.0) * v.powi(3) - (A + 3.0) * v.powi(2) + 1.0;
    let c_next = A * w.powi(3) - 5.0 * A * w.powi(2) + 8.0 * A * w - 4.0 * A;
    (0..p_prev.len()).map(|k| c_prev * p_prev[k] + c0 * p0[k] + c1 * p1[k] + c_next * p_next[k]).collect()
}
