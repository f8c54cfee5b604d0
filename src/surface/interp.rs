/// Interpolate total variance at `expiry` from per-tenor `(T, w)` nodes,
/// sorted by `T`.
///
/// - Exact matches (within 1e-12) return stored values directly.
/// - Before the first tenor: flat vol (w scaled by T/T₀).
/// - After the last tenor: flat vol (w scaled by T/Tₙ).
/// - Between tenors: linear in T.
pub(crate) fn interpolate_total_variance(nodes: &[(f64, f64)], expiry: f64) -> f64 {
    let n = nodes.len();
    if let Some(&(_, w)) = nodes.iter().find(|(t, _)| (expiry - t).abs() < 1e-12) {
        return w;
    }

    let (t_first, w_first) = nodes[0];
    if expiry < t_first {
        return w_first * expiry / t_first;
    }
    let (t_last, w_last) = nodes[n - 1];
    if expiry > t_last {
        return w_last * expiry / t_last;
    }

    let right = nodes.partition_point(|&(t, _)| t < expiry);
    let (t0, w0) = nodes[right - 1];
    let (t1, w1) = nodes[right];
    let alpha = (expiry - t0) / (t1 - t0);
    (1.0 - alpha) * w0 + alpha * w1
}

/// Indices of the nodes that [`interpolate_total_variance`] reads at `expiry`.
pub(crate) fn bracketing_nodes(tenors: &[f64], expiry: f64) -> (usize, usize) {
    let n = tenors.len();
    if let Some(i) = tenors.iter().position(|t| (expiry - t).abs() < 1e-12) {
        return (i, i);
    }
    if expiry < tenors[0] {
        return (0, 0);
    }
    if expiry > tenors[n - 1] {
        return (n - 1, n - 1);
    }
    let right = tenors.partition_point(|&t| t < expiry);
    (right - 1, right)
}
