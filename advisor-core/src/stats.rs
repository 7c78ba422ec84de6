//! Small statistics helpers used by the research commands.

/// Percentage change between consecutive values. Pairs with a non-positive
/// or non-finite base are skipped.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0].is_finite() && w[1].is_finite() && w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pearson correlation of two equally long samples.
///
/// `None` for mismatched lengths, fewer than two points or zero variance.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let (ma, mb) = (mean(a), mean(b));
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let (dx, dy) = (x - ma, y - mb);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    let r = cov / (var_a.sqrt() * var_b.sqrt());
    r.is_finite().then_some(r.clamp(-1.0, 1.0))
}

/// OLS slope of `asset` regressed on `market`.
pub fn beta(market: &[f64], asset: &[f64]) -> Option<f64> {
    if market.len() != asset.len() || market.len() < 2 {
        return None;
    }
    let (mm, ma) = (mean(market), mean(asset));
    let mut cov = 0.0;
    let mut var = 0.0;
    for (m, a) in market.iter().zip(asset) {
        cov += (m - mm) * (a - ma);
        var += (m - mm) * (m - mm);
    }
    if var == 0.0 {
        return None;
    }
    let b = cov / var;
    b.is_finite().then_some(b)
}
