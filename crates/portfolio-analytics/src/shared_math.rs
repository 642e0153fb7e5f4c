/// Pure mathematical utilities for portfolio analytics.
/// Stateless functions, no async.

/// Compute daily returns from a price series. Steps from a zero price are skipped.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    if values.len() < 2 {
        return Vec::new();
    }
    values
        .windows(2)
        .filter_map(|w| {
            if w[0] != 0.0 {
                Some((w[1] - w[0]) / w[0])
            } else {
                None
            }
        })
        .collect()
}

/// Daily returns of two series over their most recent common window.
/// A step is dropped from both when either previous price is zero.
pub fn paired_returns(a: &[f64], b: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = a.len().min(b.len());
    let a = &a[a.len() - n..];
    let b = &b[b.len() - n..];

    let mut ra = Vec::with_capacity(n.saturating_sub(1));
    let mut rb = Vec::with_capacity(n.saturating_sub(1));
    for i in 1..n {
        if a[i - 1] == 0.0 || b[i - 1] == 0.0 {
            continue;
        }
        ra.push((a[i] - a[i - 1]) / a[i - 1]);
        rb.push((b[i] - b[i - 1]) / b[i - 1]);
    }
    (ra, rb)
}

/// Pearson coefficient over equal-length samples, clamped to [-1, 1].
/// Zero variance or fewer than 2 observations gives 0.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let x_mean: f64 = x[..n].iter().sum::<f64>() / nf;
    let y_mean: f64 = y[..n].iter().sum::<f64>() / nf;

    let mut ss_xy = 0.0;
    let mut ss_xx = 0.0;
    let mut ss_yy = 0.0;
    for i in 0..n {
        let dx = x[i] - x_mean;
        let dy = y[i] - y_mean;
        ss_xy += dx * dy;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
    }

    if ss_xx < 1e-15 || ss_yy < 1e-15 {
        return 0.0;
    }

    (ss_xy / (ss_xx * ss_yy).sqrt()).clamp(-1.0, 1.0)
}

/// Herfindahl index from weights (0-1 scale). Higher = more concentrated.
pub fn herfindahl_index(weights: &[f64]) -> f64 {
    weights.iter().map(|w| w * w).sum()
}

pub use analytics_core::trailing_return;
