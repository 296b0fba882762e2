//! Pure statistics for correlation analysis

/// Compute Pearson's r over paired samples.
///
/// Defined as 0 when either series has zero variance or fewer than two
/// samples exist; the result is clamped to [-1, 1] against floating-point
/// drift.
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    let n = pairs.len() as f64;
    if n < 2.0 {
        return 0.0;
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut num = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        num += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }

    let denom = (denom_x * denom_y).sqrt();
    if denom < f64::EPSILON {
        0.0
    } else {
        (num / denom).clamp(-1.0, 1.0)
    }
}

/// t-statistic for a correlation over n samples:
/// `t = r * sqrt(n-2) / sqrt(1 - r^2)`
pub fn t_statistic(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 0.0;
    }
    let r2 = r * r;
    if (1.0 - r2) < f64::EPSILON {
        // Perfect correlation: the statistic diverges
        return if r >= 0.0 { f64::INFINITY } else { f64::NEG_INFINITY };
    }
    r * ((n - 2) as f64).sqrt() / (1.0 - r2).sqrt()
}

/// Map |t| through a stepwise four-bucket lookup to an approximate p-value.
///
/// This deliberately mirrors the original system's cheap approximation of
/// the t-distribution CDF rather than an exact one, so stored significance
/// values stay comparable across versions. The buckets correspond to the
/// two-tailed critical values at p = 0.01 / 0.05 / 0.10.
pub fn approx_p_value(t: f64) -> f64 {
    let t = t.abs();
    if t > 2.576 {
        0.01
    } else if t > 1.96 {
        0.05
    } else if t > 1.645 {
        0.10
    } else {
        0.20
    }
}

/// Approximate p-value for a correlation of r over n samples
pub fn significance(r: f64, n: usize) -> f64 {
    approx_p_value(t_statistic(r, n))
}
