//! Small numeric helpers behind the chart builders.

use serde::Serialize;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Pearson correlation.  `None` when fewer than two pairs or when either
/// side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mx = mean(&xs[..n])?;
    let my = mean(&ys[..n])?;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}

/// Linear-interpolated quantile of already sorted data, `q` in `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Five-number summary with Tukey whiskers (1.5 × IQR).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub mean: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        // Whiskers reach the most extreme points still inside the fences.
        let inside = sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
        let lower_whisker = inside.clone().next().unwrap_or(q1);
        let upper_whisker = inside.last().unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(BoxSummary {
            count: sorted.len(),
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            mean: mean(&sorted)?,
            outliers,
        })
    }
}

/// Integer histogram bin edges `[start, end)` covering `min..=max`.
///
/// Bin count follows Sturges' rule; widths are whole numbers because the
/// binned column (tenure) is integral.
pub fn integer_bins(min: i64, max: i64, n: usize) -> Vec<(i64, i64)> {
    if n == 0 || max < min {
        return Vec::new();
    }
    let span = max.abs_diff(min).saturating_add(1);
    let target = ((n as f64).log2().ceil() as u64).saturating_add(1);
    let width = span.div_ceil(target.min(span));
    let width = i64::try_from(width).unwrap_or(i64::MAX).max(1);

    let mut bins = Vec::new();
    let mut start = min;
    loop {
        let end = start.saturating_add(width);
        bins.push((start, end));
        if end > max || end == i64::MAX {
            break;
        }
        start = end;
    }
    bins
}
