//! Descriptive statistics over latency samples.
//!
//! Every helper returns `None` on empty input; callers decide whether that is
//! an error.

/// Sort a copy of `samples` ascending.
pub fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Median of already sorted samples; averages the two middle values.
pub fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Nearest-rank percentile of already sorted samples.
///
/// Picks the value at rank `ceil(q * n)` (1-based), so the result is always
/// one of the samples.
pub fn nearest_rank(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let rank = (q * n as f64).ceil() as usize;
    let idx = rank.clamp(1, n) - 1;
    Some(sorted[idx])
}

/// Linearly interpolated quantile of already sorted samples.
pub fn linear_quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(samples: &[f64]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let m = mean(samples)?;
    let var = samples.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
    Some(var.sqrt())
}

/// Trailing rolling mean. Entry `i` of the result is the mean of
/// `samples[i + 1 - window..=i]`; positions without a full window are `None`.
pub fn rolling_mean(samples: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; samples.len()];
    }
    let mut out = Vec::with_capacity(samples.len());
    let mut sum = 0.0;
    for (i, &x) in samples.iter().enumerate() {
        sum += x;
        if i >= window {
            sum -= samples[i - window];
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Number of histogram bins for sorted samples, following numpy's `"auto"`
/// estimator: the smaller bin width of Sturges and Freedman-Diaconis wins,
/// Sturges alone when the IQR is zero.
pub fn auto_bin_count(sorted: &[f64]) -> usize {
    let n = sorted.len();
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return 1;
    };
    let range = max - min;
    if range <= 0.0 {
        return 1;
    }

    let sturges_width = range / ((n as f64).log2() + 1.0);
    let iqr = linear_quantile(sorted, 0.75).unwrap_or(0.0) - linear_quantile(sorted, 0.25).unwrap_or(0.0);
    let fd_width = 2.0 * iqr / (n as f64).cbrt();

    let width = if fd_width > 0.0 {
        sturges_width.min(fd_width)
    } else {
        sturges_width
    };
    ((range / width).ceil() as usize).max(1)
}

/// Equal-width bins over `[min, max]` of sorted samples as
/// `(lower edge, upper edge, count)`. The last bin includes `max`.
pub fn histogram(sorted: &[f64]) -> Vec<(f64, f64, usize)> {
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    let bins = auto_bin_count(sorted);
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };
    let mut counts = vec![0usize; bins];
    for &value in sorted {
        let idx = (((value - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (min + i as f64 * width, min + (i + 1) as f64 * width, c))
        .collect()
}
