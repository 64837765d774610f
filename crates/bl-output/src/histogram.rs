//! Equal-width histogram of waiting times.

use serde::Serialize;

/// One histogram bucket covering `[lower, upper)`; the last bucket also
/// includes `upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Bucket `waits` into `bins` equal-width bins spanning `[min, max]`.
///
/// Non-finite values are skipped.  No values or zero bins yield an empty
/// vector; when every value is equal there is a single bin holding them all.
pub fn wait_histogram(waits: &[f64], bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = waits.iter().copied().filter(|w| w.is_finite()).collect();
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if max <= min {
        return vec![HistogramBin { lower: min, upper: max, count: values.len() }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for w in values {
        let idx = (((w - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}
