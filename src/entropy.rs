//! Shannon entropy over byte slices.
//!
//! Entropy of section and resource contents is the statistical core of the
//! feature set: packed or encrypted payloads push it toward 8.0.

use std::ops::Range;

/// Calculates the Shannon entropy of a byte slice.
///
/// Returns a value between 0.0 and 8.0, where:
/// - 0.0 represents no randomness (e.g., all bytes are the same)
/// - 8.0 represents maximum randomness (uniform distribution)
///
/// Empty input yields 0.0 by definition. Single pass over the data with a
/// fixed 256-bin histogram.
#[inline]
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut histogram = [0usize; 256];
    for &byte in data {
        histogram[byte as usize] += 1;
    }

    let len = data.len() as f64;
    let mut entropy = 0.0;

    for &count in &histogram {
        if count == 0 {
            continue;
        }
        let p = (count as f64) / len;
        entropy -= p * p.log2();
    }

    entropy
}

/// Calculates entropy for a byte range within a slice, clamped to bounds.
#[inline]
pub fn entropy_range(data: &[u8], range: Range<usize>) -> f64 {
    let start = range.start.min(data.len());
    let end = range.end.min(data.len());
    if start >= end {
        return 0.0;
    }
    shannon_entropy(&data[start..end])
}
