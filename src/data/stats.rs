use std::cmp::Ordering;

/// Median of a numeric sequence.
///
/// Odd length: the middle element after sorting.  Even length: the mean of
/// the two middle elements.  `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Largest allowed deviation from `expected` under a relative tolerance.
pub fn tolerance_bound(expected: f64, rel_tol: f64) -> f64 {
    rel_tol * expected.abs()
}

/// `|actual - expected| <= rel_tol * |expected|`.  NaN never matches.
pub fn within_relative_tolerance(actual: f64, expected: f64, rel_tol: f64) -> bool {
    matches!(
        (actual - expected).abs().partial_cmp(&tolerance_bound(expected, rel_tol)),
        Some(Ordering::Less | Ordering::Equal)
    )
}
