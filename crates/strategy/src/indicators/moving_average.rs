use super::volume::mean;

/// Mean of the `window` values ending at `end` (inclusive).
///
/// Returns `None` when fewer than `window` values are available at `end`.
pub fn trailing_mean(values: &[f64], end: usize, window: usize) -> Option<f64> {
    if window == 0 || end >= values.len() || end + 1 < window {
        return None;
    }
    mean(&values[end + 1 - window..=end])
}
