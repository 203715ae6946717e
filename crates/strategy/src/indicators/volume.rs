/// Arithmetic mean. `None` for an empty slice; NaN inputs propagate.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Largest value, ignoring NaN. `None` for an empty or all-NaN slice.
pub fn max(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn max_skips_nan() {
        assert_eq!(max(&[1.0, f64::NAN, 3.0]), Some(3.0));
        assert_eq!(max(&[f64::NAN]), None);
        assert_eq!(max(&[]), None);
    }
}
