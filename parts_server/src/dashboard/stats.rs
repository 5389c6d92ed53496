//! Order statistics used to trim odometer and interval outliers.

/// Quantile with linear interpolation between closest ranks.
///
/// Returns `None` for empty input. `q` is clamped to `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q = q.clamp(0.0, 1.0);
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Inclusive `[q1 - factor*iqr, q3 + factor*iqr]` bounds.
pub fn iqr_bounds(values: &[f64], factor: f64) -> Option<(f64, f64)> {
    let q1 = quantile(values, 0.25)?;
    let q3 = quantile(values, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - factor * iqr, q3 + factor * iqr))
}

/// Keep the items whose key lies inside the IQR fences.
///
/// Items without a key are dropped once bounds exist. When no item has a key
/// the input is returned untouched.
pub fn retain_within_iqr<T, F>(items: Vec<T>, key: F, factor: f64) -> Vec<T>
where
    F: Fn(&T) -> Option<f64>,
{
    let values: Vec<f64> = items.iter().filter_map(&key).collect();
    let Some((low, high)) = iqr_bounds(&values, factor) else {
        return items;
    };
    items
        .into_iter()
        .filter(|item| key(item).is_some_and(|v| v >= low && v <= high))
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Round half away from zero to `digits` decimals.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0];
        approx(quantile(&values, 0.25).unwrap(), 1.75);
        approx(quantile(&values, 0.5).unwrap(), 2.5);
        approx(quantile(&values, 0.75).unwrap(), 3.25);
    }

    #[test]
    fn quantile_ignores_input_order() {
        let values = [40.0, 10.0, 30.0, 20.0, 50.0];
        approx(quantile(&values, 0.5).unwrap(), 30.0);
        approx(quantile(&values, 0.0).unwrap(), 10.0);
        approx(quantile(&values, 1.0).unwrap(), 50.0);
    }

    #[test]
    fn quantile_of_empty_is_none() {
        assert!(quantile(&[], 0.5).is_none());
        assert!(iqr_bounds(&[], 1.5).is_none());
    }

    #[test]
    fn iqr_bounds_single_value_collapse() {
        let (low, high) = iqr_bounds(&[7.0], 1.5).unwrap();
        approx(low, 7.0);
        approx(high, 7.0);
    }

    #[test]
    fn retain_within_iqr_drops_spikes() {
        let daily = vec![100.0, 110.0, 95.0, 105.0, 102.0, 2500.0];
        let kept = retain_within_iqr(daily, |v| Some(*v), 1.5);
        assert_eq!(kept, vec![100.0, 110.0, 95.0, 105.0, 102.0]);
    }

    #[test]
    fn retain_within_iqr_keeps_everything_without_keys() {
        let items = vec!["a", "b"];
        let kept = retain_within_iqr(items, |_| None, 1.5);
        assert_eq!(kept, vec!["a", "b"]);
    }

    #[test]
    fn round_to_two_decimals() {
        approx(round_to(1234.5678, 2), 1234.57);
        approx(round_to(2.5, 0), 3.0);
    }
}
