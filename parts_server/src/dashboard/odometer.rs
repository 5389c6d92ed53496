//! Average daily distance per vehicle from daily GPS odometer readings.

use std::collections::HashMap;

use crate::dashboard::stats;
use crate::models::lifecycle::DailyOdometer;

/// Km driven per day between consecutive readings of one vehicle.
///
/// Gaps longer than a day are spread evenly; decreasing readings are dropped.
pub fn daily_deltas(readings: &[DailyOdometer]) -> Vec<f64> {
    let mut sorted: Vec<&DailyOdometer> = readings.iter().collect();
    sorted.sort_by_key(|r| r.reading_date);

    sorted
        .windows(2)
        .filter_map(|pair| {
            let gap = (pair[1].reading_date - pair[0].reading_date).num_days();
            if gap <= 0 {
                return None;
            }
            let delta = (pair[1].odometer - pair[0].odometer) / gap as f64;
            (delta >= 0.0).then_some(delta)
        })
        .collect()
}

/// Mean daily km after IQR filtering, or `None` when nothing usable remains.
pub fn average_daily_km(readings: &[DailyOdometer], iqr_factor: f64) -> Option<f64> {
    let deltas = daily_deltas(readings);
    let kept = stats::retain_within_iqr(deltas, |d| Some(*d), iqr_factor);
    stats::mean(&kept).filter(|avg| *avg > 0.0)
}

/// Average daily km keyed by asset id.
pub fn average_daily_km_by_asset(
    readings: Vec<DailyOdometer>,
    iqr_factor: f64,
) -> HashMap<String, f64> {
    let mut by_asset: HashMap<String, Vec<DailyOdometer>> = HashMap::new();
    for reading in readings {
        by_asset
            .entry(reading.asset_id.clone())
            .or_default()
            .push(reading);
    }

    by_asset
        .into_iter()
        .filter_map(|(asset, rows)| {
            average_daily_km(&rows, iqr_factor).map(|avg| (asset, avg))
        })
        .collect()
}
