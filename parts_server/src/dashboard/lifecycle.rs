//! Part-life estimation.
//!
//! Input is every replacement interval that has a following replacement,
//! as produced by the window-function query. From those we derive
//! per-part averages, pick the latest interval of each `(vehicle, part)`,
//! project where the next replacement should happen and classify how close
//! the vehicle is to it.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};

use crate::config::LifecycleConfig;
use crate::dashboard::stats;
use crate::filters::{DateRange, Selection};
use crate::models::lifecycle::{PartLifeEstimate, PartStatus, ReplacementInterval};

/// Averages are computed per part name and part code.
type PartKey = (String, Option<String>);

/// Mean interval of a part across the fleet, rounded to whole units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartAverages {
    pub km: Option<f64>,
    pub days: Option<f64>,
    pub value: Option<f64>,
}

/// Average interval per part over intervals longer than `min_interval_km`.
pub fn part_averages(
    intervals: &[ReplacementInterval],
    min_interval_km: f64,
) -> HashMap<PartKey, PartAverages> {
    let mut samples: HashMap<PartKey, (Vec<f64>, Vec<f64>, Vec<f64>)> = HashMap::new();

    for interval in intervals {
        let Some(km) = interval.duration_km() else {
            continue;
        };
        if km <= min_interval_km {
            continue;
        }
        let entry = samples
            .entry((interval.part_name.clone(), interval.part_code.clone()))
            .or_default();
        entry.0.push(km);
        if let Some(days) = interval.duration_days() {
            entry.1.push(days as f64);
        }
        if let Some(value) = interval.part_value {
            entry.2.push(value);
        }
    }

    samples
        .into_iter()
        .map(|(key, (km, days, value))| {
            let averages = PartAverages {
                km: stats::mean(&km).map(f64::round),
                days: stats::mean(&days).map(f64::round),
                value: stats::mean(&value).map(f64::round),
            };
            (key, averages)
        })
        .collect()
}

/// The interval with the highest replacement number per `(vehicle, part)`.
///
/// Only intervals with a measured distance qualify, so a replacement logged
/// without an odometer falls back to the previous measured interval.
pub fn latest_intervals(intervals: Vec<ReplacementInterval>) -> Vec<ReplacementInterval> {
    let mut latest: HashMap<(String, String), ReplacementInterval> = HashMap::new();
    for interval in intervals {
        if interval.duration_km().is_none() {
            continue;
        }
        let key = (interval.vehicle_id.clone(), interval.part_name.clone());
        let newer = latest
            .get(&key)
            .map_or(true, |current| interval.replacement_number > current.replacement_number);
        if newer {
            latest.insert(key, interval);
        }
    }
    latest.into_values().collect()
}

/// Wear status given the odometer now, at the latest replacement, and the
/// part's average interval.
pub fn classify(
    current_odometer: Option<f64>,
    last_replacement_odometer: Option<f64>,
    avg_km: Option<f64>,
    config: &LifecycleConfig,
) -> PartStatus {
    let (Some(current), Some(last), Some(avg)) =
        (current_odometer, last_replacement_odometer, avg_km)
    else {
        return PartStatus::Unknown;
    };

    if current > last + avg {
        PartStatus::Red
    } else if current > last + avg * config.alert_ratio {
        PartStatus::Orange
    } else if current > last + avg * config.warn_ratio {
        PartStatus::Yellow
    } else {
        PartStatus::Green
    }
}

/// Days until the estimated replacement odometer is reached.
///
/// Zero once the estimate is exceeded; `None` without a usable daily average.
pub fn days_until_replacement(
    km_remaining: Option<f64>,
    exceeded: bool,
    avg_daily_km: Option<f64>,
) -> Option<i64> {
    if exceeded {
        return Some(0);
    }
    let remaining = km_remaining?;
    let daily = avg_daily_km.filter(|d| *d > 0.0)?;
    Some((remaining / daily).ceil().max(0.0) as i64)
}

/// Which rows make it into the life report.
#[derive(Debug, Clone)]
pub struct LifeReportScope<'a> {
    pub range: &'a DateRange,
    pub models: &'a Selection,
    pub remove_outliers: bool,
    pub today: NaiveDate,
}

/// Build the life report from raw intervals.
///
/// `daily_km` maps asset ids to their average daily distance.
pub fn estimate_part_life(
    intervals: Vec<ReplacementInterval>,
    daily_km: &HashMap<String, f64>,
    scope: &LifeReportScope<'_>,
    config: &LifecycleConfig,
) -> Vec<PartLifeEstimate> {
    let averages = part_averages(&intervals, config.min_interval_km);

    let latest: Vec<ReplacementInterval> = latest_intervals(intervals)
        .into_iter()
        .filter(|i| scope.range.contains(i.service_date))
        .filter(|i| scope.models.matches(i.model.as_deref()))
        .collect();

    let latest = if scope.remove_outliers {
        stats::retain_within_iqr(latest, ReplacementInterval::duration_km, config.iqr_factor)
    } else {
        latest
    };

    let mut rows: Vec<PartLifeEstimate> = latest
        .into_iter()
        .map(|interval| {
            let key = (interval.part_name.clone(), interval.part_code.clone());
            let avg = averages.get(&key).cloned().unwrap_or_default();
            let avg_daily_km = interval
                .asset_id
                .as_ref()
                .and_then(|asset| daily_km.get(asset))
                .copied();
            build_estimate(interval, avg, avg_daily_km, scope.today, config)
        })
        .collect();

    rows.sort_by(|a, b| {
        a.part_name
            .cmp(&b.part_name)
            .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
            .then_with(|| a.service_date.cmp(&b.service_date))
    });
    rows
}

fn build_estimate(
    interval: ReplacementInterval,
    avg: PartAverages,
    avg_daily_km: Option<f64>,
    today: NaiveDate,
    config: &LifecycleConfig,
) -> PartLifeEstimate {
    // The latest interval ends at the most recent replacement.
    let last_odometer = interval.next_odometer;
    let current = interval.current_odometer;

    // Compare against the unrounded target; only the reported values are rounded.
    let target = avg.km.zip(last_odometer).map(|(km, last)| km + last);
    let estimated = target.map(f64::round);
    let km_remaining = target.zip(current).map(|(t, cur)| (t - cur).round());
    let exceeded = matches!(target.zip(current), Some((t, cur)) if cur > t);
    let status = classify(current, last_odometer, avg.km, config);

    let days = days_until_replacement(km_remaining, exceeded, avg_daily_km);
    let projected = days.and_then(|d| today.checked_add_days(Days::new(d.max(0) as u64)));

    PartLifeEstimate {
        duration_km: interval.duration_km(),
        duration_days: interval.duration_days(),
        vehicle_id: interval.vehicle_id,
        model: interval.model,
        part_name: interval.part_name,
        part_code: interval.part_code,
        replacement_number: interval.replacement_number,
        service_date: interval.service_date,
        next_service_date: interval.next_service_date,
        odometer: interval.odometer,
        next_odometer: interval.next_odometer,
        avg_km_between_replacements: avg.km,
        avg_days_between_replacements: avg.days,
        avg_part_value: avg.value,
        estimated_replacement_odometer: estimated,
        current_odometer: current.map(f64::round),
        km_remaining,
        exceeded_estimate: exceeded,
        status,
        avg_daily_km: avg_daily_km.map(|d| stats::round_to(d, 2)),
        days_until_replacement: days,
        projected_replacement_date: projected,
    }
}
