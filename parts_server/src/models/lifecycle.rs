//! Part-life rows: replacement intervals, odometer readings and estimates.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Date, Double, Nullable, Text};
use serde::Serialize;

/// Replacements of a part in the window.
#[derive(Debug, Clone, Serialize, QueryableByName)]
pub struct PartCount {
    #[diesel(sql_type = Text)]
    pub part_name: String,
    #[diesel(sql_type = BigInt)]
    pub quantity: i64,
}

/// A replacement followed by the next replacement of the same part on the
/// same vehicle.
#[derive(Debug, Clone, QueryableByName)]
pub struct ReplacementInterval {
    #[diesel(sql_type = Text)]
    pub vehicle_id: String,
    #[diesel(sql_type = Text)]
    pub part_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub part_code: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub model: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub asset_id: Option<String>,
    #[diesel(sql_type = BigInt)]
    pub replacement_number: i64,
    #[diesel(sql_type = Date)]
    pub service_date: NaiveDate,
    #[diesel(sql_type = Nullable<Double>)]
    pub odometer: Option<f64>,
    #[diesel(sql_type = Nullable<Date>)]
    pub next_service_date: Option<NaiveDate>,
    #[diesel(sql_type = Nullable<Double>)]
    pub next_odometer: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub part_value: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub current_odometer: Option<f64>,
}

impl ReplacementInterval {
    pub fn duration_km(&self) -> Option<f64> {
        Some(self.next_odometer? - self.odometer?)
    }

    pub fn duration_days(&self) -> Option<i64> {
        self.next_service_date
            .map(|next| (next - self.service_date).num_days())
    }
}

/// Highest odometer reading of a vehicle on one day.
#[derive(Debug, Clone, QueryableByName)]
pub struct DailyOdometer {
    #[diesel(sql_type = Text)]
    pub asset_id: String,
    #[diesel(sql_type = Date)]
    pub reading_date: NaiveDate,
    #[diesel(sql_type = Double)]
    pub odometer: f64,
}

/// Wear status of a part relative to its estimated replacement point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartStatus {
    Green,
    Yellow,
    Orange,
    Red,
    Unknown,
}

/// Life estimate for the latest replacement of a part on a vehicle.
#[derive(Debug, Clone, Serialize)]
pub struct PartLifeEstimate {
    pub vehicle_id: String,
    pub model: Option<String>,
    pub part_name: String,
    pub part_code: Option<String>,
    pub replacement_number: i64,
    pub service_date: NaiveDate,
    pub next_service_date: Option<NaiveDate>,
    pub odometer: Option<f64>,
    pub next_odometer: Option<f64>,
    pub duration_km: Option<f64>,
    pub duration_days: Option<i64>,
    pub avg_km_between_replacements: Option<f64>,
    pub avg_days_between_replacements: Option<f64>,
    pub avg_part_value: Option<f64>,
    pub estimated_replacement_odometer: Option<f64>,
    pub current_odometer: Option<f64>,
    pub km_remaining: Option<f64>,
    pub exceeded_estimate: bool,
    pub status: PartStatus,
    pub avg_daily_km: Option<f64>,
    pub days_until_replacement: Option<i64>,
    pub projected_replacement_date: Option<NaiveDate>,
}
