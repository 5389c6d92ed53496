//! Vehicle odometer-at-replacement rows.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{Date, Double, Nullable, Text};
use serde::Serialize;

/// One part replacement on a vehicle with the odometer at service time.
#[derive(Debug, Clone, QueryableByName)]
pub struct ReplacementReading {
    #[diesel(sql_type = Date)]
    pub service_date: NaiveDate,
    #[diesel(sql_type = Text)]
    pub part_name: String,
    #[diesel(sql_type = Nullable<Double>)]
    pub odometer: Option<f64>,
}

/// Distance covered between the two latest replacements of a part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartMileage {
    pub part_name: String,
    pub km_since_previous_replacement: f64,
    pub last_replacement_date: NaiveDate,
}
