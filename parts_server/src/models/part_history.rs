use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Date, Double, Nullable, Text};
use serde::Serialize;

/// Per-vehicle record of one part: how often and how much was replaced.
#[derive(Debug, Clone, Serialize, QueryableByName)]
pub struct PartHistoryRow {
    #[diesel(sql_type = Text)]
    pub vehicle_id: String,
    #[diesel(sql_type = Text)]
    pub part_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub model: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub part_group: Option<String>,
    #[diesel(sql_type = Nullable<Double>)]
    pub total_quantity: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub total_value: Option<f64>,
    #[diesel(sql_type = BigInt)]
    pub replacement_count: i64,
    #[diesel(sql_type = Nullable<Date>)]
    pub last_replacement_date: Option<NaiveDate>,
}
