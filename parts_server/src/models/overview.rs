//! Overview (home page) rows: monthly series and part rankings.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Nullable, Text};
use serde::Serialize;

/// Spend per month, split by refurbished vs. new parts.
#[derive(Debug, Clone, Serialize, QueryableByName)]
pub struct MonthlyCost {
    #[diesel(sql_type = Text)]
    pub month: String,
    #[diesel(sql_type = Text)]
    pub part_kind: String,
    #[diesel(sql_type = Nullable<Double>)]
    pub total_cost: Option<f64>,
}

/// Replaced quantity per month, split by refurbished vs. new parts.
#[derive(Debug, Clone, Serialize, QueryableByName)]
pub struct MonthlyReplacements {
    #[diesel(sql_type = Text)]
    pub month: String,
    #[diesel(sql_type = Text)]
    pub part_kind: String,
    #[diesel(sql_type = Nullable<Double>)]
    pub total_quantity: Option<f64>,
}

/// Parts ranked by total spend.
#[derive(Debug, Clone, Serialize, QueryableByName)]
pub struct PartRanking {
    #[diesel(sql_type = BigInt)]
    pub position: i64,
    #[diesel(sql_type = Text)]
    pub part_name: String,
    #[diesel(sql_type = Nullable<Double>)]
    pub quantity: Option<f64>,
    #[diesel(sql_type = BigInt)]
    pub frequency: i64,
    #[diesel(sql_type = Nullable<Double>)]
    pub total_value: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub value_per_unit: Option<f64>,
}

/// Most replaced parts.
#[derive(Debug, Clone, Serialize, QueryableByName)]
pub struct MainPart {
    #[diesel(sql_type = Text)]
    pub part_name: String,
    #[diesel(sql_type = Nullable<Double>)]
    pub quantity: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub total_value: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub value_per_unit: Option<f64>,
}
