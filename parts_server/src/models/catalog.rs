//! Filter option rows.

use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use serde::Serialize;

/// A single dropdown label.
#[derive(Debug, Clone, Serialize, QueryableByName)]
pub struct LabelRow {
    #[diesel(sql_type = Text)]
    pub label: String,
}

/// A service description together with the section it belongs to.
#[derive(Debug, Clone, Serialize, QueryableByName)]
pub struct ServiceLabelRow {
    #[diesel(sql_type = Nullable<Text>)]
    pub section: Option<String>,
    #[diesel(sql_type = Text)]
    pub label: String,
}

/// Options for a dependent dropdown plus the selection corrected against them.
#[derive(Debug, Clone, Serialize)]
pub struct OptionsWithSelection {
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

pub fn labels(rows: Vec<LabelRow>) -> Vec<String> {
    rows.into_iter().map(|r| r.label).collect()
}
