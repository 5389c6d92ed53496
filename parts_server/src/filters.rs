//! Report filters: date ranges and multi-select values with an "all" sentinel.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::FilterError;

/// Sentinels the dashboard uses for "no restriction" (feminine and masculine forms).
pub const ALL_TERMS: [&str; 2] = ["TODAS", "TODOS"];

fn is_all_term(value: &str) -> bool {
    ALL_TERMS.contains(&value)
}

/// Inclusive `[start, end]` date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range from the raw `[start, end]` pair sent by the client.
    pub fn from_values(values: &[String]) -> Result<Self, FilterError> {
        let [start, end] = values else {
            return Err(FilterError::DateCount(values.len()));
        };
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if start > end {
            return Err(FilterError::ReversedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Accepts `YYYY-MM-DD`, an ISO datetime, or `DD/MM/YYYY`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, FilterError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return Ok(date);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(datetime.date());
        }
    }
    // Datetimes with an offset suffix: the calendar date is the first ten characters.
    if raw.len() > 10 && raw.is_char_boundary(10) {
        if let Ok(date) = NaiveDate::parse_from_str(&raw[..10], "%Y-%m-%d") {
            return Ok(date);
        }
    }
    Err(FilterError::InvalidDate(raw.to_string()))
}

/// A multi-select filter value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(Vec<String>),
}

impl Selection {
    /// Normalize a raw dropdown value.
    ///
    /// - nothing selected means everything;
    /// - picking the sentinel after other values resets to everything;
    /// - picking values after the sentinel drops the sentinel.
    pub fn from_values(values: Vec<String>) -> Self {
        let values: Vec<String> = values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();

        if values.is_empty() {
            return Self::All;
        }
        if values.iter().skip(1).any(|v| is_all_term(v)) {
            return Self::All;
        }

        let mut explicit: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            if !is_all_term(&value) && !explicit.contains(&value) {
                explicit.push(value);
            }
        }

        if explicit.is_empty() {
            Self::All
        } else {
            Self::Only(explicit)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether `value` passes this filter.
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(values) => value.is_some_and(|v| values.iter().any(|s| s == v)),
        }
    }

    /// Drop selected values that are no longer offered. Falls back to `All`
    /// when nothing survives.
    pub fn retain_available(self, available: &[String]) -> Self {
        match self {
            Self::All => Self::All,
            Self::Only(values) => {
                let kept: Vec<String> = values
                    .into_iter()
                    .filter(|v| available.contains(v))
                    .collect();
                if kept.is_empty() {
                    Self::All
                } else {
                    Self::Only(kept)
                }
            }
        }
    }

    /// Values as the dashboard expects them back, with the sentinel for `All`.
    pub fn to_values(&self, all_term: &str) -> Vec<String> {
        match self {
            Self::All => vec![all_term.to_string()],
            Self::Only(values) => values.clone(),
        }
    }
}

/// JSON body shared by every report endpoint. Omitted lists mean "all".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub workshops: Vec<String>,
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub parts: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// Validated report filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFilter {
    pub range: DateRange,
    pub models: Selection,
    pub workshops: Selection,
    pub sections: Selection,
    pub parts: Selection,
    pub vehicles: Selection,
    pub groups: Selection,
}

impl ReportFilter {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            models: Selection::All,
            workshops: Selection::All,
            sections: Selection::All,
            parts: Selection::All,
            vehicles: Selection::All,
            groups: Selection::All,
        }
    }
}

impl TryFrom<ReportRequest> for ReportFilter {
    type Error = FilterError;

    fn try_from(req: ReportRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            range: DateRange::from_values(&req.dates)?,
            models: Selection::from_values(req.models),
            workshops: Selection::from_values(req.workshops),
            sections: Selection::from_values(req.sections),
            parts: Selection::from_values(req.parts),
            vehicles: Selection::from_values(req.vehicles),
            groups: Selection::from_values(req.groups),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_selection_means_all() {
        assert_eq!(Selection::from_values(vec![]), Selection::All);
        assert_eq!(Selection::from_values(strings(&["", "  "])), Selection::All);
    }

    #[test]
    fn sentinel_alone_means_all() {
        assert_eq!(Selection::from_values(strings(&["TODAS"])), Selection::All);
        assert_eq!(Selection::from_values(strings(&["TODOS"])), Selection::All);
    }

    #[test]
    fn sentinel_picked_after_values_resets_to_all() {
        let sel = Selection::from_values(strings(&["OF-1", "OF-2", "TODAS"]));
        assert_eq!(sel, Selection::All);
    }

    #[test]
    fn values_picked_after_sentinel_drop_it() {
        let sel = Selection::from_values(strings(&["TODOS", "O500U", "OF1721"]));
        assert_eq!(sel, Selection::Only(strings(&["O500U", "OF1721"])));
    }

    #[test]
    fn explicit_values_are_deduplicated() {
        let sel = Selection::from_values(strings(&["A", "B", "A"]));
        assert_eq!(sel, Selection::Only(strings(&["A", "B"])));
    }

    #[test]
    fn retain_available_narrows_and_falls_back() {
        let available = strings(&["FILTRO AR", "PASTILHA"]);
        let sel = Selection::Only(strings(&["PASTILHA", "LONA"])).retain_available(&available);
        assert_eq!(sel, Selection::Only(strings(&["PASTILHA"])));

        let gone = Selection::Only(strings(&["LONA"])).retain_available(&available);
        assert_eq!(gone, Selection::All);
    }

    #[test]
    fn matches_respects_selection() {
        let sel = Selection::Only(strings(&["O500U"]));
        assert!(sel.matches(Some("O500U")));
        assert!(!sel.matches(Some("OF1721")));
        assert!(!sel.matches(None));
        assert!(Selection::All.matches(None));
    }

    #[test]
    fn to_values_uses_sentinel_for_all() {
        assert_eq!(Selection::All.to_values("TODAS"), strings(&["TODAS"]));
        assert_eq!(
            Selection::Only(strings(&["X"])).to_values("TODAS"),
            strings(&["X"])
        );
    }

    #[test]
    fn date_range_requires_two_dates() {
        assert!(matches!(
            DateRange::from_values(&strings(&["2025-01-01"])),
            Err(FilterError::DateCount(1))
        ));
        assert!(matches!(
            DateRange::from_values(&[]),
            Err(FilterError::DateCount(0))
        ));
    }

    #[test]
    fn date_range_accepts_supported_formats() {
        let range =
            DateRange::from_values(&strings(&["2024-08-01T00:00:00", "31/01/2025"])).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 8, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());

        let offset = parse_date("2025-03-04T10:00:00.000Z").unwrap();
        assert_eq!(offset, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
    }

    #[test]
    fn date_range_rejects_garbage_and_reversed() {
        assert!(matches!(
            DateRange::from_values(&strings(&["yesterday", "2025-01-01"])),
            Err(FilterError::InvalidDate(_))
        ));
        assert!(matches!(
            DateRange::from_values(&strings(&["2025-02-01", "2025-01-01"])),
            Err(FilterError::ReversedRange { .. })
        ));
    }

    #[test]
    fn single_day_range_is_valid() {
        let range = DateRange::from_values(&strings(&["2025-01-01", "2025-01-01"])).unwrap();
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()));
    }

    #[test]
    fn request_converts_into_filter() {
        let req = ReportRequest {
            dates: strings(&["2025-01-01", "2025-03-31"]),
            models: strings(&["TODOS"]),
            parts: strings(&["TODAS", "PASTILHA"]),
            ..Default::default()
        };
        let filter = ReportFilter::try_from(req).unwrap();
        assert!(filter.models.is_all());
        assert_eq!(filter.parts, Selection::Only(strings(&["PASTILHA"])));
        assert!(filter.workshops.is_all());
    }
}
