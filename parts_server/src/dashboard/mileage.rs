//! Distance covered since the previous replacement of each part.

use std::collections::BTreeMap;

use crate::dashboard::stats::round_to;
use crate::models::vehicle::{PartMileage, ReplacementReading};

/// For every part, compare the odometer at its two latest replacements.
///
/// Parts replaced only once, or whose readings lack an odometer, are left
/// out. Output is ordered by part name.
pub fn mileage_since_previous(readings: Vec<ReplacementReading>) -> Vec<PartMileage> {
    let mut by_part: BTreeMap<String, Vec<ReplacementReading>> = BTreeMap::new();
    for reading in readings {
        by_part
            .entry(reading.part_name.clone())
            .or_default()
            .push(reading);
    }

    by_part
        .into_iter()
        .filter_map(|(part_name, mut rows)| {
            rows.sort_by_key(|r| r.service_date);
            let [.., previous, last] = rows.as_slice() else {
                return None;
            };
            let km = last.odometer? - previous.odometer?;
            Some(PartMileage {
                part_name,
                km_since_previous_replacement: round_to(km, 2),
                last_replacement_date: last.service_date,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(part: &str, month: u32, odometer: Option<f64>) -> ReplacementReading {
        ReplacementReading {
            service_date: NaiveDate::from_ymd_opt(2025, month, 10).unwrap(),
            part_name: part.to_string(),
            odometer,
        }
    }

    #[test]
    fn uses_the_two_latest_replacements() {
        let rows = vec![
            reading("PASTILHA FREIO", 5, Some(150_000.0)),
            reading("PASTILHA FREIO", 1, Some(100_000.0)),
            reading("PASTILHA FREIO", 3, Some(125_000.456)),
        ];
        let result = mileage_since_previous(rows);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].km_since_previous_replacement, 24_999.54);
        assert_eq!(
            result[0].last_replacement_date,
            NaiveDate::from_ymd_opt(2025, 5, 10).unwrap()
        );
    }

    #[test]
    fn single_replacements_are_omitted() {
        let rows = vec![
            reading("FILTRO AR", 2, Some(10.0)),
            reading("CORREIA", 1, Some(1_000.0)),
            reading("CORREIA", 4, Some(21_000.0)),
        ];
        let result = mileage_since_previous(rows);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].part_name, "CORREIA");
        assert_eq!(result[0].km_since_previous_replacement, 20_000.0);
    }

    #[test]
    fn missing_odometer_is_omitted() {
        let rows = vec![reading("LONA", 1, None), reading("LONA", 2, Some(5.0))];
        assert!(mileage_since_previous(rows).is_empty());
    }

    #[test]
    fn ordered_by_part_name() {
        let rows = vec![
            reading("ZETA", 1, Some(0.0)),
            reading("ZETA", 2, Some(1.0)),
            reading("ALFA", 1, Some(0.0)),
            reading("ALFA", 2, Some(2.0)),
        ];
        let names: Vec<String> = mileage_since_previous(rows)
            .into_iter()
            .map(|m| m.part_name)
            .collect();
        assert_eq!(names, vec!["ALFA", "ZETA"]);
    }
}
