//! Vehicle lists and per-vehicle replacement readings.

use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::filters::{DateRange, ReportFilter};
use crate::models::catalog::{labels, LabelRow};
use crate::models::vehicle::ReplacementReading;
use crate::query::ReportQuery;
use crate::services::overview_service::PART_DATE;

pub async fn vehicles_in_range(
    conn: &mut AsyncPgConnection,
    filter: &ReportFilter,
) -> anyhow::Result<Vec<String>> {
    let mut query = ReportQuery::new(
        r#"SELECT DISTINCT "EQUIPAMENTO"::text AS label
FROM pecas_gerais
WHERE "EQUIPAMENTO" IS NOT NULL"#,
    );
    query
        .and_between(PART_DATE, &filter.range)
        .and_any(r#""MODELO""#, &filter.models)
        .push("\nORDER BY label");

    let rows: Vec<LabelRow> = query.build().load(conn).await?;
    Ok(labels(rows))
}

fn replacement_readings_query(range: &DateRange, vehicle_id: &str) -> ReportQuery {
    let mut query = ReportQuery::new(
        r#"SELECT
    TO_DATE(data_os, 'YYYY-MM-DD') AS service_date,
    nome_pecas::text AS part_name,
    ultimo_hodometro::float8 AS odometer
FROM view_os_pecas_hodometro
WHERE nome_pecas IS NOT NULL"#,
    );
    query
        .and_between("TO_DATE(data_os, 'YYYY-MM-DD')", range)
        .and_eq("id_veiculo::text", vehicle_id)
        .push("\nORDER BY part_name, service_date");
    query
}

/// Every part replacement of one vehicle in the window, with odometer.
pub async fn replacement_readings(
    conn: &mut AsyncPgConnection,
    range: &DateRange,
    vehicle_id: &str,
) -> anyhow::Result<Vec<ReplacementReading>> {
    let rows = replacement_readings_query(range, vehicle_id)
        .build()
        .load(conn)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Bind;
    use chrono::NaiveDate;

    #[test]
    fn vehicle_id_is_bound() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
        };
        let query = replacement_readings_query(&range, "50100");
        assert!(query.sql().contains("id_veiculo::text = $3"));
        assert_eq!(query.binds()[2], Bind::Text("50100".into()));
    }
}
