//! Per-vehicle part record over `pecas_gerais`.

use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::filters::ReportFilter;
use crate::models::catalog::{labels, LabelRow};
use crate::models::part_history::PartHistoryRow;
use crate::query::ReportQuery;
use crate::services::overview_service::PART_DATE;

fn push_filters(query: &mut ReportQuery, filter: &ReportFilter) {
    query
        .and_between(PART_DATE, &filter.range)
        .and_any(r#""MODELO""#, &filter.models)
        .and_any(r#""EQUIPAMENTO""#, &filter.vehicles)
        .and_any(r#""GRUPO""#, &filter.groups);
}

fn parts_in_range_query(filter: &ReportFilter) -> ReportQuery {
    let mut query = ReportQuery::new(
        r#"SELECT DISTINCT "PRODUTO"::text AS label
FROM pecas_gerais
WHERE "PRODUTO" IS NOT NULL"#,
    );
    push_filters(&mut query, filter);
    query.push("\nORDER BY label");
    query
}

pub async fn parts_in_range(
    conn: &mut AsyncPgConnection,
    filter: &ReportFilter,
) -> anyhow::Result<Vec<String>> {
    let rows: Vec<LabelRow> = parts_in_range_query(filter).build().load(conn).await?;
    Ok(labels(rows))
}

fn part_history_query(filter: &ReportFilter) -> ReportQuery {
    let mut query = ReportQuery::new(
        r#"SELECT
    "EQUIPAMENTO"::text AS vehicle_id,
    "PRODUTO"::text AS part_name,
    "MODELO"::text AS model,
    "GRUPO"::text AS part_group,
    SUM("QUANTIDADE")::float8 AS total_quantity,
    SUM("VALOR")::float8 AS total_value,
    COUNT(*) AS replacement_count,
    MAX(TO_DATE("DATA", 'DD/MM/YYYY')) AS last_replacement_date
FROM pecas_gerais
WHERE "EQUIPAMENTO" IS NOT NULL
  AND "PRODUTO" IS NOT NULL"#,
    );
    push_filters(&mut query, filter);
    query.and_any(r#""PRODUTO""#, &filter.parts).push(
        r#"
GROUP BY "EQUIPAMENTO", "PRODUTO", "MODELO", "GRUPO"
ORDER BY last_replacement_date DESC NULLS LAST, vehicle_id, part_name"#,
    );
    query
}

/// Totals per vehicle and part, most recently replaced first.
pub async fn part_history(
    conn: &mut AsyncPgConnection,
    filter: &ReportFilter,
) -> anyhow::Result<Vec<PartHistoryRow>> {
    let rows = part_history_query(filter).build().load(conn).await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{DateRange, Selection};
    use chrono::NaiveDate;

    fn filter() -> ReportFilter {
        let mut filter = ReportFilter::new(DateRange {
            start: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        });
        filter.vehicles = Selection::Only(vec!["50100".into(), "50200".into()]);
        filter.parts = Selection::Only(vec!["LONA FREIO".into()]);
        filter
    }

    #[test]
    fn history_groups_and_filters_parts_last() {
        let query = part_history_query(&filter());
        assert!(query.sql().contains(r#""EQUIPAMENTO" = ANY($3)"#));
        assert!(query.sql().contains(r#""PRODUTO" = ANY($4)"#));
        let group_at = query.sql().find("GROUP BY").unwrap();
        let parts_at = query.sql().find(r#""PRODUTO" = ANY"#).unwrap();
        assert!(parts_at < group_at);
    }

    #[test]
    fn parts_dropdown_ignores_parts_selection() {
        let query = parts_in_range_query(&filter());
        assert!(!query.sql().contains(r#""PRODUTO" = ANY"#));
        assert_eq!(query.binds().len(), 3);
    }
}
