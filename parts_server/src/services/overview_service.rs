//! Home page reports over `pecas_gerais` joined with service-order data.

use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::filters::ReportFilter;
use crate::models::catalog::{labels, LabelRow};
use crate::models::overview::{MainPart, MonthlyCost, MonthlyReplacements, PartRanking};
use crate::query::ReportQuery;

pub const PART_DATE: &str = r#"TO_DATE("DATA", 'DD/MM/YYYY')"#;

const PART_KIND: &str = r#"CASE WHEN "PRODUTO" ILIKE '%recond%' THEN 'refurbished' ELSE 'new' END"#;

/// Append the shared WHERE clauses. The parts selection is optional so the
/// parts dropdown can list everything the other filters allow.
fn push_filters(query: &mut ReportQuery, filter: &ReportFilter, with_parts: bool) {
    query
        .and_between(PART_DATE, &filter.range)
        .and_any(r#""DESCRICAO DA SECAO""#, &filter.sections)
        .and_any(r#""MODELO""#, &filter.models)
        .and_any(r#""DESCRICAO DA OFICINA""#, &filter.workshops);
    if with_parts {
        query.and_any(r#""PRODUTO""#, &filter.parts);
    }
}

fn parts_in_range_query(filter: &ReportFilter) -> ReportQuery {
    let mut query = ReportQuery::new(
        r#"SELECT DISTINCT "PRODUTO"::text AS label
FROM pecas_gerais
LEFT JOIN os_dados ON "NUMERO DA OS" = "OS"
WHERE "PRODUTO" IS NOT NULL"#,
    );
    push_filters(&mut query, filter, false);
    query.push("\nORDER BY label");
    query
}

/// Part names available for the current date/model/workshop/section filter.
pub async fn parts_in_range(
    conn: &mut AsyncPgConnection,
    filter: &ReportFilter,
) -> anyhow::Result<Vec<String>> {
    let rows: Vec<LabelRow> = parts_in_range_query(filter).build().load(conn).await?;
    Ok(labels(rows))
}

/// Part lines deduplicated by `id`, tagged with month and kind.
fn monthly_query(filter: &ReportFilter, measure: &str, alias: &str) -> ReportQuery {
    let mut query = ReportQuery::new(&format!(
        r#"WITH lines AS (
    SELECT DISTINCT ON ("id")
        TO_CHAR({PART_DATE}, 'YYYY-MM') AS month,
        {PART_KIND} AS part_kind,
        {measure} AS measure
    FROM pecas_gerais
    LEFT JOIN os_dados ON "NUMERO DA OS" = "OS"
    WHERE TRUE"#
    ));
    push_filters(&mut query, filter, true);
    query.push(&format!(
        r#"
    ORDER BY "id", {PART_DATE}
)
SELECT month, part_kind, ROUND(SUM(measure)::numeric, 2)::float8 AS {alias}
FROM lines
GROUP BY month, part_kind
ORDER BY month, part_kind"#
    ));
    query
}

pub async fn monthly_cost(
    conn: &mut AsyncPgConnection,
    filter: &ReportFilter,
) -> anyhow::Result<Vec<MonthlyCost>> {
    let rows = monthly_query(filter, r#""VALOR""#, "total_cost")
        .build()
        .load(conn)
        .await?;
    Ok(rows)
}

pub async fn monthly_replacements(
    conn: &mut AsyncPgConnection,
    filter: &ReportFilter,
) -> anyhow::Result<Vec<MonthlyReplacements>> {
    let rows = monthly_query(filter, r#""QUANTIDADE""#, "total_quantity")
        .build()
        .load(conn)
        .await?;
    Ok(rows)
}

/// Per-part totals ranked by spend; `order_by` picks the output order.
fn ranking_query(filter: &ReportFilter, select: &str, order_by: &str) -> ReportQuery {
    let mut query = ReportQuery::new(
        r#"WITH lines AS (
    SELECT DISTINCT ON ("id")
        "id",
        "PRODUTO"::text AS part_name,
        "QUANTIDADE" AS quantity,
        "VALOR" AS value
    FROM pecas_gerais
    LEFT JOIN os_dados ON "NUMERO DA OS" = "OS"
    WHERE "PRODUTO" IS NOT NULL"#,
    );
    push_filters(&mut query, filter, true);
    query.push(&format!(
        r#"
),
ranked AS (
    SELECT
        part_name,
        SUM(quantity) AS quantity,
        COUNT(*) AS frequency,
        SUM(quantity * value) AS total_value,
        SUM(quantity * value) / NULLIF(SUM(quantity), 0) AS value_per_unit,
        RANK() OVER (ORDER BY SUM(quantity * value) DESC NULLS LAST) AS position
    FROM lines
    GROUP BY part_name
)
SELECT {select}
FROM ranked
ORDER BY {order_by}"#
    ));
    query
}

pub async fn part_ranking(
    conn: &mut AsyncPgConnection,
    filter: &ReportFilter,
) -> anyhow::Result<Vec<PartRanking>> {
    let rows = ranking_query(
        filter,
        "position, part_name, \
         ROUND(quantity::numeric, 2)::float8 AS quantity, \
         frequency, \
         ROUND(total_value::numeric, 2)::float8 AS total_value, \
         ROUND(value_per_unit::numeric, 2)::float8 AS value_per_unit",
        "position, part_name",
    )
    .build()
    .load(conn)
    .await?;
    Ok(rows)
}

pub async fn main_parts(
    conn: &mut AsyncPgConnection,
    filter: &ReportFilter,
) -> anyhow::Result<Vec<MainPart>> {
    let rows = ranking_query(
        filter,
        "part_name, \
         ROUND(quantity::numeric, 2)::float8 AS quantity, \
         ROUND(total_value::numeric, 2)::float8 AS total_value, \
         ROUND(value_per_unit::numeric, 2)::float8 AS value_per_unit",
        "quantity DESC NULLS LAST, part_name",
    )
    .build()
    .load(conn)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{DateRange, Selection};
    use crate::query::Bind;
    use chrono::NaiveDate;

    fn filter() -> ReportFilter {
        let mut filter = ReportFilter::new(DateRange {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        });
        filter.models = Selection::Only(vec!["O500U".into()]);
        filter.parts = Selection::Only(vec!["PASTILHA".into()]);
        filter
    }

    #[test]
    fn parts_dropdown_ignores_parts_selection() {
        let query = parts_in_range_query(&filter());
        assert!(!query.sql().contains(r#""PRODUTO" = ANY"#));
        assert!(query.sql().contains(r#""MODELO" = ANY($3)"#));
        assert_eq!(query.binds().len(), 3);
    }

    #[test]
    fn monthly_series_deduplicate_lines() {
        let query = monthly_query(&filter(), r#""VALOR""#, "total_cost");
        assert!(query.sql().contains(r#"DISTINCT ON ("id")"#));
        assert!(query.sql().contains("ILIKE '%recond%'"));
        assert!(query.sql().contains(r#""PRODUTO" = ANY($4)"#));
        assert!(query.sql().contains("AS total_cost"));
        assert_eq!(
            query.binds()[3],
            Bind::TextList(vec!["PASTILHA".into()])
        );
    }

    #[test]
    fn ranking_divides_safely() {
        let query = ranking_query(&filter(), "*", "position");
        assert!(query.sql().contains("NULLIF(SUM(quantity), 0)"));
        assert!(query.sql().contains("RANK() OVER"));
        assert!(query.sql().ends_with("ORDER BY position"));
    }
}
