use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::filters::ReportFilter;
use crate::models::catalog::{labels, LabelRow};
use crate::query::ReportQuery;
use crate::services::overview_service::PART_DATE;

fn services_in_range_query(filter: &ReportFilter) -> ReportQuery {
    let mut query = ReportQuery::new(
        r#"SELECT DISTINCT "DESCRICAO DO SERVICO"::text AS label
FROM os_dados
LEFT JOIN pecas_gerais ON "NUMERO DA OS" = "OS"
WHERE "DESCRICAO DO SERVICO" IS NOT NULL"#,
    );
    query
        .and_between(PART_DATE, &filter.range)
        .and_any(r#""DESCRICAO DA SECAO""#, &filter.sections)
        .and_any(r#""MODELO""#, &filter.models)
        .and_any(r#""DESCRICAO DA OFICINA""#, &filter.workshops)
        .push("\nORDER BY label");
    query
}

/// Service descriptions of work orders with parts in the window.
pub async fn services_in_range(
    conn: &mut AsyncPgConnection,
    filter: &ReportFilter,
) -> anyhow::Result<Vec<String>> {
    let rows: Vec<LabelRow> = services_in_range_query(filter).build().load(conn).await?;
    Ok(labels(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{DateRange, Selection};
    use chrono::NaiveDate;

    #[test]
    fn filters_by_workshop_and_section() {
        let mut filter = ReportFilter::new(DateRange {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        });
        filter.sections = Selection::Only(vec!["MANUTENCAO ELETRICA".into()]);
        filter.workshops = Selection::Only(vec!["GARAGEM CENTRAL".into()]);

        let query = services_in_range_query(&filter);
        assert!(query.sql().contains(r#""DESCRICAO DA SECAO" = ANY($3)"#));
        assert!(query.sql().contains(r#""DESCRICAO DA OFICINA" = ANY($4)"#));
        assert!(!query.sql().contains(r#""MODELO" = ANY"#));
        assert!(query.sql().ends_with("ORDER BY label"));
    }
}
