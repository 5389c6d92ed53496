//! Part-life report: replacement intervals from the odometer-enriched
//! work-order views, plus daily GPS odometer history for projections.

use std::collections::{BTreeSet, HashMap};

use chrono::{Days, NaiveDate};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::config::LifecycleConfig;
use crate::dashboard::lifecycle::{estimate_part_life, LifeReportScope};
use crate::dashboard::odometer;
use crate::filters::ReportFilter;
use crate::models::lifecycle::{
    DailyOdometer, PartCount, PartLifeEstimate, ReplacementInterval,
};
use crate::query::{Bind, ReportQuery};

fn part_counts_query(filter: &ReportFilter, config: &LifecycleConfig) -> ReportQuery {
    let mut query = ReportQuery::new(
        r#"SELECT vph.nome_pecas::text AS part_name, COUNT(*) AS quantity
FROM mat_view_os_pecas_hodometro_v3 vph
LEFT JOIN veiculos_api va ON va."Description" = vph.id_veiculo
WHERE vph.nome_pecas IS NOT NULL"#,
    );
    query
        .and_not_any("vph.grupo_peca", &config.excluded_groups)
        .and_not_any("vph.sub_grupo_peca", &config.excluded_subgroups)
        .and_between("TO_DATE(vph.data_peca, 'YYYY-MM-DD')", &filter.range)
        .and_any(r#"va."Model""#, &filter.models)
        .push("\nGROUP BY vph.nome_pecas\nORDER BY quantity DESC, part_name");
    query
}

/// Replacements per part in the window, most replaced first.
pub async fn part_counts(
    conn: &mut AsyncPgConnection,
    filter: &ReportFilter,
    config: &LifecycleConfig,
) -> anyhow::Result<Vec<PartCount>> {
    let rows = part_counts_query(filter, config).build().load(conn).await?;
    Ok(rows)
}

/// Every replacement that has a following replacement of the same part on
/// the same vehicle, across the whole history. Averages need all of it, so
/// the date window is applied afterwards.
fn intervals_query(config: &LifecycleConfig) -> ReportQuery {
    let mut query = ReportQuery::new(
        r#"WITH replacements AS (
    SELECT
        vph.id_veiculo::text AS vehicle_id,
        vph.nome_pecas::text AS part_name,
        vph.codigo_peca::text AS part_code,
        TO_DATE(vph.data_os, 'YYYY-MM-DD') AS service_date,
        vph.ultimo_hodometro::float8 AS odometer,
        vph.valor_peca::float8 AS part_value
    FROM mat_view_os_pecas_hodometro_v2 vph
    WHERE vph.id_veiculo IS NOT NULL
      AND vph.nome_pecas IS NOT NULL
      AND vph.data_os IS NOT NULL"#,
    );
    query
        .and_not_any("vph.grupo_peca", &config.excluded_groups)
        .and_not_any("vph.sub_grupo_peca", &config.excluded_subgroups)
        .push(
            r#"
),
intervals AS (
    SELECT
        r.*,
        ROW_NUMBER() OVER w AS replacement_number,
        LEAD(r.service_date) OVER w AS next_service_date,
        LEAD(r.odometer) OVER w AS next_odometer
    FROM replacements r
    WINDOW w AS (PARTITION BY r.vehicle_id, r.part_name ORDER BY r.service_date)
),
fleet AS (
    SELECT
        va."AssetId"::text AS asset_id,
        va."Description"::text AS vehicle_code,
        va."Model"::text AS model,
        latest.maior_km_dia::float8 AS current_odometer
    FROM veiculos_api va
    LEFT JOIN LATERAL (
        SELECT mvod.maior_km_dia
        FROM mat_view_odometro_diario mvod
        WHERE mvod."AssetId" = va."AssetId"
        ORDER BY mvod.year_month_day DESC
        LIMIT 1
    ) latest ON TRUE
)
SELECT
    i.vehicle_id,
    i.part_name,
    i.part_code,
    f.model,
    f.asset_id,
    i.replacement_number,
    i.service_date,
    i.odometer,
    i.next_service_date,
    i.next_odometer,
    i.part_value,
    f.current_odometer
FROM intervals i
LEFT JOIN fleet f ON f.vehicle_code = i.vehicle_id
WHERE i.next_service_date IS NOT NULL
  AND i.odometer IS NOT NULL
  AND i.next_odometer IS NOT NULL
ORDER BY i.part_name, i.vehicle_id, i.service_date"#,
        );
    query
}

pub async fn replacement_intervals(
    conn: &mut AsyncPgConnection,
    config: &LifecycleConfig,
) -> anyhow::Result<Vec<ReplacementInterval>> {
    let rows = intervals_query(config).build().load(conn).await?;
    Ok(rows)
}

fn daily_odometer_query(asset_ids: Vec<String>, since: NaiveDate) -> ReportQuery {
    let mut query = ReportQuery::new(
        r#"SELECT
    mvod."AssetId"::text AS asset_id,
    mvod.year_month_day::date AS reading_date,
    mvod.maior_km_dia::float8 AS odometer
FROM mat_view_odometro_diario mvod
WHERE mvod.maior_km_dia IS NOT NULL
  AND mvod.year_month_day IS NOT NULL"#,
    );
    let since = query.bind(Bind::Date(since));
    let assets = query.bind(Bind::TextList(asset_ids));
    query.push(&format!(
        "\n AND mvod.year_month_day::date >= {since}\
         \n AND mvod.\"AssetId\"::text = ANY({assets})\
         \nORDER BY asset_id, reading_date"
    ));
    query
}

/// Daily odometer readings of the given assets since `since`.
pub async fn daily_odometer(
    conn: &mut AsyncPgConnection,
    asset_ids: Vec<String>,
    since: NaiveDate,
) -> anyhow::Result<Vec<DailyOdometer>> {
    if asset_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = daily_odometer_query(asset_ids, since)
        .build()
        .load(conn)
        .await?;
    Ok(rows)
}

/// Full life report for the filter window.
pub async fn estimates(
    conn: &mut AsyncPgConnection,
    filter: &ReportFilter,
    config: &LifecycleConfig,
    remove_outliers: bool,
    today: NaiveDate,
) -> anyhow::Result<Vec<PartLifeEstimate>> {
    let intervals = replacement_intervals(conn, config).await?;

    let assets: BTreeSet<String> = intervals
        .iter()
        .filter(|i| filter.range.contains(i.service_date))
        .filter_map(|i| i.asset_id.clone())
        .collect();

    let since = today
        .checked_sub_days(Days::new(config.odometer_lookback_days.max(0) as u64))
        .unwrap_or(today);
    let readings = daily_odometer(conn, assets.into_iter().collect(), since).await?;
    let daily_km: HashMap<String, f64> =
        odometer::average_daily_km_by_asset(readings, config.iqr_factor);

    tracing::debug!(
        intervals = intervals.len(),
        vehicles_with_daily_km = daily_km.len(),
        all_models = filter.models.is_all(),
        "Estimating part life"
    );

    let scope = LifeReportScope {
        range: &filter.range,
        models: &filter.models,
        remove_outliers,
        today,
    };
    Ok(estimate_part_life(intervals, &daily_km, &scope, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{DateRange, Selection};

    fn filter() -> ReportFilter {
        let mut filter = ReportFilter::new(DateRange {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        });
        filter.models = Selection::Only(vec!["O500U".into()]);
        filter
    }

    #[test]
    fn part_counts_apply_exclusions_before_window() {
        let query = part_counts_query(&filter(), &LifecycleConfig::default());
        assert!(query.sql().contains("vph.grupo_peca <> ALL($1)"));
        assert!(query.sql().contains("vph.sub_grupo_peca <> ALL($2)"));
        assert!(query.sql().contains("BETWEEN $3 AND $4"));
        assert!(query.sql().contains(r#"va."Model" = ANY($5)"#));
    }

    #[test]
    fn exclusions_can_be_disabled() {
        let config = LifecycleConfig {
            excluded_groups: Vec::new(),
            excluded_subgroups: Vec::new(),
            ..LifecycleConfig::default()
        };
        let query = intervals_query(&config);
        assert!(!query.sql().contains("<> ALL"));
        assert!(query.binds().is_empty());
    }

    #[test]
    fn intervals_use_window_functions_per_vehicle_and_part() {
        let query = intervals_query(&LifecycleConfig::default());
        assert!(query
            .sql()
            .contains("PARTITION BY r.vehicle_id, r.part_name ORDER BY r.service_date"));
        assert!(query.sql().contains("LEAD(r.odometer) OVER w"));
        assert!(query.sql().contains("WHERE i.next_service_date IS NOT NULL"));
        assert!(query.sql().contains("AND i.odometer IS NOT NULL"));
        assert!(query.sql().contains("AND i.next_odometer IS NOT NULL"));
        assert!(query.sql().contains("AND vph.data_os IS NOT NULL"));
        assert_eq!(query.binds().len(), 2);
    }

    #[test]
    fn daily_odometer_binds_window_and_assets() {
        let since = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let query = daily_odometer_query(vec!["A1".into()], since);
        assert!(query.sql().contains(">= $1"));
        assert!(query.sql().contains("= ANY($2)"));
        assert!(query.sql().contains("AND mvod.year_month_day IS NOT NULL"));
        assert_eq!(query.binds()[0], Bind::Date(since));
    }
}
