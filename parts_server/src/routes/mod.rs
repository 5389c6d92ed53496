//! HTTP routes: catalog lists (GET) and filtered reports (POST).

pub mod report;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::config::DashboardConfig;
use crate::db::DbPool;
use crate::error::FilterError;
use crate::filters::{ReportRequest, ALL_TERMS};
use crate::models::catalog::{OptionsWithSelection, ServiceLabelRow};
use crate::models::lifecycle::{PartCount, PartLifeEstimate};
use crate::models::overview::{MainPart, MonthlyCost, MonthlyReplacements, PartRanking};
use crate::models::part_history::PartHistoryRow;
use crate::models::vehicle::PartMileage;
use crate::services::catalog_service::{self, Catalog};
use crate::services::{
    lifecycle_service, overview_service, part_history_service, service_order_service,
    vehicle_service,
};
use report::{collect, reject, validate};

/// Shared state for route handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: DashboardConfig,
}

/// Build the application router (`/health` plus the `/api` tree).
pub fn app_router(state: AppState) -> Router {
    let api = Router::new()
        // Catalogs
        .route("/catalog/services", get(catalog_services))
        .route("/catalog/{name}", get(catalog_list))
        // Overview
        .route("/overview/parts", post(overview_parts))
        .route("/overview/monthly-cost", post(monthly_cost))
        .route("/overview/monthly-replacements", post(monthly_replacements))
        .route("/overview/part-ranking", post(part_ranking))
        .route("/overview/main-parts", post(main_parts))
        // Service orders
        .route("/service-orders/services", post(service_order_services))
        // Part history
        .route("/part-history", post(part_history))
        .route("/part-history/parts", post(part_history_parts))
        // Vehicles
        .route("/vehicles", post(vehicles))
        .route("/vehicles/{vehicle_id}/mileage", post(vehicle_mileage))
        // Part life
        .route("/lifecycle/part-counts", post(lifecycle_part_counts))
        .route("/lifecycle/estimates", post(lifecycle_estimates));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ── Catalogs ──

async fn catalog_list(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>, StatusCode> {
    let catalog = Catalog::from_name(&name).ok_or(StatusCode::NOT_FOUND)?;
    let rows = collect(catalog.name(), async {
        let mut conn = state.pool.get().await?;
        catalog_service::list(&mut conn, catalog).await
    })
    .await;
    Ok(Json(rows))
}

async fn catalog_services(State(state): State<AppState>) -> Json<Vec<ServiceLabelRow>> {
    let rows = collect("services", async {
        let mut conn = state.pool.get().await?;
        catalog_service::list_services(&mut conn).await
    })
    .await;
    Json(rows)
}

// ── Overview ──

async fn overview_parts(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<OptionsWithSelection>, StatusCode> {
    let filter = validate("overview_parts", req)?;
    let options = collect("overview_parts", async {
        let mut conn = state.pool.get().await?;
        overview_service::parts_in_range(&mut conn, &filter).await
    })
    .await;
    let selected = filter
        .parts
        .retain_available(&options)
        .to_values(ALL_TERMS[0]);
    Ok(Json(OptionsWithSelection { options, selected }))
}

async fn monthly_cost(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Vec<MonthlyCost>>, StatusCode> {
    let filter = validate("monthly_cost", req)?;
    let rows = collect("monthly_cost", async {
        let mut conn = state.pool.get().await?;
        overview_service::monthly_cost(&mut conn, &filter).await
    })
    .await;
    Ok(Json(rows))
}

async fn monthly_replacements(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Vec<MonthlyReplacements>>, StatusCode> {
    let filter = validate("monthly_replacements", req)?;
    let rows = collect("monthly_replacements", async {
        let mut conn = state.pool.get().await?;
        overview_service::monthly_replacements(&mut conn, &filter).await
    })
    .await;
    Ok(Json(rows))
}

async fn part_ranking(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Vec<PartRanking>>, StatusCode> {
    let filter = validate("part_ranking", req)?;
    let rows = collect("part_ranking", async {
        let mut conn = state.pool.get().await?;
        overview_service::part_ranking(&mut conn, &filter).await
    })
    .await;
    Ok(Json(rows))
}

async fn main_parts(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Vec<MainPart>>, StatusCode> {
    let filter = validate("main_parts", req)?;
    let rows = collect("main_parts", async {
        let mut conn = state.pool.get().await?;
        overview_service::main_parts(&mut conn, &filter).await
    })
    .await;
    Ok(Json(rows))
}

// ── Service orders ──

async fn service_order_services(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Vec<String>>, StatusCode> {
    let filter = validate("service_order_services", req)?;
    let rows = collect("service_order_services", async {
        let mut conn = state.pool.get().await?;
        service_order_service::services_in_range(&mut conn, &filter).await
    })
    .await;
    Ok(Json(rows))
}

// ── Part history ──

async fn part_history_parts(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<OptionsWithSelection>, StatusCode> {
    let filter = validate("part_history_parts", req)?;
    let options = collect("part_history_parts", async {
        let mut conn = state.pool.get().await?;
        part_history_service::parts_in_range(&mut conn, &filter).await
    })
    .await;
    let selected = filter
        .parts
        .retain_available(&options)
        .to_values(ALL_TERMS[0]);
    Ok(Json(OptionsWithSelection { options, selected }))
}

async fn part_history(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Vec<PartHistoryRow>>, StatusCode> {
    let filter = validate("part_history", req)?;
    let rows = collect("part_history", async {
        let mut conn = state.pool.get().await?;
        part_history_service::part_history(&mut conn, &filter).await
    })
    .await;
    Ok(Json(rows))
}

// ── Vehicles ──

async fn vehicles(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Vec<String>>, StatusCode> {
    let filter = validate("vehicles", req)?;
    let rows = collect("vehicles", async {
        let mut conn = state.pool.get().await?;
        vehicle_service::vehicles_in_range(&mut conn, &filter).await
    })
    .await;
    Ok(Json(rows))
}

async fn vehicle_mileage(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Vec<PartMileage>>, StatusCode> {
    let filter = validate("vehicle_mileage", req)?;
    let vehicle_id = vehicle_id.trim();
    if vehicle_id.is_empty() {
        return Err(reject("vehicle_mileage", FilterError::EmptyVehicle));
    }
    let rows = collect("vehicle_mileage", async {
        let mut conn = state.pool.get().await?;
        let readings =
            vehicle_service::replacement_readings(&mut conn, &filter.range, vehicle_id).await?;
        Ok::<_, anyhow::Error>(crate::dashboard::mileage::mileage_since_previous(readings))
    })
    .await;
    Ok(Json(rows))
}

// ── Part life ──

async fn lifecycle_part_counts(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Vec<PartCount>>, StatusCode> {
    let filter = validate("lifecycle_part_counts", req)?;
    let rows = collect("lifecycle_part_counts", async {
        let mut conn = state.pool.get().await?;
        lifecycle_service::part_counts(&mut conn, &filter, &state.config.lifecycle).await
    })
    .await;
    Ok(Json(rows))
}

#[derive(Debug, Default, Deserialize)]
pub struct LifeReportRequest {
    #[serde(flatten)]
    pub filter: ReportRequest,
    /// Drop rows whose interval distance is an IQR outlier.
    #[serde(default)]
    pub remove_outliers: bool,
}

async fn lifecycle_estimates(
    State(state): State<AppState>,
    Json(req): Json<LifeReportRequest>,
) -> Result<Json<Vec<PartLifeEstimate>>, StatusCode> {
    let filter = validate("lifecycle_estimates", req.filter)?;
    let today = chrono::Local::now().date_naive();
    let rows = collect("lifecycle_estimates", async {
        let mut conn = state.pool.get().await?;
        lifecycle_service::estimates(
            &mut conn,
            &filter,
            &state.config.lifecycle,
            req.remove_outliers,
            today,
        )
        .await
    })
    .await;
    Ok(Json(rows))
}
