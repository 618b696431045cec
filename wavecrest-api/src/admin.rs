use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use wavecrest_catalog::{BlackoutDate, DurationClass, Settings, SettingsPatch, Unit};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/inventory", get(read_inventory).patch(replace_inventory))
        .route("/v1/settings", get(read_settings).patch(update_settings))
}

#[derive(Debug, Serialize)]
struct InventoryResponse {
    units: Vec<Unit>,
    duration_classes: Vec<DurationClass>,
    blackout_dates: Vec<BlackoutDate>,
}

async fn read_inventory(State(state): State<AppState>) -> Result<Json<InventoryResponse>, AppError> {
    inventory_snapshot(&state).await
}

/// Bulk inventory edit. Each present section is a whole-collection
/// overwrite: records missing from the submitted list are dropped.
#[derive(Debug, Deserialize)]
struct InventoryPatch {
    units: Option<Vec<Unit>>,
    duration_classes: Option<Vec<DurationClass>>,
    blackout_dates: Option<Vec<BlackoutDate>>,
}

async fn replace_inventory(
    State(state): State<AppState>,
    Json(patch): Json<InventoryPatch>,
) -> Result<Json<InventoryResponse>, AppError> {
    if let Some(units) = patch.units {
        state
            .catalog
            .replace_units(units)
            .await
            .map_err(AppError::store)?;
    }
    if let Some(classes) = patch.duration_classes {
        state
            .catalog
            .replace_duration_classes(classes)
            .await
            .map_err(AppError::store)?;
    }
    if let Some(dates) = patch.blackout_dates {
        state
            .catalog
            .replace_blackout_dates(dates)
            .await
            .map_err(AppError::store)?;
    }

    inventory_snapshot(&state).await
}

async fn inventory_snapshot(state: &AppState) -> Result<Json<InventoryResponse>, AppError> {
    let units = state.catalog.list_units().await.map_err(AppError::store)?;
    let duration_classes = state
        .catalog
        .list_duration_classes()
        .await
        .map_err(AppError::store)?;
    let blackout_dates = state
        .catalog
        .list_blackout_dates()
        .await
        .map_err(AppError::store)?;

    Ok(Json(InventoryResponse {
        units,
        duration_classes,
        blackout_dates,
    }))
}

#[derive(Debug, Serialize)]
struct SettingsResponse {
    settings: Settings,
}

async fn read_settings(State(state): State<AppState>) -> Result<Json<SettingsResponse>, AppError> {
    let settings = state.catalog.get_settings().await.map_err(AppError::store)?;
    Ok(Json(SettingsResponse { settings }))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = state
        .catalog
        .update_settings(patch)
        .await
        .map_err(AppError::store)?;
    Ok(Json(SettingsResponse { settings }))
}
