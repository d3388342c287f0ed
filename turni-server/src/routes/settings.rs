//! Roster, feature toggles and backup endpoints

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::get,
};
use serde::{Deserialize, Serialize};
use turni_core::access::Permission;
use turni_core::backup::{Backup, ImportedBackup};
use turni_core::config::FeatureSettings;
use turni_core::roster::Roster;

use crate::routes::{AppError, authorize};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/roster", get(get_roster))
        .route("/features", get(get_features).put(put_features))
        .route("/backup", get(export_backup).post(import_backup))
}

/// GET /roster - Operators and roles in display order
async fn get_roster(State(state): State<AppState>) -> Result<Json<Roster>, AppError> {
    Ok(Json(state.turni()?.config().roster.clone()))
}

/// GET /features
async fn get_features(State(state): State<AppState>) -> Result<Json<FeatureSettings>, AppError> {
    Ok(Json(state.turni()?.config().features))
}

/// Toggles to change; missing fields keep their value
#[derive(Deserialize)]
pub struct FeaturesUpdate {
    pub show_whatsapp: Option<bool>,
    pub show_settings: Option<bool>,
    pub show_stats: Option<bool>,
}

/// PUT /features - Show or hide parts of the UI
async fn put_features(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<FeaturesUpdate>,
) -> Result<Json<FeatureSettings>, AppError> {
    let mut turni = state.turni()?;
    let user = authorize(&headers, turni.config(), Permission::HideFeatures)?.name.clone();

    let features = turni.edit_config(|config| {
        let features = &mut config.features;
        if let Some(v) = update.show_whatsapp {
            features.show_whatsapp = v;
        }
        if let Some(v) = update.show_settings {
            features.show_settings = v;
        }
        if let Some(v) = update.show_stats {
            features.show_stats = v;
        }
        Ok(*features)
    })?;
    tracing::info!(%user, ?features, "updated features");

    Ok(Json(features))
}

/// GET /backup - Settings and every assignment as one document
async fn export_backup(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Backup>, AppError> {
    let turni = state.turni()?;
    authorize(&headers, turni.config(), Permission::Read)?;

    let assignments = turni.store().load()?;
    Ok(Json(Backup::new(turni.config(), &assignments)))
}

#[derive(Serialize)]
pub struct ImportSummary {
    pub settings: bool,
    pub days: usize,
}

/// POST /backup - Restore a document produced by GET /backup
///
/// Settings fields are applied only when present with the right type.
/// Imported days replace stored days with the same date.
async fn import_backup(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<ImportSummary>, AppError> {
    let mut turni = state.turni()?;
    let user = authorize(&headers, turni.config(), Permission::Read)?.clone();

    let backup = ImportedBackup::parse(&body)?;
    if backup.settings.is_some() {
        user.role.require(Permission::ManageSettings)?;
    }
    if backup.assignments.is_some() {
        user.role.require(Permission::Write)?;
    }

    if let Some(settings) = &backup.settings {
        turni.edit_config(|config| {
            settings.apply_to(config);
            Ok(())
        })?;
    }

    let days = match backup.assignments {
        Some(assignments) => {
            let days = assignments.len();
            turni.store().import(assignments)?;
            days
        }
        None => 0,
    };

    tracing::info!(user = %user.name, days, "imported backup");
    Ok(Json(ImportSummary {
        settings: backup.settings.is_some(),
        days,
    }))
}
