//! Statistics endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use serde_json::Value;
use turni_core::stats::{OperatorStats, Ranking, annual_stats, global_ranking, monthly_stats, operator_stats};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats/{view}", get(get_stats))
}

#[derive(Serialize)]
pub struct OperatorsView {
    pub operators: Vec<OperatorStats>,
    pub global: Ranking<String>,
}

/// GET /stats/{monthly|annual|operators}
async fn get_stats(State(state): State<AppState>, Path(view): Path<String>) -> Result<Json<Value>, AppError> {
    let turni = state.turni()?;
    let config = turni.config();

    if !config.features.show_stats {
        return Err(AppError::not_found("Statistics are turned off"));
    }

    let assignments = turni.store().load()?;
    let operators = &config.roster.operators;

    let value = match view.as_str() {
        "monthly" => serde_json::to_value(monthly_stats(&assignments, operators)),
        "annual" => serde_json::to_value(annual_stats(&assignments, operators)),
        "operators" => {
            let rows = operator_stats(&assignments, operators);
            let global = global_ranking(&rows);
            serde_json::to_value(OperatorsView { operators: rows, global })
        }
        other => return Err(AppError::not_found(format!("Unknown statistics view: {other}"))),
    }
    .map_err(|e| AppError::from(anyhow::Error::from(e)))?;

    Ok(Json(value))
}
