//! Rotation and month grid endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use turni_core::ShiftInfo;
use turni_core::assignment::parse_date_key;
use turni_core::month::{MonthGrid, YearMonth};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shift/{date}", get(get_shift))
        .route("/month/{month}", get(get_month))
}

#[derive(Serialize)]
pub struct ShiftResponse {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub shift: ShiftInfo,
}

/// GET /shift/{date} - Where a day falls in the rotation
async fn get_shift(State(state): State<AppState>, Path(date): Path<String>) -> Result<Json<ShiftResponse>, AppError> {
    let date = parse_date_key(&date)?;
    let turni = state.turni()?;

    Ok(Json(ShiftResponse {
        date,
        shift: turni.shift(date),
    }))
}

/// GET /month/{yyyy-mm} - Monday-first grid with shifts and role coverage
async fn get_month(State(state): State<AppState>, Path(month): Path<String>) -> Result<Json<MonthGrid>, AppError> {
    let month = YearMonth::parse(&month)?;
    let turni = state.turni()?;
    let assignments = turni.store().load()?;

    let grid = MonthGrid::build(
        month,
        turni.config().base_date,
        Local::now().date_naive(),
        &turni.config().roster.roles,
        &assignments,
    );

    Ok(Json(grid))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{send, setup};

    #[tokio::test]
    async fn shift_for_a_date() {
        let (_dir, app) = setup();

        let (status, body) = send(&app, "GET", "/shift/2025-04-04", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["date"], "2025-04-04");
        assert_eq!(body["kind"], "morning");
        assert_eq!(body["offset"], 3);
        assert_eq!(body["active"], true);
    }

    #[tokio::test]
    async fn bad_date_is_400() {
        let (_dir, app) = setup();
        let (status, body) = send(&app, "GET", "/shift/2025-02-30", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("2025-02-30"));
    }

    #[tokio::test]
    async fn month_grid_is_padded() {
        let (_dir, app) = setup();

        let (status, body) = send(&app, "GET", "/month/2025-04", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let cells = body["cells"].as_array().unwrap();
        assert_eq!(cells.len() % 7, 0);
        assert!(cells[0].is_null());
        assert_eq!(cells[1]["date"], "2025-04-01");
        assert_eq!(cells[1]["roles"].as_array().unwrap().len(), 6);

        let (status, _) = send(&app, "GET", "/month/2025-13", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
