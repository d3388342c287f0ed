//! Assignment endpoints

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
};
use serde::{Deserialize, Serialize};
use turni_core::access::Permission;
use turni_core::assignment::{diff_day, parse_date_key};
use turni_core::month::YearMonth;
use turni_core::whatsapp::{WhatsAppClient, plan_change_notifications};
use turni_core::{Assignments, DayAssignments, TurniError};

use crate::routes::{AppError, authorize};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/assignments", get(list_assignments))
        .route("/assignments/{date}", get(get_day).put(put_day))
}

#[derive(Deserialize)]
pub struct ListQuery {
    /// Only days in this month (`YYYY-MM`)
    pub month: Option<String>,
}

/// GET /assignments - Every stored day, optionally limited to one month
async fn list_assignments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Assignments>, AppError> {
    let all = state.turni()?.store().load()?;

    let Some(month) = query.month else {
        return Ok(Json(all));
    };

    let month = YearMonth::parse(&month)?;
    let mut filtered = Assignments::new();
    for (date, day) in all.in_month(month.year, month.month) {
        filtered.replace_day(*date, day.clone());
    }
    Ok(Json(filtered))
}

/// GET /assignments/{date} - Role → operator for one day (empty when nothing is assigned)
async fn get_day(State(state): State<AppState>, Path(date): Path<String>) -> Result<Json<DayAssignments>, AppError> {
    let date = parse_date_key(&date)?;
    let all = state.turni()?.store().load()?;
    Ok(Json(all.day(date).cloned().unwrap_or_default()))
}

/// Outcome of one WhatsApp message sent after a save
#[derive(Serialize)]
pub struct NotificationResult {
    pub operator: String,
    pub role: String,
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct SaveDayResponse {
    pub assignments: DayAssignments,
    pub notifications: Vec<NotificationResult>,
}

/// PUT /assignments/{date} - Replace the whole day
///
/// Body is a role → operator map; `null` or `""` leaves a role unassigned.
async fn put_day(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(date): Path<String>,
    Json(body): Json<BTreeMap<String, Option<String>>>,
) -> Result<Json<SaveDayResponse>, AppError> {
    let date = parse_date_key(&date)?;
    let turni = state.turni()?;
    let config = turni.config();
    let user = authorize(&headers, config, Permission::Write)?;

    let day: DayAssignments = body
        .into_iter()
        .filter_map(|(role, op)| op.filter(|op| !op.is_empty()).map(|op| (role, op)))
        .collect();

    let (updated, previous) = turni.store().update_day(date, |stored| {
        // Unchanged entries may refer to roles or operators removed from the roster since
        for change in diff_day(stored, &day) {
            if !config.roster.has_role(change.role()) {
                return Err(TurniError::Roster(format!("Unknown role: {}", change.role())));
            }
            if !config.roster.has_operator(change.operator()) {
                return Err(TurniError::Roster(format!("Unknown operator: {}", change.operator())));
            }
        }
        *stored = day;
        Ok(())
    })?;
    let saved = updated.day(date).cloned().unwrap_or_default();
    tracing::info!(user = %user.name, %date, roles = saved.len(), "saved day");

    let mut notifications = Vec::new();
    if config.features.show_whatsapp {
        let planned = plan_change_notifications(date, &previous, &saved, &config.whatsapp);
        if !planned.is_empty() {
            let client = WhatsAppClient::new(&config.whatsapp);
            for (message, result) in client.deliver(&planned).await {
                let (message_id, error) = match result {
                    Ok(receipt) => (receipt.message_id, None),
                    Err(e) => (None, Some(e.to_string())),
                };
                notifications.push(NotificationResult {
                    operator: message.operator,
                    role: message.role,
                    sent: error.is_none(),
                    message_id,
                    error,
                });
            }
        }
    }

    Ok(Json(SaveDayResponse {
        assignments: saved,
        notifications,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{ADMIN, OPERATOR, VIEWER, send, setup, setup_with};

    #[tokio::test]
    async fn put_then_get_day() {
        let (_dir, app) = setup();

        let body = json!({ "Sala 1": "Imelio", "Sala 2": null, "Olieria": "" }).to_string();
        let (status, saved) = send(&app, "PUT", "/assignments/2025-04-01", Some(OPERATOR), Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["assignments"], json!({ "Sala 1": "Imelio" }));
        assert_eq!(saved["notifications"], json!([]));

        let (status, day) = send(&app, "GET", "/assignments/2025-04-01", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(day, json!({ "Sala 1": "Imelio" }));

        let (_, empty) = send(&app, "GET", "/assignments/2025-04-02", None, None).await;
        assert_eq!(empty, json!({}));
    }

    #[tokio::test]
    async fn list_filters_by_month() {
        let (_dir, app) = setup();

        for date in ["2025-04-01", "2025-05-01"] {
            let body = json!({ "Sala 1": "Gemme" }).to_string();
            let uri = format!("/assignments/{date}");
            let (status, _) = send(&app, "PUT", &uri, Some(ADMIN), Some(body)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, all) = send(&app, "GET", "/assignments", None, None).await;
        assert_eq!(all.as_object().unwrap().len(), 2);

        let (_, april) = send(&app, "GET", "/assignments?month=2025-04", None, None).await;
        assert_eq!(april, json!({ "2025-04-01": { "Sala 1": "Gemme" } }));
    }

    #[tokio::test]
    async fn writes_need_a_token_with_write_permission() {
        let (_dir, app) = setup();
        let body = json!({ "Sala 1": "Imelio" }).to_string();

        let (status, _) = send(&app, "PUT", "/assignments/2025-04-01", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, err) = send(&app, "PUT", "/assignments/2025-04-01", Some(VIEWER), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(err["error"].as_str().unwrap().contains("write"));
    }

    #[tokio::test]
    async fn unknown_operator_is_rejected() {
        let (_dir, app) = setup();
        let body = json!({ "Sala 1": "Nobody" }).to_string();

        let (status, err) = send(&app, "PUT", "/assignments/2025-04-01", Some(ADMIN), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], "Roster error: Unknown operator: Nobody");
    }

    #[tokio::test]
    async fn unchanged_entries_survive_roster_removal() {
        let (_dir, app) = setup();
        let day = json!({ "Sala 1": "Imelio", "Sala 2": "Gemme" }).to_string();
        let (status, _) = send(&app, "PUT", "/assignments/2025-04-01", Some(ADMIN), Some(day.clone())).await;
        assert_eq!(status, StatusCode::OK);

        // Gemme leaves the roster
        let settings = json!({ "settings": { "operators": ["Imelio", "Pestarino"] } }).to_string();
        let (status, _) = send(&app, "POST", "/backup", Some(ADMIN), Some(settings)).await;
        assert_eq!(status, StatusCode::OK);

        // Saving the day as it was still works
        let (status, saved) = send(&app, "PUT", "/assignments/2025-04-01", Some(ADMIN), Some(day)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["assignments"]["Sala 2"], "Gemme");

        // Moving Gemme to another role is a change and is refused
        let moved = json!({ "Sala 1": "Imelio", "Sala 3": "Gemme" }).to_string();
        let (status, err) = send(&app, "PUT", "/assignments/2025-04-01", Some(ADMIN), Some(moved)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"].as_str().unwrap().contains("Gemme"));

        let (_, stored) = send(&app, "GET", "/assignments/2025-04-01", None, None).await;
        assert_eq!(stored, json!({ "Sala 1": "Imelio", "Sala 2": "Gemme" }));
    }

    #[tokio::test]
    async fn failed_notifications_are_reported_not_fatal() {
        let (_dir, app) = setup_with(
            r#"
[whatsapp]
enabled = true

[whatsapp.twilio]
account_sid = "AC123"
auth_token = "token"
whatsapp_number = "whatsapp:+14155238886"
api_url = "http://127.0.0.1:9"

[[whatsapp.contacts]]
name = "Imelio"
phone = "+393331234567"
enabled = true
"#,
        );

        let body = json!({ "Sala 1": "Imelio", "Sala 2": "Gemme" }).to_string();
        let (status, saved) = send(&app, "PUT", "/assignments/2025-04-01", Some(ADMIN), Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["assignments"]["Sala 1"], "Imelio");

        // Only Imelio has a contact
        let notifications = saved["notifications"].as_array().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["operator"], "Imelio");
        assert_eq!(notifications[0]["role"], "Sala 1");
        assert_eq!(notifications[0]["sent"], false);
        assert!(notifications[0]["error"].is_string());
        assert!(notifications[0].get("message_id").is_none());
    }
}
