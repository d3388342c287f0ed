//! API user endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use turni_core::access::{Permission, UserRole};
use turni_core::config::ApiUser;

use crate::routes::{AppError, authorize};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(add_user))
        .route("/users/{name}", delete(remove_user))
        .route("/users/{name}/approve", post(approve_user))
}

/// A user without their token
#[derive(Serialize)]
pub struct UserSummary {
    pub name: String,
    pub role: UserRole,
    pub pending: bool,
}

impl From<&ApiUser> for UserSummary {
    fn from(user: &ApiUser) -> Self {
        UserSummary {
            name: user.name.clone(),
            role: user.role,
            pending: user.role.is_pending_admin(),
        }
    }
}

/// GET /users
async fn list_users(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Vec<UserSummary>>, AppError> {
    let turni = state.turni()?;
    let config = turni.config();
    authorize(&headers, config, Permission::ManageUsers)?;

    Ok(Json(config.users.iter().map(UserSummary::from).collect()))
}

#[derive(Deserialize)]
pub struct NewUser {
    pub name: String,
    pub role: Option<UserRole>,
}

/// POST /users - Register a user; the response carries their token once
async fn add_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(new_user): Json<NewUser>,
) -> Result<Json<ApiUser>, AppError> {
    let mut turni = state.turni()?;
    let by = authorize(&headers, turni.config(), Permission::ManageUsers)?.name.clone();

    let user = turni.edit_config(|config| config.add_user(&new_user.name, new_user.role))?;
    tracing::info!(%by, user = %user.name, role = %user.role, "added user");

    Ok(Json(user))
}

/// POST /users/{name}/approve - Promote a pending admin
async fn approve_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<UserSummary>, AppError> {
    let mut turni = state.turni()?;
    let by = authorize(&headers, turni.config(), Permission::ManageUsers)?.name.clone();

    let role = turni.edit_config(|config| config.approve_user(&name))?;
    tracing::info!(%by, user = %name, "approved admin");

    Ok(Json(UserSummary {
        name,
        role,
        pending: role.is_pending_admin(),
    }))
}

/// DELETE /users/{name}
async fn remove_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<UserSummary>, AppError> {
    let mut turni = state.turni()?;
    let caller = authorize(&headers, turni.config(), Permission::ManageUsers)?.clone();
    caller.role.require(Permission::Delete)?;

    let removed = turni.edit_config(|config| config.remove_user(&name))?;
    tracing::info!(by = %caller.name, user = %removed.name, "removed user");

    Ok(Json(UserSummary::from(&removed)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{ADMIN, OPERATOR, send, setup};

    #[tokio::test]
    async fn only_admins_see_users() {
        let (_dir, app) = setup();

        let (status, _) = send(&app, "GET", "/users", Some(OPERATOR), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, users) = send(&app, "GET", "/users", Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(users[0], json!({ "name": "boss", "role": "admin", "pending": false }));
        assert!(users[0].get("token").is_none());
    }

    #[tokio::test]
    async fn admin_signup_waits_for_approval() {
        let (_dir, app) = setup();
        let body = json!({ "name": "capo", "role": "admin" }).to_string();

        let (status, created) = send(&app, "POST", "/users", Some(ADMIN), Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["role"], "pending_admin");
        let token = created["token"].as_str().unwrap().to_string();

        // Pending admins can only read
        let (status, _) = send(&app, "GET", "/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, approved) = send(&app, "POST", "/users/capo/approve", Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved, json!({ "name": "capo", "role": "admin", "pending": false }));

        let (status, _) = send(&app, "GET", "/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        // Already approved
        let (status, _) = send(&app, "POST", "/users/capo/approve", Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn remove_user_and_keep_last_admin() {
        let (_dir, app) = setup();

        let (status, removed) = send(&app, "DELETE", "/users/desk", Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(removed["role"], "operatore");

        let (status, _) = send(&app, "DELETE", "/users/boss", Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "DELETE", "/users/ghost", Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, users) = send(&app, "GET", "/users", Some(ADMIN), None).await;
        assert_eq!(users.as_array().unwrap().len(), 2);
    }
}
