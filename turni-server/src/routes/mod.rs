pub mod assignments;
pub mod calendar;
pub mod settings;
pub mod stats;
pub mod users;

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use turni_core::TurniError;
use turni_core::access::Permission;
use turni_core::config::{ApiUser, TurniConfig};

use crate::state::AppState;

/// All API routes, without state.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(calendar::router())
        .merge(assignments::router())
        .merge(stats::router())
        .merge(settings::router())
        .merge(users::router())
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        AppError {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "request failed");
        }
        let body = Json(ErrorResponse { error: self.message });
        (self.status, body).into_response()
    }
}

impl From<TurniError> for AppError {
    fn from(err: TurniError) -> Self {
        let status = match &err {
            TurniError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            TurniError::InvalidDate(_)
            | TurniError::Roster(_)
            | TurniError::User(_)
            | TurniError::Serialization(_)
            | TurniError::InvalidPhone(_) => StatusCode::BAD_REQUEST,
            TurniError::Notification { .. } | TurniError::Http(_) => StatusCode::BAD_GATEWAY,
            TurniError::Config(_) | TurniError::Store(_) | TurniError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

/// Resolve the caller from `Authorization: Bearer <token>` and check that
/// their role grants `permission`.
pub fn authorize<'a>(
    headers: &HeaderMap,
    config: &'a TurniConfig,
    permission: Permission,
) -> Result<&'a ApiUser, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;

    let user = config
        .user_for_token(token.trim())
        .ok_or_else(|| AppError::unauthorized("Unknown token"))?;

    user.role.require(permission)?;
    Ok(user)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::state::AppState;

    pub const ADMIN: &str = "admin-token";
    pub const OPERATOR: &str = "operator-token";
    pub const VIEWER: &str = "viewer-token";

    /// A config in a temp dir with one user per role and WhatsApp off.
    pub fn setup() -> (TempDir, Router) {
        setup_with("")
    }

    /// Like [`setup`] with `extra` appended to the config file.
    pub fn setup_with(extra: &str) -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!(
                r#"data_dir = "{data}"

[[users]]
name = "boss"
token = "{ADMIN}"
role = "admin"

[[users]]
name = "desk"
token = "{OPERATOR}"
role = "operatore"

[[users]]
name = "wall"
token = "{VIEWER}"
role = "visualizzatore"
{extra}"#,
                data = dir.path().join("data").display()
            ),
        )
        .unwrap();

        let app = super::router().with_state(AppState::with_config(config_path));
        (dir, app)
    }

    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turni_errors_map_to_status_codes() {
        let forbidden: AppError = TurniError::PermissionDenied(Permission::Write).into();
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

        let bad: AppError = TurniError::InvalidDate("2025-02-30".into()).into();
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let user: AppError = TurniError::User("At least one admin must remain".into()).into();
        assert_eq!(user.status, StatusCode::BAD_REQUEST);

        let internal: AppError = TurniError::Store("broken".into()).into();
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn authorize_checks_token_and_role() {
        let mut config = TurniConfig::default();
        config.users.push(ApiUser {
            name: "wall".into(),
            token: "t".into(),
            role: turni_core::access::UserRole::Viewer,
        });

        let mut headers = HeaderMap::new();
        let missing = authorize(&headers, &config, Permission::Read).unwrap_err();
        assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

        headers.insert(header::AUTHORIZATION, "Bearer t".parse().unwrap());
        assert_eq!(authorize(&headers, &config, Permission::Read).unwrap().name, "wall");

        let denied = authorize(&headers, &config, Permission::Write).unwrap_err();
        assert_eq!(denied.status, StatusCode::FORBIDDEN);
    }
}
