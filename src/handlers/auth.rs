use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/login - exchange the admin credential pair for a bearer
/// token. Failures are uniform 401s with no hint at which field was wrong.
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let token = auth::login(&payload.username, &payload.password)?;

    tracing::info!("Admin login succeeded");
    Ok(Json(json!({ "token": token })))
}
