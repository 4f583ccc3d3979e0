use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, AuthError, Claims};
use crate::error::ApiError;

/// Header carrying the admin bearer token. The original clients send the
/// raw token in a custom header rather than an Authorization scheme.
pub const AUTH_HEADER: &str = "x-auth-token";

/// Admin context extracted from a verified token
#[derive(Clone, Debug)]
pub struct AdminUser {
    pub id: String,
    pub role: String,
}

impl From<Claims> for AdminUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
        }
    }
}

/// Gate for mutating routes: validates the x-auth-token header and injects
/// the admin context. Read routes never pass through here.
pub async fn admin_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers)?;
    let claims = auth::verify_token(&token)?;

    request.extensions_mut().insert(AdminUser::from(claims));

    Ok(next.run(request).await)
}

fn extract_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let header = headers.get(AUTH_HEADER).ok_or(AuthError::MissingToken)?;

    let token = header.to_str().map_err(|_| AuthError::InvalidToken)?.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token.to_string())
}
