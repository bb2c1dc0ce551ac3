use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::jwt::validate_token;
use crate::state::AppState;
use crate::utils::error::AppError;

/// Caller identity taken from an `Authorization: Bearer <token>` header.
/// The token's subject must still be a registered member.
#[derive(Debug, Clone)]
pub struct AuthMember {
    pub member_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthMember {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::AuthError("Missing Authorization header".into()))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::AuthError("Invalid Authorization format. Expected: Bearer <token>".into())
        })?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| AppError::AuthError("Invalid or expired token".into()))?;

        // A valid signature is not enough once the account is deleted.
        if state.members.get_member(&claims.sub).await?.is_none() {
            return Err(AppError::AuthError("Member no longer exists".into()));
        }

        Ok(AuthMember {
            member_id: claims.sub,
        })
    }
}
