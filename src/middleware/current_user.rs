use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// The authenticated user, resolved from the `X-User-Id` header set by the
/// auth layer in front of this service. Authentication itself is not this
/// service's concern; an unresolvable header is a validation failure.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Validation("Missing X-User-Id header".to_string()))?;

        let user_id = header
            .parse::<Uuid>()
            .map_err(|_| AppError::Validation("Invalid X-User-Id header".to_string()))?;

        Ok(CurrentUser(user_id))
    }
}
