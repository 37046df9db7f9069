use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{identity::IdentityError, models::User};

use super::{error::ServerError, state::SharedState};

/// The caller resolved from the `Authorization: Bearer` header.
///
/// Rejects with 401 before the handler body runs, so unauthenticated
/// requests never touch storage or the completion endpoint.
pub struct AuthUser(pub User);

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ServerError::Unauthorized)?;

        match state.identity.verify(token).await {
            Ok(user) => Ok(AuthUser(user)),
            Err(IdentityError::InvalidToken) => Err(ServerError::Unauthorized),
            Err(err) => {
                log::warn!("Token verification failed: {}", err);
                Err(ServerError::Unauthorized)
            }
        }
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
