//! Caller identity forwarded by the upstream identity gateway.
//!
//! The gateway has already verified the caller; this layer only maps the
//! forwarded subject onto an internal user record.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use vistoria_core::CatalogError;
use vistoria_model::{UserProfile, UserRecord};

use crate::infra::{app_state::AppState, errors::AppError};

pub const EMAIL_HEADER: &str = "x-identity-email";
pub const USERNAME_HEADER: &str = "x-identity-username";
pub const FIRST_NAME_HEADER: &str = "x-identity-first-name";
pub const LAST_NAME_HEADER: &str = "x-identity-last-name";
pub const PHOTO_HEADER: &str = "x-identity-photo";

/// Resolve the forwarded subject, if any, and attach the [`UserRecord`] to
/// the request. Requests without a subject continue anonymously; a subject
/// that cannot be resolved is recorded as an [`IdentityFailure`] and left for
/// the handler's extractor to report.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let subject_header = &state.config().identity.subject_header;
    if let Some(subject) = header_text(request.headers(), subject_header) {
        let profile = profile_from_headers(request.headers());
        match state.users.resolve_current_user(&subject, &profile).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(err) => {
                warn!(error = %err, "caller identity could not be resolved");
                request.extensions_mut().insert(IdentityFailure(err));
            }
        }
    }

    next.run(request).await
}

/// Request extension left behind when a forwarded subject failed to resolve.
#[derive(Debug, Clone)]
pub struct IdentityFailure(pub CatalogError);

pub fn profile_from_headers(headers: &HeaderMap) -> UserProfile {
    UserProfile {
        email: header_text(headers, EMAIL_HEADER).unwrap_or_default(),
        username: header_text(headers, USERNAME_HEADER),
        photo: header_text(headers, PHOTO_HEADER),
        first_name: header_text(headers, FIRST_NAME_HEADER),
        last_name: header_text(headers, LAST_NAME_HEADER),
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Whoever sent the request, as far as the gateway headers tell. Never
/// rejects.
#[derive(Debug, Clone)]
pub enum Caller {
    Anonymous,
    User(UserRecord),
    Unresolved(CatalogError),
}

impl Caller {
    fn from_parts(parts: &Parts) -> Self {
        if let Some(user) = parts.extensions.get::<UserRecord>() {
            return Caller::User(user.clone());
        }
        match parts.extensions.get::<IdentityFailure>() {
            Some(IdentityFailure(err)) => Caller::Unresolved(err.clone()),
            None => Caller::Anonymous,
        }
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(Caller::from_parts(parts))
    }
}

/// The authenticated caller. Rejects with 401 when the request carried no
/// identity, or with the mapped store error when it could not be resolved.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        match Caller::from_parts(parts) {
            Caller::User(user) => Ok(CurrentUser(user)),
            Caller::Unresolved(err) => Err(AppError::from(err)),
            Caller::Anonymous => Err(AppError::unauthorized("Authentication required")),
        }
    }
}
