use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use uuid::Uuid;

use crate::auth::jwt;
use crate::db::UserStore;
use crate::error::AppError;
use crate::models::{Role, User};

/// The caller behind a request, as far as authorization cares.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

/// Resolves the caller from the `Authorization` header. Any problem with the
/// token or the user lookup leaves the caller anonymous instead of failing
/// the request; resolvers decide whether anonymity is acceptable.
pub async fn resolve_identity<S>(headers: &HeaderMap, secret: &str, users: &S) -> Option<Identity>
where
    S: UserStore + ?Sized,
{
    let token = bearer_token(headers)?;

    let claims = match jwt::decode_token(token, secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Ignoring bearer token: {e}");
            return None;
        }
    };

    match users.find_user_by_id(claims.sub).await {
        Ok(Some(user)) => Some(user.into()),
        Ok(None) => {
            tracing::debug!(user_id = %claims.sub, "Token subject no longer exists");
            None
        }
        Err(e) => {
            tracing::warn!("User lookup failed while resolving identity: {e}");
            None
        }
    }
}

pub fn require_auth(identity: Option<&Identity>) -> Result<&Identity, AppError> {
    identity.ok_or(AppError::Unauthenticated)
}

pub fn require_role<'a>(
    identity: Option<&'a Identity>,
    roles: &[Role],
) -> Result<&'a Identity, AppError> {
    let identity = require_auth(identity)?;
    if roles.contains(&identity.role) {
        Ok(identity)
    } else {
        Err(AppError::Forbidden)
    }
}
