use crate::auth::jwt::{Claims, encode_token};
use crate::auth::password;
use crate::db::StoreError;
use crate::error::AppError;
use crate::graphql::types::AuthPayload;
use crate::models::{NewUser, Role, User};
use crate::state::AppState;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue(state: &AppState, user: User) -> Result<AuthPayload, AppError> {
    let claims = Claims::new(user.id, user.role);
    let token = encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;
    Ok(AuthPayload {
        token,
        user: user.into(),
    })
}

pub async fn register(
    state: &AppState,
    name: String,
    email: &str,
    password: &str,
    role: Role,
) -> Result<AuthPayload, AppError> {
    let email = normalize_email(email);

    // Fast path only; the unique index on email decides under concurrency.
    if state.store.find_user_by_email(&email).await?.is_some() {
        tracing::debug!(%email, "Registration rejected: email taken");
        return Err(AppError::EmailAlreadyExists);
    }

    let password_hash = password::hash(password).map_err(AppError::Internal)?;

    let user = state
        .store
        .create_user(NewUser {
            name,
            email,
            password_hash,
            role,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => AppError::EmailAlreadyExists,
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User registered");
    issue(state, user)
}

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<AuthPayload, AppError> {
    let email = normalize_email(email);

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        tracing::debug!("Login rejected: unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let valid = password::verify(password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    issue(state, user)
}
