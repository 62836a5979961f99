use std::future::Future;

use tokio::time::{timeout_at, Instant};
use tracing::{error, info, warn};

use crate::{
    auth::PasswordError,
    error::ApiError,
    state::AppState,
    users::{
        dto::UserPayload,
        repo::RepoError,
        repo_types::{NewUser, User},
        validation::{normalize, validate, Action},
    },
};

/// Runs `fut` unless the request deadline passes first.
async fn before<T, F>(deadline: Instant, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    timeout_at(deadline, fut).await.map_err(|_| ApiError::Timeout)?
}

/// Runs a CPU-bound password operation on the blocking pool.
async fn off_thread<T, F>(deadline: Instant, f: F) -> Result<Result<T, PasswordError>, ApiError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    before(deadline, async {
        tokio::task::spawn_blocking(f).await.map_err(|e| {
            error!(error = %e, "password task failed");
            ApiError::Hashing(e.to_string())
        })
    })
    .await
}

/// Registers a user: normalize, reject known emails, validate, hash, insert.
///
/// The existence check is advisory. A concurrent registration that slips past
/// it is rejected by the unique index and reported the same way.
pub async fn sign_up(state: &AppState, mut payload: UserPayload) -> Result<User, ApiError> {
    let deadline = Instant::now() + state.config.request_timeout();
    normalize(&mut payload);

    let existing = before(deadline, async {
        state
            .users
            .find_by_email(&payload.email)
            .await
            .map_err(ApiError::from)
    })
    .await?;
    if existing.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    validate(&payload, Action::Register)?;

    let hasher = state.hasher.clone();
    let password = std::mem::take(&mut payload.password);
    let password_hash = off_thread(deadline, move || hasher.hash(&password)).await??;

    let new_user = NewUser {
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        password_hash,
        profile_image: payload.profile_image,
    };
    let user = before(deadline, async {
        state.users.create(new_user).await.map_err(|e| match e {
            RepoError::DuplicateEmail => {
                warn!("unique index rejected duplicate email");
                ApiError::DuplicateEmail
            }
            RepoError::Storage(msg) => {
                error!(error = %msg, "create user failed");
                ApiError::Persistence(msg)
            }
        })
    })
    .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Checks credentials and returns a freshly issued bearer token.
pub async fn login(state: &AppState, mut payload: UserPayload) -> Result<String, ApiError> {
    let deadline = Instant::now() + state.config.request_timeout();
    normalize(&mut payload);
    validate(&payload, Action::Login)?;

    let user = before(deadline, async {
        state
            .users
            .find_by_email(&payload.email)
            .await
            .map_err(ApiError::from)
    })
    .await?
    .ok_or_else(|| {
        warn!(email = %payload.email, "login unknown email");
        ApiError::NotFound
    })?;

    let hasher = state.hasher.clone();
    let password = std::mem::take(&mut payload.password);
    let stored = user.password_hash.clone();
    off_thread(deadline, move || hasher.verify(&password, &stored))
        .await?
        .map_err(|e| {
            if matches!(e, PasswordError::Mismatch) {
                warn!(user_id = user.id, "login invalid password");
            }
            ApiError::from(e)
        })?;

    let token = state.tokens.issue(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::from(e)
    })?;

    info!(user_id = user.id, "user logged in");
    Ok(token)
}

pub async fn list_users(state: &AppState) -> Result<Vec<User>, ApiError> {
    let deadline = Instant::now() + state.config.request_timeout();
    before(deadline, async { state.users.list_all().await.map_err(ApiError::from) }).await
}
