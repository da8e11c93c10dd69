use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};
use uuid::Uuid;

use chapterdesk_db::AuthStore;
use chapterdesk_db::models::UserRow;
use chapterdesk_types::api::{ADMIN_ROLE, ProvisionUserRequest, ProvisionUserResponse, UserView};

use crate::auth::{AppState, user_view};
use crate::error::AuthError;
use crate::password::hash_password;

pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

/// `POST /admin/users`: create a user. Caller must hold an admin session.
pub async fn provision_user(
    State(state): State<AppState>,
    Extension(caller): Extension<UserView>,
    Json(req): Json<ProvisionUserRequest>,
) -> Result<impl IntoResponse, AuthError> {
    if !caller.is_admin() {
        return Err(AuthError::Forbidden);
    }

    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(AuthError::InvalidRequest);
    }
    if req.password.len() < 8 {
        return Err(AuthError::InvalidRequest);
    }

    let admin = caller.username;
    let user = tokio::task::spawn_blocking(move || create_user(state.store.as_ref(), req))
        .await??;

    info!("{} provisioned user {} ({})", admin, user.username, user.role);
    Ok((StatusCode::CREATED, Json(ProvisionUserResponse { user })))
}

/// Store a new user with an Argon2 hashed password.
///
/// The users table accepts duplicate usernames; this is where they are
/// turned away.
pub fn create_user(store: &dyn AuthStore, req: ProvisionUserRequest) -> Result<UserView, AuthError> {
    if !store.find_users_by_username(&req.username)?.is_empty() {
        return Err(AuthError::Conflict);
    }

    let row = UserRow {
        id: Some(Uuid::new_v4().to_string()),
        username: req.username,
        password: hash_password(&req.password)?,
        email: req.email,
        role: req.role,
        chapter_id: req.chapter_id,
    };
    store.create_user(&row)?;

    Ok(user_view(row))
}

/// Provision the first admin when the user table is empty. Returns whether a
/// user was created.
pub fn bootstrap_admin(store: &dyn AuthStore, password: &str, email: &str) -> anyhow::Result<bool> {
    if store.count_users()? > 0 {
        return Ok(false);
    }

    let req = ProvisionUserRequest {
        username: BOOTSTRAP_ADMIN_USERNAME.to_string(),
        password: password.to_string(),
        email: email.to_string(),
        role: ADMIN_ROLE.to_string(),
        chapter_id: None,
    };
    create_user(store, req).map_err(|e| anyhow::anyhow!("Bootstrap admin failed: {}", e))?;

    warn!("Bootstrapped '{}' user; change its password", BOOTSTRAP_ADMIN_USERNAME);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chapterdesk_db::MemoryStore;

    fn request(username: &str) -> ProvisionUserRequest {
        ProvisionUserRequest {
            username: username.to_string(),
            password: "correct horse".to_string(),
            email: format!("{username}@example.org"),
            role: "lead".to_string(),
            chapter_id: Some("ch-5".to_string()),
        }
    }

    #[test]
    fn created_user_has_hashed_password() {
        let store = MemoryStore::new();
        let user = create_user(&store, request("river")).unwrap();

        let row = &store.find_users_by_username("river").unwrap()[0];
        assert_eq!(row.id.as_deref(), Some(user.id.as_str()));
        assert!(row.password.starts_with("$argon2"));
        assert_eq!(user.chapter_id.as_deref(), Some("ch-5"));
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        create_user(&store, request("river")).unwrap();
        assert!(matches!(create_user(&store, request("river")), Err(AuthError::Conflict)));
    }

    #[test]
    fn bootstrap_runs_only_on_empty_table() {
        let store = MemoryStore::new();
        assert!(bootstrap_admin(&store, "admin123", "admin@localhost").unwrap());
        assert!(!bootstrap_admin(&store, "other-pass", "admin@localhost").unwrap());
        assert_eq!(store.count_users().unwrap(), 1);
    }
}
