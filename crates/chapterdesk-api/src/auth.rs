use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};
use uuid::Uuid;

use chapterdesk_db::AuthStore;
use chapterdesk_db::models::UserRow;
use chapterdesk_types::api::{Action, ActionRequest, ActionResponse, UserView};

use crate::error::AuthError;
use crate::password::verify_password;
use crate::session::SessionService;

/// Plaintext body of `GET /`.
pub const LIVENESS_MESSAGE: &str = "Chapterdesk auth service is running";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<dyn AuthStore>,
    pub sessions: SessionService,
}

impl AppStateInner {
    pub fn new(store: Arc<dyn AuthStore>, sessions: SessionService) -> Self {
        Self { store, sessions }
    }

    /// Route a parsed envelope to its action.
    pub fn dispatch(&self, req: ActionRequest) -> Result<ActionResponse, AuthError> {
        let action = req
            .action
            .as_deref()
            .and_then(Action::parse)
            .ok_or(AuthError::InvalidAction)?;

        match action {
            Action::Login => {
                let username = req.username.ok_or(AuthError::MissingField("username"))?;
                let password = req.password.ok_or(AuthError::MissingField("password"))?;
                self.login(&username, &password)
            }
            Action::Logout => {
                let token = req.session_token.ok_or(AuthError::MissingField("sessionToken"))?;
                self.logout(&token)
            }
            Action::ValidateSession => {
                let token = req.session_token.ok_or(AuthError::MissingField("sessionToken"))?;
                self.validate_session(&token)
            }
        }
    }

    /// First row with this exact username whose credential matches wins.
    pub fn login(&self, username: &str, password: &str) -> Result<ActionResponse, AuthError> {
        let candidates = self.store.find_users_by_username(username)?;
        if candidates.len() > 1 {
            warn!(
                "{} user rows share username '{}', first match wins",
                candidates.len(),
                username
            );
        }

        let row = candidates
            .into_iter()
            .find(|row| verify_password(&row.password, password))
            .ok_or(AuthError::InvalidCredentials)?;

        let user = user_view(row);
        let session = self.sessions.issue(&user)?;
        info!("Login: {} ({})", user.username, user.role);

        Ok(ActionResponse::ok("Login successful")
            .with_user(user)
            .with_token(session.token))
    }

    pub fn logout(&self, token: &str) -> Result<ActionResponse, AuthError> {
        self.sessions.revoke(token)?;
        Ok(ActionResponse::ok("Logout successful"))
    }

    pub fn validate_session(&self, token: &str) -> Result<ActionResponse, AuthError> {
        let session = self
            .sessions
            .validate(token)?
            .ok_or(AuthError::InvalidSession)?;

        Ok(ActionResponse::ok("Session valid").with_user(session.user))
    }
}

/// Build the client-facing view of a stored user. Rows without an id get a
/// fresh one, which is not written back.
pub fn user_view(row: UserRow) -> UserView {
    let id = row
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    UserView {
        id,
        username: row.username,
        email: row.email,
        role: row.role,
        chapter_id: row.chapter_id.filter(|c| !c.is_empty()),
    }
}

pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// `POST /`: every outcome is an envelope. Only backend faults change the
/// status code.
pub async fn handle_action(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let result = match serde_json::from_slice::<ActionRequest>(&body) {
        Ok(req) => tokio::task::spawn_blocking(move || state.dispatch(req))
            .await
            .map_err(AuthError::from)
            .and_then(|r| r),
        Err(_) => Err(AuthError::InvalidRequest),
    };

    match result {
        Ok(resp) => (StatusCode::OK, Json(resp)),
        Err(e) => {
            e.log();
            let status = if e.is_internal() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };
            (status, Json(e.envelope()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::hash_password;
    use crate::session::ManualClock;
    use chapterdesk_db::MemoryStore;
    use chrono::{Duration, Utc};

    fn seeded() -> (AppStateInner, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        store
            .create_user(&UserRow {
                id: Some("u-admin".into()),
                username: "admin".into(),
                password: hash_password("admin123").unwrap(),
                email: "admin@example.org".into(),
                role: "admin".into(),
                chapter_id: None,
            })
            .unwrap();
        store
            .create_user(&UserRow {
                id: None,
                username: "legacy".into(),
                password: "plain-pw".into(),
                email: "legacy@example.org".into(),
                role: "member".into(),
                chapter_id: Some("ch-3".into()),
            })
            .unwrap();

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let sessions = SessionService::new(store.clone(), clock.clone());
        (AppStateInner::new(store, sessions), clock)
    }

    #[test]
    fn admin_login_validate_then_expire() {
        let (state, clock) = seeded();

        let resp = state.login("admin", "admin123").unwrap();
        assert!(resp.success);
        let user = resp.user.unwrap();
        assert_eq!(user.role, "admin");
        assert_eq!(user.id, "u-admin");
        let token = resp.session_token.unwrap();
        assert!(!token.is_empty());

        let valid = state.validate_session(&token).unwrap();
        assert_eq!(valid.user.unwrap().id, "u-admin");

        clock.advance(Duration::hours(24) + Duration::seconds(1));
        assert!(matches!(
            state.validate_session(&token),
            Err(AuthError::InvalidSession)
        ));
    }

    #[test]
    fn bad_password_and_unknown_user_look_the_same() {
        let (state, _clock) = seeded();

        let wrong = state.login("admin", "wrong").unwrap_err().envelope();
        let unknown = state.login("nobody", "admin123").unwrap_err().envelope();
        assert_eq!(wrong, unknown);
        assert_eq!(wrong.message, "Invalid username or password");
    }

    #[test]
    fn legacy_row_without_id_gets_generated_id() {
        let (state, _clock) = seeded();

        let user = state.login("legacy", "plain-pw").unwrap().user.unwrap();
        assert!(Uuid::parse_str(&user.id).is_ok());
        assert_eq!(user.chapter_id.as_deref(), Some("ch-3"));
    }

    #[test]
    fn first_matching_duplicate_wins() {
        let (state, _clock) = seeded();
        state
            .store
            .create_user(&UserRow {
                id: Some("dup".into()),
                username: "admin".into(),
                password: "other".into(),
                email: String::new(),
                role: "member".into(),
                chapter_id: None,
            })
            .unwrap();

        assert_eq!(state.login("admin", "admin123").unwrap().user.unwrap().id, "u-admin");
        assert_eq!(state.login("admin", "other").unwrap().user.unwrap().id, "dup");
    }

    #[test]
    fn logout_always_succeeds() {
        let (state, _clock) = seeded();
        let token = state.login("admin", "admin123").unwrap().session_token.unwrap();

        assert!(state.logout(&token).unwrap().success);
        assert!(state.validate_session(&token).is_err());
        assert!(state.logout("no-such-token").unwrap().success);
    }

    #[test]
    fn dispatch_rejects_unknown_action_and_missing_fields() {
        let (state, _clock) = seeded();

        let unknown = ActionRequest {
            action: Some("register".into()),
            ..Default::default()
        };
        assert!(matches!(state.dispatch(unknown), Err(AuthError::InvalidAction)));
        assert!(matches!(
            state.dispatch(ActionRequest::default()),
            Err(AuthError::InvalidAction)
        ));

        let no_password = ActionRequest {
            action: Some("login".into()),
            username: Some("admin".into()),
            ..Default::default()
        };
        assert!(matches!(
            state.dispatch(no_password),
            Err(AuthError::MissingField("password"))
        ));
    }
}
