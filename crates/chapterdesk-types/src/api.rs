use serde::{Deserialize, Serialize};

/// Role string the service gives elevated rights to. Other roles are stored
/// and echoed back verbatim.
pub const ADMIN_ROLE: &str = "admin";

// -- Action envelope --

/// Body of `POST /`. Every field besides `action` is optional on the wire;
/// each action checks for the ones it needs.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub session_token: Option<String>,
}

impl ActionRequest {
    pub fn login(username: &str, password: &str) -> Self {
        Self {
            action: Some(Action::Login.as_str().to_string()),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            ..Default::default()
        }
    }

    pub fn logout(session_token: &str) -> Self {
        Self {
            action: Some(Action::Logout.as_str().to_string()),
            session_token: Some(session_token.to_string()),
            ..Default::default()
        }
    }

    pub fn validate_session(session_token: &str) -> Self {
        Self {
            action: Some(Action::ValidateSession.as_str().to_string()),
            session_token: Some(session_token.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Logout,
    ValidateSession,
}

impl Action {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "login" => Some(Self::Login),
            "logout" => Some(Self::Logout),
            "validateSession" => Some(Self::ValidateSession),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::ValidateSession => "validateSession",
        }
    }
}

/// Uniform response envelope for every action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            user: None,
            session_token: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            user: None,
            session_token: None,
        }
    }

    pub fn with_user(mut self, user: UserView) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.session_token = Some(token);
        self
    }
}

/// User as seen by clients, and as snapshotted into a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub chapter_id: Option<String>,
}

impl UserView {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    /// Admins can reach every chapter, everyone else only their own.
    pub fn can_edit_chapter(&self, chapter_id: &str) -> bool {
        self.is_admin() || self.chapter_id.as_deref() == Some(chapter_id)
    }
}

// -- Provisioning --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProvisionUserRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub chapter_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionUserResponse {
    pub user: UserView,
}
