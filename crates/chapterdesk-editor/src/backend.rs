use std::future::Future;

use reqwest::{Client, StatusCode};
use tracing::debug;

use chapterdesk_types::api::{ActionRequest, ActionResponse, UserView};
use chapterdesk_types::models::ChapterContent;

use crate::error::EditorError;

/// An authenticated session as the editor holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: UserView,
}

/// What the editor needs from the server.
pub trait Backend {
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthSession, EditorError>> + Send;

    fn logout(&self, token: &str) -> impl Future<Output = Result<(), EditorError>> + Send;

    fn validate_session(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<UserView, EditorError>> + Send;

    /// `Ok(None)` when nothing has been saved for this chapter yet.
    fn load_chapter(
        &self,
        token: &str,
        chapter_id: &str,
    ) -> impl Future<Output = Result<Option<ChapterContent>, EditorError>> + Send;

    fn save_chapter(
        &self,
        token: &str,
        chapter_id: &str,
        content: &ChapterContent,
    ) -> impl Future<Output = Result<(), EditorError>> + Send;
}

/// Talks to a Chapterdesk server over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn action(&self, req: &ActionRequest) -> Result<ActionResponse, EditorError> {
        debug!("POST {} action={:?}", self.base_url, req.action);
        let resp: ActionResponse = self
            .client
            .post(format!("{}/", self.base_url))
            .json(req)
            .send()
            .await?
            .json()
            .await?;

        if resp.success {
            Ok(resp)
        } else {
            Err(EditorError::Rejected(resp.message))
        }
    }

    fn chapter_url(&self, chapter_id: &str) -> String {
        format!("{}/chapters/{}", self.base_url, chapter_id)
    }
}

impl Backend for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> Result<AuthSession, EditorError> {
        let resp = self.action(&ActionRequest::login(username, password)).await?;
        match (resp.session_token, resp.user) {
            (Some(token), Some(user)) => Ok(AuthSession { token, user }),
            _ => Err(EditorError::Rejected("login response missing session".into())),
        }
    }

    async fn logout(&self, token: &str) -> Result<(), EditorError> {
        self.action(&ActionRequest::logout(token)).await?;
        Ok(())
    }

    async fn validate_session(&self, token: &str) -> Result<UserView, EditorError> {
        let resp = self.action(&ActionRequest::validate_session(token)).await?;
        resp.user
            .ok_or_else(|| EditorError::Rejected("session response missing user".into()))
    }

    async fn load_chapter(
        &self,
        token: &str,
        chapter_id: &str,
    ) -> Result<Option<ChapterContent>, EditorError> {
        let resp = self
            .client
            .get(self.chapter_url(chapter_id))
            .bearer_auth(token)
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(rejected_unless_ok(resp).await?.json().await?))
    }

    async fn save_chapter(
        &self,
        token: &str,
        chapter_id: &str,
        content: &ChapterContent,
    ) -> Result<(), EditorError> {
        let resp = self
            .client
            .put(self.chapter_url(chapter_id))
            .bearer_auth(token)
            .json(content)
            .send()
            .await?;

        rejected_unless_ok(resp).await?;
        Ok(())
    }
}

/// Turn a non-2xx answer into `Rejected`, using the envelope message when the
/// server sent one.
async fn rejected_unless_ok(resp: reqwest::Response) -> Result<reqwest::Response, EditorError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = match resp.json::<ActionResponse>().await {
        Ok(envelope) => envelope.message,
        Err(_) => format!("HTTP {}", status),
    };
    Err(EditorError::Rejected(message))
}
