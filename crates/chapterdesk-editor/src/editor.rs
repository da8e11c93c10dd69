use tracing::{info, warn};

use chapterdesk_types::api::UserView;

use crate::backend::{AuthSession, Backend};
use crate::confirm::{Confirm, Decision};
use crate::draft::ChapterDraft;
use crate::error::EditorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// Auth state is gone; the caller should leave the editor.
    LoggedOut,
    Cancelled,
}

/// The chapter editor: who is logged in, which chapter is open, and the
/// unsaved draft.
pub struct Editor<B> {
    backend: B,
    auth: Option<AuthSession>,
    chapter_id: Option<String>,
    draft: ChapterDraft,
}

impl<B: Backend> Editor<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            auth: None,
            chapter_id: None,
            draft: ChapterDraft::new(),
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<&UserView, EditorError> {
        let session = self.backend.login(username, password).await?;
        info!("Logged in as {}", session.user.username);
        self.chapter_id = session.user.chapter_id.clone();
        Ok(&self.auth.insert(session).user)
    }

    /// Resume with a stored token. Clears local auth if the server no longer
    /// accepts it.
    pub async fn resume(&mut self, token: &str) -> Result<&UserView, EditorError> {
        match self.backend.validate_session(token).await {
            Ok(user) => {
                self.chapter_id = user.chapter_id.clone();
                let session = AuthSession {
                    token: token.to_string(),
                    user,
                };
                Ok(&self.auth.insert(session).user)
            }
            Err(e) => {
                self.auth = None;
                Err(e)
            }
        }
    }

    pub fn user(&self) -> Option<&UserView> {
        self.auth.as_ref().map(|a| &a.user)
    }

    pub fn chapter_id(&self) -> Option<&str> {
        self.chapter_id.as_deref()
    }

    /// Load a chapter into the draft, replacing whatever was there. A chapter
    /// with no saved content opens as an empty draft.
    pub async fn open_chapter(&mut self, chapter_id: &str) -> Result<(), EditorError> {
        let token = &self.auth.as_ref().ok_or(EditorError::NotAuthenticated)?.token;
        let content = self.backend.load_chapter(token, chapter_id).await?;

        self.draft = content.map(ChapterDraft::from_content).unwrap_or_default();
        self.chapter_id = Some(chapter_id.to_string());
        Ok(())
    }

    pub fn draft(&self) -> &ChapterDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ChapterDraft {
        &mut self.draft
    }

    pub async fn save(&self, confirm: &impl Confirm) -> Result<SaveOutcome, EditorError> {
        let auth = self.auth.as_ref().ok_or(EditorError::NotAuthenticated)?;
        let chapter_id = self.chapter_id.as_deref().ok_or(EditorError::NoChapter)?;

        let prompt = format!("Save changes to \"{}\"?", self.draft.content().title);
        if confirm.confirm(&prompt) == Decision::Cancel {
            return Ok(SaveOutcome::Cancelled);
        }

        self.backend
            .save_chapter(&auth.token, chapter_id, self.draft.content())
            .await?;
        info!("Saved chapter {}", chapter_id);
        Ok(SaveOutcome::Saved)
    }

    /// Local auth state is cleared even when the server call fails.
    pub async fn logout(&mut self, confirm: &impl Confirm) -> Result<LogoutOutcome, EditorError> {
        if self.auth.is_none() {
            return Ok(LogoutOutcome::LoggedOut);
        }
        if confirm.confirm("Are you sure you want to log out?") == Decision::Cancel {
            return Ok(LogoutOutcome::Cancelled);
        }

        let Some(auth) = self.auth.take() else {
            return Ok(LogoutOutcome::LoggedOut);
        };
        self.chapter_id = None;
        self.draft = ChapterDraft::new();

        if let Err(e) = self.backend.logout(&auth.token).await {
            warn!("Server logout failed: {}", e);
            return Err(e);
        }
        Ok(LogoutOutcome::LoggedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chapterdesk_types::models::ChapterContent;

    #[derive(Default)]
    struct FakeBackend {
        saved: Mutex<Vec<(String, String, ChapterContent)>>,
        logged_out: Mutex<Vec<String>>,
        stored: Option<ChapterContent>,
        fail_logout: bool,
    }

    fn member() -> UserView {
        UserView {
            id: "u-1".into(),
            username: "quinn".into(),
            email: "quinn@example.org".into(),
            role: "lead".into(),
            chapter_id: Some("ch-4".into()),
        }
    }

    impl Backend for FakeBackend {
        async fn login(&self, username: &str, password: &str) -> Result<AuthSession, EditorError> {
            if username == "quinn" && password == "pw" {
                Ok(AuthSession {
                    token: "tok-1".into(),
                    user: member(),
                })
            } else {
                Err(EditorError::Rejected("Invalid username or password".into()))
            }
        }

        async fn logout(&self, token: &str) -> Result<(), EditorError> {
            self.logged_out.lock().unwrap().push(token.to_string());
            if self.fail_logout {
                Err(EditorError::Rejected("Server error".into()))
            } else {
                Ok(())
            }
        }

        async fn validate_session(&self, token: &str) -> Result<UserView, EditorError> {
            if token == "tok-1" {
                Ok(member())
            } else {
                Err(EditorError::Rejected("Invalid or expired session".into()))
            }
        }

        async fn load_chapter(
            &self,
            _token: &str,
            _chapter_id: &str,
        ) -> Result<Option<ChapterContent>, EditorError> {
            Ok(self.stored.clone())
        }

        async fn save_chapter(
            &self,
            token: &str,
            chapter_id: &str,
            content: &ChapterContent,
        ) -> Result<(), EditorError> {
            self.saved
                .lock()
                .unwrap()
                .push((token.to_string(), chapter_id.to_string(), content.clone()));
            Ok(())
        }
    }

    fn proceed(_: &str) -> Decision {
        Decision::Proceed
    }

    fn cancel(_: &str) -> Decision {
        Decision::Cancel
    }

    #[tokio::test]
    async fn save_requires_login() {
        let editor = Editor::new(FakeBackend::default());
        assert!(matches!(
            editor.save(&proceed).await,
            Err(EditorError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn confirmed_save_sends_draft_to_users_chapter() {
        let mut editor = Editor::new(FakeBackend::default());
        editor.login("quinn", "pw").await.unwrap();
        editor.draft_mut().set_title("Garden Club");
        editor.draft_mut().add_activity("Planting", "Spring beds");

        assert_eq!(editor.save(&proceed).await.unwrap(), SaveOutcome::Saved);

        let saved = editor.backend.saved.lock().unwrap();
        let (token, chapter, content) = &saved[0];
        assert_eq!(token, "tok-1");
        assert_eq!(chapter, "ch-4");
        assert_eq!(content.title, "Garden Club");
        assert_eq!(content.activities.len(), 1);
    }

    #[tokio::test]
    async fn cancelled_save_sends_nothing() {
        let mut editor = Editor::new(FakeBackend::default());
        editor.login("quinn", "pw").await.unwrap();

        assert_eq!(editor.save(&cancel).await.unwrap(), SaveOutcome::Cancelled);
        assert!(editor.backend.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_chapter_replaces_draft_with_stored_content() {
        let stored = ChapterContent {
            title: "Book Club".into(),
            member_count: 9,
            ..Default::default()
        };
        let mut editor = Editor::new(FakeBackend {
            stored: Some(stored.clone()),
            ..Default::default()
        });
        editor.login("quinn", "pw").await.unwrap();
        editor.draft_mut().set_title("scratch");

        editor.open_chapter("ch-4").await.unwrap();
        assert_eq!(editor.draft().content(), &stored);
    }

    #[tokio::test]
    async fn logout_prompt_can_be_declined() {
        let mut editor = Editor::new(FakeBackend::default());
        editor.login("quinn", "pw").await.unwrap();

        assert_eq!(editor.logout(&cancel).await.unwrap(), LogoutOutcome::Cancelled);
        assert!(editor.user().is_some());

        let asked = Mutex::new(String::new());
        let record = |prompt: &str| {
            *asked.lock().unwrap() = prompt.to_string();
            Decision::Proceed
        };
        assert_eq!(editor.logout(&record).await.unwrap(), LogoutOutcome::LoggedOut);
        assert!(editor.user().is_none());
        assert!(asked.lock().unwrap().contains("log out"));
        assert_eq!(*editor.backend.logged_out.lock().unwrap(), vec!["tok-1".to_string()]);
    }

    #[tokio::test]
    async fn failed_server_logout_still_clears_local_state() {
        let mut editor = Editor::new(FakeBackend {
            fail_logout: true,
            ..Default::default()
        });
        editor.login("quinn", "pw").await.unwrap();

        assert!(editor.logout(&proceed).await.is_err());
        assert!(editor.user().is_none());
        assert!(editor.chapter_id().is_none());
    }

    #[tokio::test]
    async fn resume_with_dead_token_stays_logged_out() {
        let mut editor = Editor::new(FakeBackend::default());
        assert!(editor.resume("expired").await.is_err());
        assert!(editor.user().is_none());

        let user = editor.resume("tok-1").await.unwrap();
        assert_eq!(user.username, "quinn");
        assert_eq!(editor.chapter_id(), Some("ch-4"));
    }
}
