//! Client side of Chapterdesk: local draft state for one chapter page, the
//! prompts the editor asks before acting, and the HTTP backend it talks to.

pub mod backend;
pub mod confirm;
pub mod draft;
pub mod editor;
pub mod error;

pub use backend::{AuthSession, Backend, HttpBackend};
pub use confirm::{Confirm, Decision};
pub use draft::ChapterDraft;
pub use editor::{Editor, LogoutOutcome, SaveOutcome};
pub use error::EditorError;
