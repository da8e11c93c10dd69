#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("not logged in")]
    NotAuthenticated,

    #[error("no chapter is open")]
    NoChapter,

    /// The server answered but said no.
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
}
