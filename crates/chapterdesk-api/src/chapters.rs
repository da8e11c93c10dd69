use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::info;

use chapterdesk_types::api::UserView;
use chapterdesk_types::models::ChapterContent;

use crate::auth::AppState;
use crate::error::AuthError;

pub async fn get_chapter(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
    Extension(user): Extension<UserView>,
) -> Result<Json<ChapterContent>, AuthError> {
    if !user.can_edit_chapter(&chapter_id) {
        return Err(AuthError::Forbidden);
    }

    let raw = tokio::task::spawn_blocking(move || state.store.get_chapter(&chapter_id))
        .await??
        .ok_or(AuthError::NotFound)?;

    let content = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("Corrupt chapter content: {}", e))?;
    Ok(Json(content))
}

pub async fn put_chapter(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
    Extension(user): Extension<UserView>,
    Json(content): Json<ChapterContent>,
) -> Result<Json<ChapterContent>, AuthError> {
    if !user.can_edit_chapter(&chapter_id) {
        return Err(AuthError::Forbidden);
    }

    let raw = serde_json::to_string(&content).map_err(anyhow::Error::from)?;
    let id = chapter_id.clone();
    let now = state.sessions.now();
    tokio::task::spawn_blocking(move || state.store.put_chapter(&id, &raw, now)).await??;

    info!("{} saved chapter {}", user.username, chapter_id);
    Ok(Json(content))
}
