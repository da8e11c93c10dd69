use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{self, AppState};
use crate::middleware::require_session;
use crate::{admin, chapters};

pub async fn health() -> &'static str {
    "ok"
}

/// All routes of the auth service. Layers (CORS, tracing) are added by the
/// binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(auth::liveness).post(auth::handle_action))
        .route("/health", get(health))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/admin/users", post(admin::provision_user))
        .route(
            "/chapters/{chapter_id}",
            get(chapters::get_chapter).put(chapters::put_chapter),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_session))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
