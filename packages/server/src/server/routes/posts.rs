use axum::{
    extract::{Extension, Query},
    Json,
};
use directory::{list_posts, ContentPost, PostQuery};

use crate::server::app::AppState;

/// `GET /posts?type=&category=&limit=`, newest first.
pub async fn list_posts_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<PostQuery>,
) -> Json<Vec<ContentPost>> {
    Json(list_posts(state.store.as_ref(), &query).await)
}
