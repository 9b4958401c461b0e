// handlers/public/og.rs - GET /api/og/:short_id share card

use axum::{
    extract::Path,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::database::{questions, DatabaseManager};
use crate::services::og::{self, CardQuestion};

/// GET /api/og/:short_id - SVG card; falls back to the default card on any miss
pub async fn og_get(Path(short_id): Path<String>) -> Response {
    let question = match DatabaseManager::pool().await {
        Ok(pool) => questions::find_by_short_id(&pool, &short_id).await,
        Err(e) => Err(e),
    };

    let svg = match question {
        Ok(Some(q)) => og::render_question_card(&CardQuestion {
            content: &q.content,
            is_sensitive: q.is_sensitive,
            image_count: q.image_urls.len(),
        }),
        Ok(None) => og::render_default_card(),
        Err(e) => {
            warn!("OG card lookup for {} failed: {}", short_id, e);
            og::render_default_card()
        }
    };

    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=300"),
        ],
        svg,
    )
        .into_response()
}
