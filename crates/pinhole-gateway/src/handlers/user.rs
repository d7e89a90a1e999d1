use crate::error::Result;
use crate::session::SessionToken;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use pinhole_core::{ShortId, ShortenerError};
use tracing::{error, Instrument};

/// Lists the live URLs of the session, or `204 No Content` when there are
/// none.
pub async fn user_urls_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
) -> Result<Response> {
    match state.shortener().get_user_archive(session.as_str()).await {
        Ok(urls) if urls.is_empty() => Ok(StatusCode::NO_CONTENT.into_response()),
        Ok(urls) => Ok(Json(urls).into_response()),
        Err(ShortenerError::NotFound(_)) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(err) => Err(err.into()),
    }
}

/// Accepts a JSON array of ids and deletes them in the background.
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    Json(ids): Json<Vec<ShortId>>,
) -> StatusCode {
    let shortener = state.shortener().clone();
    let span = tracing::info_span!("delete_user_urls", count = ids.len());

    tokio::spawn(
        async move {
            if let Err(err) = shortener.delete_keys(ids, session.as_str()).await {
                error!(error = %err, "failed to delete user urls");
            }
        }
        .instrument(span),
    );

    StatusCode::ACCEPTED
}
