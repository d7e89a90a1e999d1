use crate::error::{AppError, Result};
use crate::model::{ShortenRequest, ShortenResponse};
use crate::session::SessionToken;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use pinhole_core::{BatchItem, BatchShortened, ShortId, Shortened};
use tracing::debug;

fn shortened_status(shortened: &Shortened) -> StatusCode {
    if shortened.already_existed() {
        StatusCode::CONFLICT
    } else {
        StatusCode::CREATED
    }
}

fn require_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(AppError::BadRequest("url must not be empty".to_string()));
    }
    Ok(())
}

/// `POST /` with the URL as a plain text body.
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    body: String,
) -> Result<Response> {
    require_url(&body)?;

    let shortened = state.shortener().shorten_url(&body, session.as_str()).await?;
    let status = shortened_status(&shortened);
    Ok((
        status,
        [(header::CONTENT_TYPE, "text/plain")],
        shortened.into_short_url(),
    )
        .into_response())
}

/// `POST /api/shorten` with `{"url": ...}`.
pub async fn shorten_json_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    Json(request): Json<ShortenRequest>,
) -> Result<Response> {
    require_url(&request.url)?;

    let shortened = state
        .shortener()
        .shorten_url(&request.url, session.as_str())
        .await?;
    let status = shortened_status(&shortened);
    let body = ShortenResponse {
        result: shortened.into_short_url(),
    };
    Ok((status, Json(body)).into_response())
}

pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
    Json(items): Json<Vec<BatchItem>>,
) -> Result<Response> {
    if items.iter().any(|item| item.original_url.is_empty()) {
        return Err(AppError::BadRequest("url must not be empty".to_string()));
    }

    let mut shortened: Vec<BatchShortened> = Vec::with_capacity(items.len());
    state
        .shortener()
        .for_each(items, session.as_str(), &mut |item| {
            shortened.push(item);
            Ok(())
        })
        .await?;

    debug!(reported = shortened.len(), "batch request served");
    Ok((StatusCode::CREATED, Json(shortened)).into_response())
}

/// `GET /{id}` answers with a temporary redirect to the original URL.
pub async fn redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(session): Extension<SessionToken>,
) -> Result<Response> {
    let original_url = state
        .shortener()
        .get_original_url(&ShortId::new(id), session.as_str())
        .await?;

    let location = HeaderValue::try_from(original_url)
        .map_err(|err| AppError::BadRequest(format!("stored url is not a valid location: {err}")))?;
    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}
