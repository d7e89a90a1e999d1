use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    delete_user_urls_handler, ping_handler, redirect_handler, shorten_batch_handler,
    shorten_json_handler, shorten_text_handler, user_urls_handler,
};
use crate::session::session_middleware;
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", post(shorten_text_handler))
            .route("/ping", get(ping_handler))
            .route("/{id}", get(redirect_handler))
            .nest(
                "/api",
                Router::new()
                    .route("/shorten", post(shorten_json_handler))
                    .route("/shorten/batch", post(shorten_batch_handler))
                    .route(
                        "/user/urls",
                        get(user_urls_handler).delete(delete_user_urls_handler),
                    ),
            )
            .layer(middleware::from_fn(session_middleware))
            .layer(RequestDecompressionLayer::new())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
