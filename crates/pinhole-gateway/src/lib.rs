//! HTTP surface of the shortener.
//!
//! [`App::router`] wires the handlers, the session cookie middleware, request
//! decompression and request tracing around an [`AppState`].

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod session;
pub mod state;

pub use app::App;
pub use session::{SessionToken, SESSION_COOKIE};
pub use state::AppState;
