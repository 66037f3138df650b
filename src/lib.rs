//! JSON-file backed blogging API.
//!
//! Registers and authenticates users, stores blog posts and comments, and
//! updates user profiles with uploaded files. Each collection (users, blogs,
//! comments) persists as one pretty-printed JSON array under the data
//! directory; every mutation is a locked read-modify-write of the whole file.
//!
//! # Storage
//! - One file per collection, rewritten wholesale on each mutation
//! - A per-collection mutex serializes read/compute/write cycles, so
//!   overlapping requests cannot lose each other's updates
//! - Writes stage to a temp file and rename into place
//! - A missing file reads as an empty collection; an unreadable or malformed
//!   file is a storage error, never silently empty
//!
//! # Configuration
//! Everything comes from the environment, see [`config::Config`]:
//! `QUILL_PORT`, `QUILL_DATA_DIR`, `QUILL_UPLOADS_DIR`, and the optional
//! `QUILL_MAIL_URL`/`QUILL_MAIL_FROM` pair for the mail relay.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod upload;

use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(routes::register))
        .route("/login", post(routes::login))
        .route("/blogs", get(routes::list_blogs).post(routes::create_blog))
        .route("/blogs/:id", get(routes::get_blog))
        .route("/blogs/:id/comments", get(routes::blog_comments))
        .route("/writers/:id", get(routes::get_writer))
        .route("/comments", post(routes::create_comment))
        .route("/users/:id", put(routes::update_user))
        .route("/forgot", post(routes::forgot_password))
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
