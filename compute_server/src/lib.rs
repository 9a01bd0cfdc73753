// THEORY:
// `compute_server` is the request boundary for `compute_engine`. It owns the
// things the engines deliberately do not: concurrency (a worker pool sized to
// the machine), per-request timeouts, size limits, configuration and logging.
// The engines themselves run unchanged behind `compute_engine::execute`.
//
// Routes:
//   GET  /healthz                 liveness and worker count
//   POST /api/<operation>         one engine per route, JSON in and out
//   POST /api/batch               several operations, results reported per entry

pub mod config;
pub mod error;
pub mod handlers;
pub mod worker_pool;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ErrorBody};
pub use handlers::AppState;
pub use worker_pool::WorkerPool;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::net::SocketAddr;
use tokio::task::JoinHandle;

/// A server that is accepting connections.
pub struct RunningServer {
    /// The bound address (useful when binding port 0).
    pub local_addr: SocketAddr,
    pub handle: JoinHandle<()>,
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes;
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/factorial", post(handlers::factorial))
        .route("/api/fibonacci", post(handlers::fibonacci))
        .route("/api/is_prime", post(handlers::is_prime))
        .route("/api/primes", post(handlers::primes))
        .route("/api/matrix_multiply", post(handlers::matrix_multiply))
        .route("/api/word_frequency", post(handlers::word_frequency))
        .route("/api/sort", post(handlers::sort))
        .route("/api/grayscale", post(handlers::grayscale))
        .route("/api/batch", post(handlers::batch))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Binds, spawns the worker pool and serves until Ctrl+C.
pub async fn start_server(cfg: ServerConfig) -> anyhow::Result<RunningServer> {
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    let local_addr = listener.local_addr().context("reading bound address")?;

    println!(
        "Compute server listening on http://{} (workers={}, timeout={}s, body_limit={}B)",
        local_addr,
        cfg.workers,
        cfg.request_timeout.as_secs(),
        cfg.body_limit_bytes
    );
    println!("  limits: {:?}", cfg.limits);

    let app = router(AppState::new(cfg));
    let handle = tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            eprintln!("[compute] server error: {}", error);
        }
        println!("Compute server stopped");
    });

    Ok(RunningServer { local_addr, handle })
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        eprintln!("[compute] cannot listen for Ctrl+C ({}); running until killed", error);
        std::future::pending::<()>().await;
    }
}
