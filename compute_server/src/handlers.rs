// THEORY:
// One handler per engine, each doing the same three things:
//   1. decode its JSON payload into an `Operation` (a body that does not decode
//      is an `InvalidInput` error, never an axum default rejection page),
//   2. hand the operation to `dispatch`, which applies `Limits`, queues it on
//      the worker pool and bounds the wait with the request timeout,
//   3. render the `Outcome` as JSON, or the error as `{errorKind, message}`.
// Every request produces one log line with its operation, status and duration.
//
// `/api/batch` runs several operations concurrently and reports each one's
// result or error separately; a failing entry never fails the batch.

use crate::config::ServerConfig;
use crate::error::{ApiError, ErrorBody};
use crate::worker_pool::WorkerPool;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use compute_engine::engine::{GrayscaleMethod, NumberListInput};
use compute_engine::{LimitError, NumericInput, Operation, Outcome, Scalar};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<WorkerPool>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Spawns the worker pool described by `config`.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            pool: Arc::new(WorkerPool::new(config.workers)),
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PositionPayload {
    pub n: NumericInput,
}

#[derive(Debug, Deserialize)]
pub struct LimitPayload {
    pub limit: NumericInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixPayload {
    pub matrix_a: Vec<Vec<Scalar>>,
    pub matrix_b: Vec<Vec<Scalar>>,
}

#[derive(Debug, Deserialize)]
pub struct TextPayload {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SortPayload {
    pub numbers: NumberListInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrayscalePayload {
    pub pixel_buffer: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    #[serde(default)]
    pub method: GrayscaleMethod,
}

#[derive(Debug, Deserialize)]
pub struct BatchPayload {
    pub operations: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchEntry {
    Ok(Outcome),
    Error(ErrorBody),
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchEntry>,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub workers: usize,
}

/// Applies limits, runs `operation` on the pool and bounds the wait.
pub async fn dispatch(state: &AppState, operation: Operation) -> Result<Outcome, ApiError> {
    state.config.limits.admit(&operation)?;
    let timeout = state.config.request_timeout;
    match tokio::time::timeout(timeout, state.pool.submit(operation)).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout(timeout)),
    }
}

fn log_request(config: &ServerConfig, operation: &str, status: StatusCode, elapsed: Duration) {
    if config.quiet {
        return;
    }
    let millis = elapsed.as_secs_f64() * 1000.0;
    if status.is_success() {
        println!("[compute] {} {} {:.1}ms", operation, status.as_u16(), millis);
    } else {
        eprintln!("[compute] {} {} {:.1}ms", operation, status.as_u16(), millis);
    }
}

async fn respond<T>(
    state: AppState,
    name: &'static str,
    payload: Result<Json<T>, JsonRejection>,
    into_operation: impl FnOnce(T) -> Operation,
) -> Response {
    let started = Instant::now();
    let result = match payload {
        Ok(Json(body)) => dispatch(&state, into_operation(body)).await,
        Err(rejection) => Err(ApiError::from(rejection)),
    };
    let response = match result {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error.into_response(),
    };
    log_request(&state.config, name, response.status(), started.elapsed());
    response
}

pub async fn healthz(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        workers: state.pool.size(),
    })
}

pub async fn factorial(
    State(state): State<AppState>,
    payload: Result<Json<PositionPayload>, JsonRejection>,
) -> Response {
    respond(state, "factorial", payload, |body| Operation::Factorial { n: body.n }).await
}

pub async fn fibonacci(
    State(state): State<AppState>,
    payload: Result<Json<PositionPayload>, JsonRejection>,
) -> Response {
    respond(state, "fibonacci", payload, |body| Operation::Fibonacci { n: body.n }).await
}

pub async fn is_prime(
    State(state): State<AppState>,
    payload: Result<Json<PositionPayload>, JsonRejection>,
) -> Response {
    respond(state, "is_prime", payload, |body| Operation::IsPrime { n: body.n }).await
}

pub async fn primes(
    State(state): State<AppState>,
    payload: Result<Json<LimitPayload>, JsonRejection>,
) -> Response {
    respond(state, "primes_up_to", payload, |body| Operation::PrimesUpTo { limit: body.limit }).await
}

pub async fn matrix_multiply(
    State(state): State<AppState>,
    payload: Result<Json<MatrixPayload>, JsonRejection>,
) -> Response {
    respond(state, "matrix_multiply", payload, |body| Operation::MatrixMultiply {
        matrix_a: body.matrix_a,
        matrix_b: body.matrix_b,
    })
    .await
}

pub async fn word_frequency(
    State(state): State<AppState>,
    payload: Result<Json<TextPayload>, JsonRejection>,
) -> Response {
    respond(state, "word_frequency", payload, |body| Operation::WordFrequency { text: body.text }).await
}

pub async fn sort(
    State(state): State<AppState>,
    payload: Result<Json<SortPayload>, JsonRejection>,
) -> Response {
    respond(state, "sort", payload, |body| Operation::Sort { numbers: body.numbers }).await
}

pub async fn grayscale(
    State(state): State<AppState>,
    payload: Result<Json<GrayscalePayload>, JsonRejection>,
) -> Response {
    respond(state, "grayscale", payload, |body| Operation::Grayscale {
        pixel_buffer: body.pixel_buffer,
        width: body.width,
        height: body.height,
        channels: body.channels,
        method: body.method,
    })
    .await
}

pub async fn batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchPayload>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let response = match run_batch(&state, payload).await {
        Ok(results) => (StatusCode::OK, Json(BatchResponse { results })).into_response(),
        Err(error) => error.into_response(),
    };
    log_request(&state.config, "batch", response.status(), started.elapsed());
    response
}

async fn run_batch(
    state: &AppState,
    payload: Result<Json<BatchPayload>, JsonRejection>,
) -> Result<Vec<BatchEntry>, ApiError> {
    let Json(BatchPayload { operations }) = payload?;
    if operations.len() > state.config.max_batch_len {
        return Err(ApiError::LimitExceeded(LimitError::Exceeded {
            operation: "batch",
            detail: format!(
                "{} operations, maximum is {}",
                operations.len(),
                state.config.max_batch_len
            ),
        }));
    }

    let runs = operations.into_iter().map(|value| async move {
        let result = match serde_json::from_value::<Operation>(value) {
            Ok(operation) => dispatch(state, operation).await,
            Err(error) => Err(ApiError::BadRequest(error.to_string())),
        };
        match result {
            Ok(outcome) => BatchEntry::Ok(outcome),
            Err(error) => BatchEntry::Error(error.body()),
        }
    });
    Ok(join_all(runs).await)
}
