//! Task and subtask endpoints under `/api/tasks`.
//!
//! Store calls are blocking file I/O and run on the blocking pool; the
//! [`TaskStore`] lock serializes them.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;
use todo_core::error::AppError;
use todo_core::model::{Subtask, Task};
use todo_core::storage::TaskStore;

use super::error::ApiError;
use super::routes::AppState;

type SharedState = State<Arc<AppState>>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", get(get_task).put(rename_task).delete(delete_task))
        .route("/:id/complete", put(complete_task))
        .route("/:id/completed", put(set_task_completed))
        .route("/:id/subtasks", post(add_subtask))
        .route(
            "/:id/subtasks/:sub_id",
            put(rename_subtask).delete(delete_subtask),
        )
        .route("/:id/subtasks/:sub_id/complete", put(complete_subtask))
        .route("/:id/subtasks/:sub_id/completed", put(set_subtask_completed))
}

// ─────────────────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    /// Not validated; a missing or `null` title is stored as an empty string.
    #[serde(default)]
    pub title: Option<String>,
}

impl TitleRequest {
    pub fn into_title(self) -> String {
        self.title.unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletedRequest {
    pub completed: bool,
}

/// Path ids are compared numerically, so `1`, `1.0`, `1e0` and ` 1 ` all
/// name record 1. Prefixed integer literals (`0x1`, `0o1`, `0b1`) are
/// accepted as well. Anything whose numeric value is not a non-negative
/// integer matches no record.
fn parse_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Some((radix, digits)) = radix_literal(raw) {
        if digits.is_empty() || !digits.chars().all(|ch| ch.is_digit(radix)) {
            return None;
        }
        return u64::from_str_radix(digits, radix).ok();
    }

    let decimal = |ch: char| ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '+' | '-');
    if raw.is_empty() || !raw.chars().all(decimal) {
        return None;
    }
    let value: f64 = raw.parse().ok()?;
    if value.fract() != 0.0 || value < 0.0 || value > u64::MAX as f64 {
        return None;
    }
    Some(value as u64)
}

fn radix_literal(raw: &str) -> Option<(u32, &str)> {
    let prefix = raw.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((radix, &raw[2..]))
}

async fn with_store<T, F>(state: Arc<AppState>, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&TaskStore) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&state.store))
        .await
        .map_err(|err| AppError::io(format!("store task failed: {err}")))?
        .map_err(ApiError::from)
}

/// Lookup chain for a subtask id that cannot match: the task still has to
/// exist so the caller gets the right 404 message.
async fn unmatched_subtask<T: Send + 'static>(
    state: Arc<AppState>,
    task_id: u64,
) -> Result<T, ApiError> {
    with_store(state, move |store| {
        store.get_task(task_id)?;
        Err(AppError::subtask_not_found())
    })
    .await
}

// ─────────────────────────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────────────────────────

async fn list_tasks(State(state): SharedState) -> Result<Json<Vec<Task>>, ApiError> {
    with_store(state, |store| store.list_tasks()).await.map(Json)
}

async fn create_task(
    State(state): SharedState,
    Json(req): Json<TitleRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = with_store(state, move |store| store.create_task(&req.into_title())).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): SharedState,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id).ok_or_else(AppError::task_not_found)?;
    with_store(state, move |store| store.get_task(id))
        .await
        .map(Json)
}

async fn rename_task(
    State(state): SharedState,
    Path(id): Path<String>,
    Json(req): Json<TitleRequest>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id).ok_or_else(AppError::task_not_found)?;
    with_store(state, move |store| store.rename_task(id, &req.into_title()))
        .await
        .map(Json)
}

async fn complete_task(
    State(state): SharedState,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id).ok_or_else(AppError::task_not_found)?;
    with_store(state, move |store| store.complete_task(id))
        .await
        .map(Json)
}

async fn set_task_completed(
    State(state): SharedState,
    Path(id): Path<String>,
    Json(req): Json<CompletedRequest>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id).ok_or_else(AppError::task_not_found)?;
    with_store(state, move |store| {
        store.set_task_completed(id, req.completed)
    })
    .await
    .map(Json)
}

async fn delete_task(
    State(state): SharedState,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Some(id) = parse_id(&id) {
        with_store(state, move |store| store.delete_task(id)).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Subtasks
// ─────────────────────────────────────────────────────────────────────────────

async fn add_subtask(
    State(state): SharedState,
    Path(id): Path<String>,
    Json(req): Json<TitleRequest>,
) -> Result<(StatusCode, Json<Subtask>), ApiError> {
    let id = parse_id(&id).ok_or_else(AppError::task_not_found)?;
    let subtask = with_store(state, move |store| store.add_subtask(id, &req.into_title())).await?;
    Ok((StatusCode::CREATED, Json(subtask)))
}

async fn rename_subtask(
    State(state): SharedState,
    Path((id, sub_id)): Path<(String, String)>,
    Json(req): Json<TitleRequest>,
) -> Result<Json<Subtask>, ApiError> {
    let id = parse_id(&id).ok_or_else(AppError::task_not_found)?;
    let Some(sub_id) = parse_id(&sub_id) else {
        return unmatched_subtask(state, id).await;
    };
    with_store(state, move |store| {
        store.rename_subtask(id, sub_id, &req.into_title())
    })
    .await
    .map(Json)
}

async fn complete_subtask(
    State(state): SharedState,
    Path((id, sub_id)): Path<(String, String)>,
) -> Result<Json<Subtask>, ApiError> {
    let id = parse_id(&id).ok_or_else(AppError::task_not_found)?;
    let Some(sub_id) = parse_id(&sub_id) else {
        return unmatched_subtask(state, id).await;
    };
    with_store(state, move |store| store.complete_subtask(id, sub_id))
        .await
        .map(Json)
}

async fn set_subtask_completed(
    State(state): SharedState,
    Path((id, sub_id)): Path<(String, String)>,
    Json(req): Json<CompletedRequest>,
) -> Result<Json<Subtask>, ApiError> {
    let id = parse_id(&id).ok_or_else(AppError::task_not_found)?;
    let Some(sub_id) = parse_id(&sub_id) else {
        return unmatched_subtask(state, id).await;
    };
    with_store(state, move |store| {
        store.set_subtask_completed(id, sub_id, req.completed)
    })
    .await
    .map(Json)
}

async fn delete_subtask(
    State(state): SharedState,
    Path((id, sub_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id).ok_or_else(AppError::task_not_found)?;
    match parse_id(&sub_id) {
        Some(sub_id) => {
            with_store(state, move |store| store.delete_subtask(id, sub_id)).await?;
        }
        None => {
            with_store(state, move |store| store.get_task(id).map(|_| ())).await?;
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
