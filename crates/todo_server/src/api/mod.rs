//! HTTP API for the task store.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/tasks` - List all tasks
//! - `POST /api/tasks` - Create a task
//! - `GET /api/tasks/:id` - Get one task
//! - `PUT /api/tasks/:id` - Rename a task
//! - `PUT /api/tasks/:id/complete` - Mark a task completed
//! - `PUT /api/tasks/:id/completed` - Set a task's completed flag
//! - `DELETE /api/tasks/:id` - Delete a task and its subtasks
//! - `POST /api/tasks/:id/subtasks` - Add a subtask
//! - `PUT /api/tasks/:id/subtasks/:sub_id` - Rename a subtask
//! - `PUT /api/tasks/:id/subtasks/:sub_id/complete` - Mark a subtask completed
//! - `PUT /api/tasks/:id/subtasks/:sub_id/completed` - Set a subtask's completed flag
//! - `DELETE /api/tasks/:id/subtasks/:sub_id` - Delete a subtask

mod error;
mod routes;
pub mod tasks;

pub use error::ApiError;
pub use routes::{AppState, router, serve, serve_with_listener};
