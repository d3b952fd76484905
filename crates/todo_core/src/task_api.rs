//! Task and subtask operations over the backing file.
//!
//! Every function loads the full collection, changes it in memory and writes
//! the full collection back. Nothing here synchronizes callers: two
//! overlapping calls on the same path race and the last save wins. Use
//! [`crate::storage::TaskStore`] to serialize access.

use crate::error::AppError;
use crate::model::{Subtask, Task, next_subtask_id, next_task_id};
use crate::storage::json_store;
use std::path::Path;

pub fn list_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    json_store::load_tasks(path)
}

pub fn get_task(path: &Path, id: u64) -> Result<Task, AppError> {
    json_store::load_tasks(path)?
        .into_iter()
        .find(|task| task.id == id)
        .ok_or_else(AppError::task_not_found)
}

pub fn create_task(path: &Path, title: &str) -> Result<Task, AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let task = Task::new(next_task_id(&tasks), title);

    tasks.push(task.clone());
    json_store::save_tasks(path, &tasks)?;

    tracing::info!(task_id = task.id, "created task");
    Ok(task)
}

pub fn rename_task(path: &Path, id: u64, title: &str) -> Result<Task, AppError> {
    update_task(path, id, |task| task.title = title.to_string())
}

/// Marks a task completed. Calling it on a completed task is not an error.
pub fn complete_task(path: &Path, id: u64) -> Result<Task, AppError> {
    update_task(path, id, |task| task.completed = true)
}

pub fn set_task_completed(path: &Path, id: u64, completed: bool) -> Result<Task, AppError> {
    update_task(path, id, |task| task.completed = completed)
}

/// Removes the task and its subtasks. Unknown ids are a no-op, but the
/// collection is still rewritten.
pub fn delete_task(path: &Path, id: u64) -> Result<(), AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let before = tasks.len();
    tasks.retain(|task| task.id != id);
    json_store::save_tasks(path, &tasks)?;

    if tasks.len() != before {
        tracing::info!(task_id = id, "deleted task");
    }
    Ok(())
}

pub fn add_subtask(path: &Path, task_id: u64, title: &str) -> Result<Subtask, AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let task = find_task_mut(&mut tasks, task_id)?;

    let subtask = Subtask {
        id: next_subtask_id(task),
        title: title.to_string(),
        completed: false,
    };
    task.subtasks.push(subtask.clone());
    json_store::save_tasks(path, &tasks)?;

    tracing::info!(task_id, subtask_id = subtask.id, "added subtask");
    Ok(subtask)
}

pub fn rename_subtask(
    path: &Path,
    task_id: u64,
    subtask_id: u64,
    title: &str,
) -> Result<Subtask, AppError> {
    update_subtask(path, task_id, subtask_id, |subtask| {
        subtask.title = title.to_string()
    })
}

pub fn complete_subtask(path: &Path, task_id: u64, subtask_id: u64) -> Result<Subtask, AppError> {
    update_subtask(path, task_id, subtask_id, |subtask| subtask.completed = true)
}

pub fn set_subtask_completed(
    path: &Path,
    task_id: u64,
    subtask_id: u64,
    completed: bool,
) -> Result<Subtask, AppError> {
    update_subtask(path, task_id, subtask_id, |subtask| {
        subtask.completed = completed
    })
}

/// Removes one subtask. The task must exist; an unknown subtask id is a no-op.
pub fn delete_subtask(path: &Path, task_id: u64, subtask_id: u64) -> Result<(), AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let task = find_task_mut(&mut tasks, task_id)?;
    task.subtasks.retain(|subtask| subtask.id != subtask_id);
    json_store::save_tasks(path, &tasks)?;

    tracing::info!(task_id, subtask_id, "deleted subtask");
    Ok(())
}

fn find_task_mut(tasks: &mut [Task], id: u64) -> Result<&mut Task, AppError> {
    tasks
        .iter_mut()
        .find(|task| task.id == id)
        .ok_or_else(AppError::task_not_found)
}

fn update_task<F>(path: &Path, id: u64, apply: F) -> Result<Task, AppError>
where
    F: FnOnce(&mut Task),
{
    let mut tasks = json_store::load_tasks(path)?;
    let task = find_task_mut(&mut tasks, id)?;
    apply(task);
    let updated = task.clone();
    json_store::save_tasks(path, &tasks)?;

    tracing::info!(task_id = id, "updated task");
    Ok(updated)
}

fn update_subtask<F>(
    path: &Path,
    task_id: u64,
    subtask_id: u64,
    apply: F,
) -> Result<Subtask, AppError>
where
    F: FnOnce(&mut Subtask),
{
    let mut tasks = json_store::load_tasks(path)?;
    let subtask = find_task_mut(&mut tasks, task_id)?
        .subtask_mut(subtask_id)
        .ok_or_else(AppError::subtask_not_found)?;
    apply(subtask);
    let updated = subtask.clone();
    json_store::save_tasks(path, &tasks)?;

    tracing::info!(task_id, subtask_id, "updated subtask");
    Ok(updated)
}
