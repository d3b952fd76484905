use crate::error::AppError;
use crate::model::{Subtask, Task};
use crate::task_api;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Single-writer access to one backing file.
///
/// Every operation holds the lock from load to save, so callers sharing a
/// `TaskStore` never lose each other's updates. Processes that open the same
/// file through another `TaskStore` (or the bare [`task_api`] functions) are
/// not covered.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.lock
            .lock()
            .map_err(|_| AppError::io("task store lock poisoned"))
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let _guard = self.guard()?;
        task_api::list_tasks(&self.path)
    }

    pub fn get_task(&self, id: u64) -> Result<Task, AppError> {
        let _guard = self.guard()?;
        task_api::get_task(&self.path, id)
    }

    pub fn create_task(&self, title: &str) -> Result<Task, AppError> {
        let _guard = self.guard()?;
        task_api::create_task(&self.path, title)
    }

    pub fn rename_task(&self, id: u64, title: &str) -> Result<Task, AppError> {
        let _guard = self.guard()?;
        task_api::rename_task(&self.path, id, title)
    }

    pub fn complete_task(&self, id: u64) -> Result<Task, AppError> {
        let _guard = self.guard()?;
        task_api::complete_task(&self.path, id)
    }

    pub fn set_task_completed(&self, id: u64, completed: bool) -> Result<Task, AppError> {
        let _guard = self.guard()?;
        task_api::set_task_completed(&self.path, id, completed)
    }

    pub fn delete_task(&self, id: u64) -> Result<(), AppError> {
        let _guard = self.guard()?;
        task_api::delete_task(&self.path, id)
    }

    pub fn add_subtask(&self, task_id: u64, title: &str) -> Result<Subtask, AppError> {
        let _guard = self.guard()?;
        task_api::add_subtask(&self.path, task_id, title)
    }

    pub fn rename_subtask(
        &self,
        task_id: u64,
        subtask_id: u64,
        title: &str,
    ) -> Result<Subtask, AppError> {
        let _guard = self.guard()?;
        task_api::rename_subtask(&self.path, task_id, subtask_id, title)
    }

    pub fn complete_subtask(&self, task_id: u64, subtask_id: u64) -> Result<Subtask, AppError> {
        let _guard = self.guard()?;
        task_api::complete_subtask(&self.path, task_id, subtask_id)
    }

    pub fn set_subtask_completed(
        &self,
        task_id: u64,
        subtask_id: u64,
        completed: bool,
    ) -> Result<Subtask, AppError> {
        let _guard = self.guard()?;
        task_api::set_subtask_completed(&self.path, task_id, subtask_id, completed)
    }

    pub fn delete_subtask(&self, task_id: u64, subtask_id: u64) -> Result<(), AppError> {
        let _guard = self.guard()?;
        task_api::delete_subtask(&self.path, task_id, subtask_id)
    }
}
