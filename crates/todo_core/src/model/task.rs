use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
            subtasks: Vec::new(),
        }
    }

    pub fn subtask(&self, id: u64) -> Option<&Subtask> {
        self.subtasks.iter().find(|subtask| subtask.id == id)
    }

    pub fn subtask_mut(&mut self, id: u64) -> Option<&mut Subtask> {
        self.subtasks.iter_mut().find(|subtask| subtask.id == id)
    }
}

/// Id for the next task: one past the *last* stored task, not the largest.
///
/// Deleting the last task and then creating a new one reuses its id.
pub fn next_task_id(tasks: &[Task]) -> u64 {
    tasks.last().map_or(1, |task| task.id.saturating_add(1))
}

/// Same rule as [`next_task_id`], scoped to one task's subtasks.
pub fn next_subtask_id(task: &Task) -> u64 {
    task.subtasks
        .last()
        .map_or(1, |subtask| subtask.id.saturating_add(1))
}
