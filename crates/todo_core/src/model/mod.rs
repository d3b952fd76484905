mod task;

pub use task::{Subtask, Task, next_subtask_id, next_task_id};
