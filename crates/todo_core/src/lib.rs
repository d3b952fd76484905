pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod task_api;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::Task;

    #[test]
    fn new_task_starts_incomplete_without_subtasks() {
        let task = Task::new(1, "Buy milk");

        assert_eq!(task.id, 1);
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert!(task.subtasks.is_empty());
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::invalid_input("missing title");
        assert_eq!(err.code(), "invalid_input");
        assert_eq!(err.to_string(), "invalid_input - missing title");
    }

    #[test]
    fn not_found_errors_carry_plain_messages() {
        assert_eq!(AppError::task_not_found().message(), "Task not found");
        assert_eq!(AppError::subtask_not_found().message(), "Subtask not found");
        assert!(AppError::subtask_not_found().is_not_found());
    }
}
