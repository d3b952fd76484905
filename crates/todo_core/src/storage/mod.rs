pub mod json_store;
pub mod task_store;

pub use task_store::TaskStore;
