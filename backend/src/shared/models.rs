pub mod app_state;
pub mod category;
pub mod settings;
pub mod tag;
pub mod task;
pub mod task_priority;
