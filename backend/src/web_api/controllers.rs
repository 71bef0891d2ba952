pub mod category_controller;
pub mod health_controller;
pub mod tag_controller;
pub mod task_controller;
