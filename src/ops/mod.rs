pub mod task_ops;
pub mod validate;
pub mod view;
