pub mod habit;
pub mod store;
pub mod task;
