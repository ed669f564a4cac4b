pub mod dispatcher;
pub mod task;

pub use dispatcher::Dispatcher;
pub use task::{Task, TaskContext, TaskReport};
