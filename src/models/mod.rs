//! Domain models backed by the tasks table.

mod task;

pub use task::{NewTask, Task, TaskChangeset, TaskDefinition, TaskKind};
