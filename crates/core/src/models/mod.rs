pub mod job;
pub mod state;
pub mod task;

pub use job::{JobDefinition, JobExecution, JobExecutionState, JobStatus};
pub use state::SystemState;
pub use task::{Task, TaskState, TaskStatus};
