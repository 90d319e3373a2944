pub mod errors;
pub mod models;
pub mod traits;

pub use errors::{OrchestratorError, OrchestratorResult};
pub use models::{
    JobDefinition, JobExecution, JobExecutionState, JobStatus, SystemState, Task, TaskState,
    TaskStatus,
};
pub use traits::{JobStore, TaskFunction};
