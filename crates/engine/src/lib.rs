pub mod ongoing;
pub mod orchestrator;
pub mod recovery;
pub mod registry;
pub mod retry;
pub mod runner;
pub mod scheduler;

pub use ongoing::OngoingJobs;
pub use orchestrator::{EngineConfig, Orchestrator};
pub use recovery::RecoveryManager;
pub use registry::TaskRegistry;
pub use retry::RetryExecutor;
pub use runner::JobRunner;
pub use scheduler::QueueScheduler;
