pub mod executor;
pub mod store;

pub use executor::TaskFunction;
pub use store::JobStore;
