pub mod sqlite;

pub use sqlite::SqliteJobStore;
