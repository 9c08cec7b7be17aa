pub mod audit;
pub mod blob;
pub mod config;
pub mod db;
pub mod identity;
pub mod models;
pub mod pipeline;
pub mod versioning;
pub mod workflow;

pub use identity::{Caller, Role};
pub use pipeline::ImportError;
pub use versioning::{QuizLocks, SnapshotError};
pub use workflow::WorkflowError;
