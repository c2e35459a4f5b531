// Application layer - Use case orchestration

pub mod batch_writer;
pub mod container;

// Re-export use cases
pub use batch_writer::{BatchReport, BatchWriter, JobReport, JobStatus};
pub use container::{AppContainer, DefaultAppContainer};
