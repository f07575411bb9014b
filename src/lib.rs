pub mod command;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod worker;

pub use error::{Result, SchedulerError};
pub use scheduler::{OrderingPolicy, Scheduler};
