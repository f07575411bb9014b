//! Consumer side of the scheduler.
//!
//! # Components
//!
//! - [`JobExecutor`]: dequeues jobs in policy order and runs each to completion
//! - [`stats`]: per-job timings, running sums and the final report
//!
//! # Execution Flow
//!
//! 1. [`JobExecutor::run`] blocks on the queue for the next job
//! 2. A zero-length sentinel job stops the loop without being recorded
//! 3. Any other job runs for its requested duration
//! 4. Turnaround, service and waiting times are added to [`ExecutionStats`]
//!
//! The stats are returned from the executor thread when it exits, so they are
//! only read after a join.

pub mod executor;
pub mod stats;

pub use executor::{ExecutorState, JobExecutor};
pub use stats::{ExecutionStats, JobTiming, SchedulerReport};
