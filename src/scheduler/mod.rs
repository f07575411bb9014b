//! Producer side of the scheduler and the queue it shares with the executor.
//!
//! - [`Job`]: unit of work with its admission timestamp
//! - [`OrderingPolicy`]: FCFS, SJF or priority ordering
//! - [`BoundedJobQueue`]: blocking circular buffer kept sorted by the active policy
//! - [`Scheduler`]: validated submission and mode-switch API

pub mod job;
pub mod policy;
pub mod producer;
pub mod queue;

pub use job::Job;
pub use policy::OrderingPolicy;
pub use producer::Scheduler;
pub use queue::BoundedJobQueue;
