use std::time::Duration;

use crate::error::{Result, SchedulerError};
use crate::scheduler::OrderingPolicy;

pub const DEFAULT_CAPACITY: usize = 10;

/// Longest accepted length of one requested second.
pub const MAX_TIME_UNIT: Duration = Duration::from_secs(60 * 60);

/// How the executor occupies itself for the length of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Workload {
    /// Spin on the clock until the job's time is up. Holds a full CPU for
    /// the whole duration.
    #[default]
    BusyWait,
    /// Park the thread for the job's duration. Same wall-clock occupancy,
    /// no CPU cost.
    Sleep,
}

/// Configuration for a scheduler instance.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum number of resident jobs
    pub capacity: usize,
    /// Ordering applied from startup until the first mode switch
    pub initial_policy: OrderingPolicy,
    pub workload: Workload,
    /// Wall-clock length of one requested second of service.
    /// Tests shrink this to keep runs short.
    pub time_unit: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            initial_policy: OrderingPolicy::Fcfs,
            workload: Workload::default(),
            time_unit: Duration::from_secs(1),
        }
    }
}

impl SchedulerConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_policy(mut self, policy: OrderingPolicy) -> Self {
        self.initial_policy = policy;
        self
    }

    pub fn with_workload(mut self, workload: Workload) -> Self {
        self.workload = workload;
        self
    }

    pub fn with_time_unit(mut self, time_unit: Duration) -> Self {
        self.time_unit = time_unit;
        self
    }

    /// Reject configurations that can never run. Called before any thread
    /// is started.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(SchedulerError::InvalidCapacity(self.capacity));
        }
        if self.time_unit > MAX_TIME_UNIT {
            return Err(SchedulerError::InvalidTimeUnit {
                got: self.time_unit,
                max: MAX_TIME_UNIT,
            });
        }
        Ok(())
    }
}
