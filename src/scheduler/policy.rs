use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;

use crate::error::SchedulerError;
use crate::scheduler::job::Job;

/// Order in which resident jobs leave the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrderingPolicy {
    /// First come, first served: submission order
    #[default]
    Fcfs,
    /// Shortest job first: requested duration ascending
    Sjf,
    /// Priority value ascending
    Priority,
}

impl OrderingPolicy {
    /// Total order over jobs under this policy.
    ///
    /// The sentinel always sorts after every real job so that a shutdown
    /// request drains what is already resident, whatever the policy.
    /// Equal keys compare `Equal`; the queue's stable sort keeps their
    /// current relative position.
    pub fn compare(&self, a: &Job, b: &Job) -> Ordering {
        match (a.is_sentinel(), b.is_sentinel()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }

        match self {
            OrderingPolicy::Fcfs => a.sequence.cmp(&b.sequence),
            OrderingPolicy::Sjf => a.service_seconds.cmp(&b.service_seconds),
            OrderingPolicy::Priority => a.priority.cmp(&b.priority),
        }
    }
}

impl std::fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderingPolicy::Fcfs => write!(f, "FCFS"),
            OrderingPolicy::Sjf => write!(f, "SJF"),
            OrderingPolicy::Priority => write!(f, "priority"),
        }
    }
}

impl FromStr for OrderingPolicy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f" | "fcfs" => Ok(OrderingPolicy::Fcfs),
            "s" | "sjf" => Ok(OrderingPolicy::Sjf),
            "p" | "priority" => Ok(OrderingPolicy::Priority),
            other => Err(SchedulerError::InvalidCommand(format!(
                "unknown scheduling mode '{}'",
                other
            ))),
        }
    }
}
