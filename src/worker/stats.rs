use serde::Serialize;

use crate::scheduler::OrderingPolicy;

/// Timing of one executed job, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JobTiming {
    pub sequence: u64,
    /// Queue arrival to completion
    pub turnaround: f64,
    /// Execution start to completion
    pub service: f64,
    /// Queue arrival to execution start
    pub waiting: f64,
}

/// Running sums kept by the executor thread.
///
/// Only the executor writes these, and they are read back through the
/// thread's join handle, so no lock is involved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionStats {
    pub completed: u64,
    pub total_turnaround: f64,
    pub total_service: f64,
    pub total_waiting: f64,
}

impl ExecutionStats {
    pub fn record(&mut self, timing: &JobTiming) {
        self.completed += 1;
        self.total_turnaround += timing.turnaround;
        self.total_service += timing.service;
        self.total_waiting += timing.waiting;
    }
}

/// Final summary produced when the scheduler shuts down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerReport {
    /// Jobs admitted to the queue, excluding the sentinel
    pub submitted: u64,
    pub completed: u64,
    pub final_policy: OrderingPolicy,
    pub total_turnaround: f64,
    pub total_service: f64,
    pub total_waiting: f64,
    pub average_turnaround: f64,
    pub average_service: f64,
    pub average_waiting: f64,
}

impl SchedulerReport {
    pub fn new(submitted: u64, final_policy: OrderingPolicy, stats: ExecutionStats) -> Self {
        let average = |total: f64| {
            if submitted > 0 {
                total / submitted as f64
            } else {
                0.0
            }
        };

        Self {
            submitted,
            completed: stats.completed,
            final_policy,
            total_turnaround: stats.total_turnaround,
            total_service: stats.total_service,
            total_waiting: stats.total_waiting,
            average_turnaround: average(stats.total_turnaround),
            average_service: average(stats.total_service),
            average_waiting: average(stats.total_waiting),
        }
    }
}

/// Up to four decimals, trailing zeros dropped.
fn format_seconds(value: f64) -> String {
    let formatted = format!("{:.4}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

impl std::fmt::Display for SchedulerReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total number of jobs submitted: {}", self.submitted)?;
        writeln!(
            f,
            "Average turnaround time: {} seconds",
            format_seconds(self.average_turnaround)
        )?;
        writeln!(
            f,
            "Average service time:    {} seconds",
            format_seconds(self.average_service)
        )?;
        write!(
            f,
            "Average waiting time:    {} seconds",
            format_seconds(self.average_waiting)
        )
    }
}
