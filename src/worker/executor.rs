use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{SchedulerConfig, Workload};
use crate::scheduler::{BoundedJobQueue, Job};
use crate::worker::stats::{ExecutionStats, JobTiming};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    /// Waiting on the queue for the next job
    Running,
    Executing,
    Stopped,
}

impl std::fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorState::Running => write!(f, "running"),
            ExecutorState::Executing => write!(f, "executing"),
            ExecutorState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Consumer side of the scheduler.
///
/// Pulls jobs off the shared queue one at a time and runs each to
/// completion. A running job is never preempted; the loop only ends when it
/// dequeues the sentinel.
#[derive(Debug, Clone)]
pub struct JobExecutor {
    queue: Arc<BoundedJobQueue>,
    workload: Workload,
    time_unit: Duration,
}

impl JobExecutor {
    pub fn new(queue: Arc<BoundedJobQueue>, workload: Workload, time_unit: Duration) -> Self {
        Self {
            queue,
            workload,
            time_unit,
        }
    }

    pub fn from_config(queue: Arc<BoundedJobQueue>, config: &SchedulerConfig) -> Self {
        Self::new(queue, config.workload, config.time_unit)
    }

    /// Run until the sentinel is dequeued and return the accumulated stats.
    pub fn run(&self) -> ExecutionStats {
        let mut stats = ExecutionStats::default();
        let mut state = ExecutorState::Running;
        tracing::debug!(state = %state, "Executor started");

        loop {
            let job = self.queue.dequeue();
            if job.is_sentinel() {
                state = ExecutorState::Stopped;
                tracing::debug!(state = %state, "Shutdown job received");
                break;
            }

            state = ExecutorState::Executing;
            tracing::debug!(state = %state, sequence = job.sequence, "Dequeued job");
            let timing = self.execute(&job);
            stats.record(&timing);
            state = ExecutorState::Running;
            tracing::debug!(state = %state, "Waiting for next job");
        }

        tracing::info!(
            completed = stats.completed,
            "Executor stopped, queue drained"
        );
        stats
    }

    /// Run one job and measure it.
    pub fn execute(&self, job: &Job) -> JobTiming {
        let start = Instant::now();
        let arrival = job.queue_arrival().unwrap_or(start);

        self.perform(self.work_duration(job));
        let finish = Instant::now();

        let timing = JobTiming {
            sequence: job.sequence,
            turnaround: finish.duration_since(arrival).as_secs_f64(),
            service: finish.duration_since(start).as_secs_f64(),
            waiting: start.duration_since(arrival).as_secs_f64(),
        };

        tracing::info!(
            sequence = job.sequence,
            priority = job.priority,
            requested_seconds = job.service_seconds,
            submitted_at = %job.submitted_at,
            service = timing.service,
            waiting = timing.waiting,
            "Job completed"
        );

        timing
    }

    /// Wall-clock time a job occupies the executor. Saturates instead of
    /// overflowing when the unit was never validated.
    pub fn work_duration(&self, job: &Job) -> Duration {
        self.time_unit
            .checked_mul(job.service_seconds)
            .unwrap_or_else(|| {
                tracing::warn!(
                    sequence = job.sequence,
                    requested_seconds = job.service_seconds,
                    time_unit = ?self.time_unit,
                    "Job duration overflows, saturating"
                );
                Duration::MAX
            })
    }

    fn perform(&self, duration: Duration) {
        match self.workload {
            Workload::BusyWait => match Instant::now().checked_add(duration) {
                Some(deadline) => {
                    while Instant::now() < deadline {
                        std::hint::spin_loop();
                    }
                }
                // Deadline not representable; nothing would ever reach it.
                None => std::thread::sleep(duration),
            },
            Workload::Sleep => std::thread::sleep(duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::OrderingPolicy;

    fn executor(time_unit: Duration) -> JobExecutor {
        let queue = Arc::new(BoundedJobQueue::new(1, OrderingPolicy::Fcfs).unwrap());
        JobExecutor::new(queue, Workload::Sleep, time_unit)
    }

    #[test]
    fn work_duration_scales_by_time_unit() {
        let exec = executor(Duration::from_millis(250));
        assert_eq!(exec.work_duration(&Job::new(1, 3, 0)), Duration::from_millis(750));
    }

    #[test]
    fn work_duration_saturates_on_overflow() {
        let exec = executor(Duration::from_secs(u64::MAX / 2));
        assert_eq!(exec.work_duration(&Job::new(1, 3, 0)), Duration::MAX);
    }
}
