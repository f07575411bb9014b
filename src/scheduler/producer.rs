use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::scheduler::{BoundedJobQueue, Job, OrderingPolicy};
use crate::worker::stats::{ExecutionStats, SchedulerReport};
use crate::worker::JobExecutor;

/// Producer-facing entry point that owns the queue and the executor thread.
///
/// `submit`, `switch_mode`, `current_policy` and `request_shutdown` take
/// `&self` so a single command loop on another thread can drive the
/// scheduler by reference. Call [`Scheduler::shutdown`] after that loop
/// has finished to drain the queue and collect the report.
#[derive(Debug)]
pub struct Scheduler {
    queue: Arc<BoundedJobQueue>,
    next_sequence: AtomicU64,
    submitted: AtomicU64,
    executor: Option<JoinHandle<ExecutionStats>>,
}

impl Scheduler {
    /// Validate the configuration, build the queue and start the executor.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidCapacity`] before any thread is
    /// started if the capacity is zero.
    pub fn start(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;

        let queue = Arc::new(BoundedJobQueue::new(
            config.capacity,
            config.initial_policy,
        )?);
        let executor = JobExecutor::from_config(queue.clone(), &config);
        let handle = std::thread::Builder::new()
            .name("executor".to_string())
            .spawn(move || executor.run())
            .map_err(SchedulerError::Spawn)?;

        tracing::info!(
            capacity = config.capacity,
            policy = %config.initial_policy,
            workload = ?config.workload,
            "Scheduler started"
        );

        Ok(Self {
            queue,
            next_sequence: AtomicU64::new(1),
            submitted: AtomicU64::new(0),
            executor: Some(handle),
        })
    }

    /// Submit a job and return its sequence number.
    ///
    /// Blocks while the queue is full. Once shutdown has been requested the
    /// queue is closed and the job is rejected with
    /// [`SchedulerError::ShuttingDown`], also if the call was already waiting
    /// for space.
    pub fn submit(&self, service_seconds: i64, priority: i32) -> Result<u64> {
        if service_seconds <= 0 {
            return Err(SchedulerError::InvalidServiceTime(service_seconds));
        }
        let service = u32::try_from(service_seconds)
            .map_err(|_| SchedulerError::InvalidServiceTime(service_seconds))?;

        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.queue.enqueue(Job::new(sequence, service, priority))?;
        self.submitted.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            sequence,
            service_seconds = service,
            priority,
            "Job added"
        );
        Ok(sequence)
    }

    /// Change the ordering of resident and future jobs.
    pub fn switch_mode(&self, policy: OrderingPolicy) {
        self.queue.set_policy(policy);
    }

    pub fn current_policy(&self) -> OrderingPolicy {
        self.queue.active_policy()
    }

    /// Enqueue the sentinel so the executor stops once everything submitted
    /// before it has run. Later calls do nothing.
    ///
    /// Blocks while the queue is full.
    pub fn request_shutdown(&self) {
        if self.queue.enqueue(Job::sentinel()).is_ok() {
            tracing::info!("Shutdown requested");
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.queue.is_closed()
    }

    /// Jobs admitted so far, not counting the sentinel.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn queue(&self) -> &Arc<BoundedJobQueue> {
        &self.queue
    }

    /// Request shutdown if nobody has yet, wait for the executor to drain the
    /// queue, and build the final report.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ThreadPanicked`] if the executor thread
    /// panicked.
    pub fn shutdown(mut self) -> Result<SchedulerReport> {
        self.request_shutdown();

        let stats = match self.executor.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SchedulerError::ThreadPanicked("executor"))?,
            None => ExecutionStats::default(),
        };

        let report = SchedulerReport::new(self.submitted(), self.current_policy(), stats);
        tracing::info!(
            submitted = report.submitted,
            completed = report.completed,
            "Scheduler shut down"
        );
        Ok(report)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.executor.take() {
            self.request_shutdown();
            if handle.join().is_err() {
                tracing::error!("Executor thread panicked during drop");
            }
        }
    }
}
