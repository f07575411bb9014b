use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::error::{Result, SchedulerError};
use crate::scheduler::job::Job;
use crate::scheduler::policy::OrderingPolicy;

/// State guarded by the queue lock.
///
/// `slots` is a circular buffer. The `count` jobs starting at `head` are
/// resident, and after every mutation they are sorted by `policy`, so the
/// job at `head` is always the next one to run. `closed` is set when the
/// sentinel is admitted; nothing is admitted after it.
#[derive(Debug)]
struct QueueState {
    slots: Vec<Option<Job>>,
    head: usize,
    count: usize,
    policy: OrderingPolicy,
    closed: bool,
}

impl QueueState {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    fn slot(&self, offset: usize) -> usize {
        (self.head + offset) % self.capacity()
    }

    fn push_tail(&mut self, job: Job) {
        let tail = self.slot(self.count);
        debug_assert!(self.slots[tail].is_none(), "tail slot {tail} is occupied");
        self.slots[tail] = Some(job);
        self.count += 1;
    }

    fn pop_head(&mut self) -> Option<Job> {
        if self.count == 0 {
            return None;
        }
        let job = self.slots[self.head].take();
        debug_assert!(job.is_some(), "head slot {} is empty", self.head);
        self.head = self.slot(1);
        self.count -= 1;
        job
    }

    /// Copy resident jobs out in circular order, stable-sort them under the
    /// active policy, and write them back starting at `head`.
    fn reorder(&mut self) {
        let mut resident = Vec::with_capacity(self.count);
        for offset in 0..self.count {
            let idx = self.slot(offset);
            if let Some(job) = self.slots[idx].take() {
                resident.push(job);
            }
        }
        debug_assert_eq!(resident.len(), self.count, "resident slot was empty");

        let policy = self.policy;
        resident.sort_by(|a, b| policy.compare(a, b));

        for (offset, job) in resident.into_iter().enumerate() {
            let idx = self.slot(offset);
            self.slots[idx] = Some(job);
        }
    }

    fn resident(&self) -> Vec<Job> {
        (0..self.count)
            .filter_map(|offset| self.slots[self.slot(offset)].clone())
            .collect()
    }
}

/// Fixed-capacity job queue shared between the producer and the executor.
///
/// `enqueue` blocks while the queue is full and `dequeue` blocks while it is
/// empty. Neither wait can be cancelled; a caller stays parked until space
/// or a job shows up. Each admission wakes one waiting consumer and each
/// removal wakes one waiting producer, so the queue is sized for a single
/// producer thread and a single consumer thread.
#[derive(Debug)]
pub struct BoundedJobQueue {
    state: Mutex<QueueState>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl BoundedJobQueue {
    pub fn new(capacity: usize, policy: OrderingPolicy) -> Result<Self> {
        if capacity == 0 {
            return Err(SchedulerError::InvalidCapacity(capacity));
        }

        Ok(Self {
            state: Mutex::new(QueueState {
                slots: (0..capacity).map(|_| None).collect(),
                head: 0,
                count: 0,
                policy,
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    /// Admit a job, waiting for a free slot if the queue is full.
    ///
    /// The job's arrival time is stamped once it is physically stored, and
    /// the resident set is re-sorted before the consumer is woken. Admitting
    /// the sentinel closes the queue.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ShuttingDown`] if the queue is closed, either
    /// on entry or while waiting for space.
    pub fn enqueue(&self, mut job: Job) -> Result<()> {
        let mut state = self.state.lock();

        if state.is_full() && !state.closed {
            tracing::info!(
                sequence = job.sequence,
                capacity = state.capacity(),
                "Job queue is full, waiting for a free slot"
            );
        }
        loop {
            if state.closed {
                return Err(SchedulerError::ShuttingDown);
            }
            if !state.is_full() {
                break;
            }
            self.not_full.wait(&mut state);
        }

        let closing = job.is_sentinel();
        job.mark_arrived(Instant::now());
        tracing::debug!(
            sequence = job.sequence,
            service_seconds = job.service_seconds,
            priority = job.priority,
            "Job admitted to queue"
        );
        state.push_tail(job);
        state.reorder();

        if closing {
            state.closed = true;
            tracing::info!(
                resident = state.count - 1,
                "Queue closed, draining remaining jobs"
            );
            // Producers parked on a full queue must see the close.
            self.not_full.notify_all();
        }
        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove the next job under the active policy, waiting if the queue is
    /// empty.
    pub fn dequeue(&self) -> Job {
        let mut state = self.state.lock();
        loop {
            if let Some(job) = state.pop_head() {
                self.not_full.notify_one();
                return job;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Switch the ordering policy and re-sort the resident jobs.
    ///
    /// Jobs already removed are unaffected. Contends for the queue lock but
    /// never waits on capacity.
    pub fn set_policy(&self, policy: OrderingPolicy) {
        let mut state = self.state.lock();
        let previous = state.policy;
        state.policy = policy;
        state.reorder();
        tracing::info!(
            from = %previous,
            to = %policy,
            resident = state.count,
            "Scheduling policy changed"
        );
    }

    pub fn active_policy(&self) -> OrderingPolicy {
        self.state.lock().policy
    }

    /// Clones of the resident jobs in the order they will be dequeued.
    pub fn resident(&self) -> Vec<Job> {
        self.state.lock().resident()
    }

    /// Whether the sentinel has been admitted.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.state.lock().is_full()
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequences(queue: &BoundedJobQueue) -> Vec<u64> {
        queue.resident().iter().map(|j| j.sequence).collect()
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            BoundedJobQueue::new(0, OrderingPolicy::Fcfs),
            Err(SchedulerError::InvalidCapacity(0))
        ));
    }

    #[test]
    fn reorder_wraps_around_the_buffer() {
        let queue = BoundedJobQueue::new(3, OrderingPolicy::Sjf).unwrap();

        // Advance head so the resident set straddles the end of the buffer.
        queue.enqueue(Job::new(1, 1, 0)).unwrap();
        queue.enqueue(Job::new(2, 2, 0)).unwrap();
        assert_eq!(queue.dequeue().sequence, 1);
        assert_eq!(queue.dequeue().sequence, 2);

        queue.enqueue(Job::new(3, 9, 0)).unwrap();
        queue.enqueue(Job::new(4, 5, 0)).unwrap();
        queue.enqueue(Job::new(5, 1, 0)).unwrap();
        assert!(queue.is_full());
        assert_eq!(sequences(&queue), vec![5, 4, 3]);

        queue.set_policy(OrderingPolicy::Fcfs);
        assert_eq!(sequences(&queue), vec![3, 4, 5]);

        let drained: Vec<u64> = (0..3).map(|_| queue.dequeue().sequence).collect();
        assert_eq!(drained, vec![3, 4, 5]);
        assert!(queue.is_empty());
    }

    #[test]
    fn enqueue_stamps_arrival() {
        let queue = BoundedJobQueue::new(1, OrderingPolicy::Fcfs).unwrap();
        let before = Instant::now();
        queue.enqueue(Job::new(1, 1, 0)).unwrap();
        let job = queue.dequeue();
        let arrival = job.queue_arrival().expect("arrival must be stamped");
        assert!(arrival >= before);
    }

    #[test]
    fn sentinel_closes_queue() {
        let queue = BoundedJobQueue::new(4, OrderingPolicy::Fcfs).unwrap();
        queue.enqueue(Job::new(1, 1, 0)).unwrap();
        queue.enqueue(Job::sentinel()).unwrap();
        assert!(queue.is_closed());

        assert!(matches!(
            queue.enqueue(Job::new(2, 1, 0)),
            Err(SchedulerError::ShuttingDown)
        ));
        assert!(matches!(
            queue.enqueue(Job::sentinel()),
            Err(SchedulerError::ShuttingDown)
        ));
        assert_eq!(queue.len(), 2);
    }
}
