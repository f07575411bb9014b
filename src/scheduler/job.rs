use std::time::Instant;

use chrono::{DateTime, Utc};

/// Sequence number carried by the shutdown sentinel. Real jobs start at 1.
pub const SENTINEL_SEQUENCE: u64 = 0;

#[derive(Debug, Clone)]
pub struct Job {
    /// Requested run time in seconds. Zero only for the sentinel.
    pub service_seconds: u32,
    /// Submission order, starting at 1
    pub sequence: u64,
    /// Lower value runs first under the priority policy
    pub priority: i32,
    pub submitted_at: DateTime<Utc>,
    queue_arrival: Option<Instant>,
}

impl Job {
    pub fn new(sequence: u64, service_seconds: u32, priority: i32) -> Self {
        Self {
            service_seconds,
            sequence,
            priority,
            submitted_at: Utc::now(),
            queue_arrival: None,
        }
    }

    /// The zero-length job that tells the executor to stop.
    pub fn sentinel() -> Self {
        Self::new(SENTINEL_SEQUENCE, 0, 0)
    }

    pub fn is_sentinel(&self) -> bool {
        self.service_seconds == 0
    }

    /// When the job was admitted into queue storage, if it has been.
    pub fn queue_arrival(&self) -> Option<Instant> {
        self.queue_arrival
    }

    /// Stamp the admission time. Later calls keep the first stamp.
    pub(crate) fn mark_arrived(&mut self, at: Instant) {
        if self.queue_arrival.is_none() {
            self.queue_arrival = Some(at);
        }
    }
}
