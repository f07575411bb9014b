use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Queue capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    #[error("Service time must be a positive number of seconds, got {0}")]
    InvalidServiceTime(i64),

    #[error("Time unit must be at most {max:?}, got {got:?}")]
    InvalidTimeUnit {
        got: std::time::Duration,
        max: std::time::Duration,
    },

    #[error("Scheduler is shutting down, no new jobs are accepted")]
    ShuttingDown,

    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),

    #[error("Failed to spawn executor thread: {0}")]
    Spawn(std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
