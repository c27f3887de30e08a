use std::fmt::{self, Display};

/// Pool lifecycle state. Transitions are one-way:
/// Created -> Running -> Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    /// The pool exists but no worker has been started yet.
    Created,
    /// Workers are consuming the queue.
    Running,
    /// The pool drained its queue and stopped all workers.
    Closed,
}

impl Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            PoolStatus::Created => "Created",
            PoolStatus::Running => "Running",
            PoolStatus::Closed => "Closed",
        };
        write!(f, "{}", status)
    }
}

/// Process lifecycle state. Waiting and Running are transient,
/// the other states are terminal and sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// The process is queued and waiting for a worker.
    Waiting,
    /// A worker is executing the process body.
    Running,
    /// The body returned without error.
    Succeeded,
    /// The body returned an error.
    Failed,
    /// The process was cancelled by a kill.
    Killed,
}

impl ProcessStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessStatus::Succeeded | ProcessStatus::Failed | ProcessStatus::Killed
        )
    }
}

impl Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            ProcessStatus::Waiting => "Waiting",
            ProcessStatus::Running => "Running",
            ProcessStatus::Succeeded => "Succeeded",
            ProcessStatus::Failed => "Failed",
            ProcessStatus::Killed => "Killed",
        };
        write!(f, "{}", status)
    }
}

/// Worker state as reported by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Waiting for work on the queue.
    Idle,
    /// Executing a process body.
    Busy,
    /// Exited after the pool closed.
    Stopped,
}

impl Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            WorkerStatus::Idle => "Idle",
            WorkerStatus::Busy => "Busy",
            WorkerStatus::Stopped => "Stopped",
        };
        write!(f, "{}", status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_status_tokens() {
        assert_eq!("Created", PoolStatus::Created.to_string());
        assert_eq!("Running", PoolStatus::Running.to_string());
        assert_eq!("Closed", PoolStatus::Closed.to_string());
    }

    #[test]
    fn process_status_tokens() {
        assert_eq!("Waiting", ProcessStatus::Waiting.to_string());
        assert_eq!("Running", ProcessStatus::Running.to_string());
        assert_eq!("Succeeded", ProcessStatus::Succeeded.to_string());
        assert_eq!("Failed", ProcessStatus::Failed.to_string());
        assert_eq!("Killed", ProcessStatus::Killed.to_string());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!ProcessStatus::Waiting.is_terminal());
        assert!(!ProcessStatus::Running.is_terminal());
        assert!(ProcessStatus::Succeeded.is_terminal());
        assert!(ProcessStatus::Failed.is_terminal());
        assert!(ProcessStatus::Killed.is_terminal());
    }
}
