use crate::error::Error;
use crate::pool::PoolInner;
use crate::process::Pid;
use crate::status::{PoolStatus, ProcessStatus, WorkerStatus};
use std::sync::Arc;
use std::time::Instant;

/// Snapshot of one process as reported by the monitor.
#[derive(Debug, Clone)]
pub struct ProcessStats {
    pub name: String,
    pub status: ProcessStatus,
    /// name of the worker that executed the process, once it started
    pub worker: Option<String>,
    pub enqueued_at: Instant,
    pub started_at: Option<Instant>,
    pub ended_at: Option<Instant>,
}

/// Read-only projection of a pool. Monitors can be taken at any time,
/// cloned freely and outlive the pool handle they came from; they never
/// mutate anything.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<PoolInner>,
}

impl Monitor {
    pub(crate) fn new(inner: Arc<PoolInner>) -> Self {
        Monitor { inner }
    }

    pub fn pool_status(&self) -> PoolStatus {
        *self.inner.status.read().unwrap()
    }

    /// Stable worker names, in slot order.
    pub fn worker_list(&self) -> Vec<String> {
        self.inner
            .workers
            .iter()
            .map(|worker| worker.lock().unwrap().name.clone())
            .collect()
    }

    pub fn worker_status(&self, name: &str) -> Option<WorkerStatus> {
        self.inner.workers.iter().find_map(|worker| {
            let worker = worker.lock().unwrap();
            if worker.name == name {
                Some(worker.status)
            } else {
                None
            }
        })
    }

    /// Pid of the process a worker is currently executing, while it is
    /// Busy.
    pub fn worker_process(&self, name: &str) -> Option<Pid> {
        self.inner.workers.iter().find_map(|worker| {
            let worker = worker.lock().unwrap();
            if worker.name == name {
                worker.current_pid.clone()
            } else {
                None
            }
        })
    }

    pub fn process_stats(&self, pid: &str) -> Option<ProcessStats> {
        let record = self.inner.registry.get(pid)?;
        let record = record.lock().unwrap();
        Some(ProcessStats {
            name: record.process.name(),
            status: record.status,
            worker: record.worker.clone(),
            enqueued_at: record.enqueued_at,
            started_at: record.started_at,
            ended_at: record.ended_at,
        })
    }

    /// The error stored for a failed or killed process, if any.
    pub fn error(&self, pid: &str) -> Option<Error> {
        let record = self.inner.registry.get(pid)?;
        let record = record.lock().unwrap();
        record
            .error
            .as_ref()
            .map(|err| Error::from(err.kind().clone()))
    }
}
