use crate::error::{Error, ErrorKind, Result};
use crate::process::{cancel_pair, CancelHandle, CancelToken, Pid, Process};
use crate::status::ProcessStatus;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Mutable state of one registered process. Records stay in the registry
/// after they finish so the monitor can report on them.
pub(crate) struct ProcessRecord {
    pub process: Arc<dyn Process>,
    pub status: ProcessStatus,
    /// name of the worker that picked the process up
    pub worker: Option<String>,
    pub enqueued_at: Instant,
    pub started_at: Option<Instant>,
    pub ended_at: Option<Instant>,
    pub error: Option<Error>,
    pub cancel: CancelHandle,
    pub token: CancelToken,
}

impl ProcessRecord {
    fn new(process: Arc<dyn Process>) -> Self {
        let (cancel, token) = cancel_pair();
        ProcessRecord {
            process,
            status: ProcessStatus::Waiting,
            worker: None,
            enqueued_at: Instant::now(),
            started_at: None,
            ended_at: None,
            error: None,
            cancel,
            token,
        }
    }
}

/// Index of all process records keyed by pid. The index lock is held only
/// for insert and lookup; each record carries its own lock so workers and
/// kills mutate records without blocking each other.
pub(crate) struct Registry {
    index: Mutex<HashMap<Pid, Arc<Mutex<ProcessRecord>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            index: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, pid: Pid, process: Arc<dyn Process>) -> Result<()> {
        let mut index = self.index.lock().unwrap();
        if index.contains_key(pid.as_str()) {
            return Err(Error::from(ErrorKind::DuplicatePid(pid)));
        }
        index.insert(pid, Arc::new(Mutex::new(ProcessRecord::new(process))));
        Ok(())
    }

    pub fn get(&self, pid: &str) -> Option<Arc<Mutex<ProcessRecord>>> {
        self.index.lock().unwrap().get(pid).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop(Pid);

    impl Process for Noop {
        fn name(&self) -> String {
            self.0.to_string()
        }

        fn pid(&self) -> Pid {
            self.0.clone()
        }

        fn start(&self, _token: &CancelToken) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn duplicate_pid_is_rejected() {
        let registry = Registry::new();
        let pid = Pid::from("p-1");
        registry
            .insert(pid.clone(), Arc::new(Noop(pid.clone())))
            .unwrap();
        let err = registry
            .insert(pid.clone(), Arc::new(Noop(pid)))
            .unwrap_err();
        assert_eq!("process p-1 is already registered", err.to_string());
    }

    #[test]
    fn records_start_waiting() {
        let registry = Registry::new();
        let pid = Pid::from("p-1");
        registry
            .insert(pid.clone(), Arc::new(Noop(pid)))
            .unwrap();
        let record = registry.get("p-1").unwrap();
        let record = record.lock().unwrap();
        assert_eq!(ProcessStatus::Waiting, record.status);
        assert!(record.started_at.is_none());
        assert!(record.error.is_none());
        assert!(registry.get("p-2").is_none());
    }
}
