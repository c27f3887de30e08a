use crate::error::{Error, ErrorKind, Result};
use crate::monitor::Monitor;
use crate::process::{Pid, Process};
use crate::registry::Registry;
use crate::status::{PoolStatus, ProcessStatus};
use crate::worker::{self, WorkerCtx, WorkerRecord};
use crossbeam::channel::{unbounded, Receiver, Sender};
use slog::{debug, info, o, Discard, Logger};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Instant;

pub(crate) enum Message {
    Work(Pid),
    Terminate,
}

pub(crate) struct PoolInner {
    pub size: usize,
    pub logger: Logger,
    pub status: RwLock<PoolStatus>,
    // set while a close is draining, so no work can be queued
    // behind the terminate messages
    pub closing: AtomicBool,
    pub sender: Sender<Message>,
    pub receiver: Receiver<Message>,
    pub registry: Registry,
    pub workers: Vec<Mutex<WorkerRecord>>,
    pub handles: Mutex<Vec<JoinHandle<()>>>,
}

/// A fixed-size worker pool that executes registered processes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wpool::{CancelToken, Pid, Process, ProcessStatus, Result, WorkerPool};
///
/// struct Noop(Pid);
///
/// impl Process for Noop {
///     fn name(&self) -> String {
///         format!("noop-{}", self.0)
///     }
///
///     fn pid(&self) -> Pid {
///         self.0.clone()
///     }
///
///     fn start(&self, _token: &CancelToken) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// let pool = WorkerPool::new(2).unwrap();
/// pool.register(vec![Arc::new(Noop(Pid::from("p-1"))) as Arc<dyn Process>])
///     .unwrap();
/// pool.start().unwrap();
/// pool.close().unwrap();
/// let monitor = pool.monitor();
/// assert_eq!(ProcessStatus::Succeeded, monitor.process_stats("p-1").unwrap().status);
/// ```
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.inner.size)
            .finish()
    }
}

impl WorkerPool {
    /// Creates a pool with `size` workers. The workers are allocated but
    /// not started. Fails if `size` is zero.
    pub fn new(size: usize) -> Result<WorkerPool> {
        WorkerPool::with_logger(size, Logger::root(Discard, o!()))
    }

    /// Same as `new`, with a caller-supplied logger.
    pub fn with_logger(size: usize, logger: Logger) -> Result<WorkerPool> {
        if size < 1 {
            return Err(Error::from(ErrorKind::InvalidPoolSize(size)));
        }

        let (sender, receiver) = unbounded();
        let workers = (1..=size)
            .map(|n| Mutex::new(WorkerRecord::new(format!("w-{}", n))))
            .collect();

        Ok(WorkerPool {
            inner: Arc::new(PoolInner {
                size,
                logger,
                status: RwLock::new(PoolStatus::Created),
                closing: AtomicBool::new(false),
                sender,
                receiver,
                registry: Registry::new(),
                workers,
                handles: Mutex::new(Vec::with_capacity(size)),
            }),
        })
    }

    /// Appends processes to the queue. Legal before and after `start`;
    /// processes registered on a created pool are picked up as soon as the
    /// pool starts. Rejects duplicate pids and closed pools.
    pub fn register(&self, processes: Vec<Arc<dyn Process>>) -> Result<()> {
        // the read lock gates against a concurrent close draining the queue
        let status = self.inner.status.read().unwrap();
        if *status == PoolStatus::Closed || self.inner.closing.load(Ordering::SeqCst) {
            return Err(Error::from(ErrorKind::RegistrationClosed(PoolStatus::Closed)));
        }

        for process in processes {
            let pid = process.pid();
            self.inner.registry.insert(pid.clone(), process)?;
            self.inner
                .sender
                .send(Message::Work(pid.clone()))
                .map_err(|_| Error::from(ErrorKind::RegistrationClosed(PoolStatus::Closed)))?;
            debug!(self.inner.logger, "process registered"; "pid" => %pid);
        }
        Ok(())
    }

    /// Transitions the pool to Running and spawns the workers. Returns
    /// immediately; queued processes start executing in the background.
    pub fn start(&self) -> Result<()> {
        let mut handles = self.inner.handles.lock().unwrap();
        let mut status = self.inner.status.write().unwrap();
        if *status != PoolStatus::Created {
            return Err(Error::from(ErrorKind::PoolNotCreated(*status)));
        }

        for slot in 0..self.inner.size {
            let ctx = WorkerCtx {
                slot,
                inner: Arc::clone(&self.inner),
                receiver: self.inner.receiver.clone(),
            };
            handles.push(thread::spawn(move || worker::run(ctx)));
        }
        *status = PoolStatus::Running;
        info!(self.inner.logger, "pool started"; "workers" => self.inner.size);
        Ok(())
    }

    /// Cancels the process with the given pid. A waiting process turns
    /// Killed and is skipped by the workers; a running process has its
    /// token fired and keeps the Killed status whatever its body returns.
    /// Terminal processes and unknown pids are left alone.
    pub fn kill(&self, pid: &str) {
        let record = match self.inner.registry.get(pid) {
            Some(record) => record,
            None => return,
        };
        let mut record = record.lock().unwrap();
        match record.status {
            ProcessStatus::Waiting => {
                record.status = ProcessStatus::Killed;
                record.error = Some(Error::cancelled());
                record.ended_at = Some(Instant::now());
                record.cancel.fire();
                info!(self.inner.logger, "process killed while waiting"; "pid" => pid);
            }
            ProcessStatus::Running => {
                record.status = ProcessStatus::Killed;
                record.cancel.fire();
                info!(self.inner.logger, "process killed while running"; "pid" => pid);
            }
            _ => {}
        }
    }

    /// Stops the pool. Every process already queued still runs; once the
    /// queue is drained the workers exit and the pool transitions to
    /// Closed. Blocks until all in-flight processes reach a terminal
    /// status. Legal only on a running pool.
    pub fn close(&self) -> Result<()> {
        // the handles lock serializes concurrent closes end to end
        let mut handles = self.inner.handles.lock().unwrap();
        {
            let status = self.inner.status.write().unwrap();
            if *status != PoolStatus::Running {
                return Err(Error::from(ErrorKind::PoolNotRunning(*status)));
            }
            self.inner.closing.store(true, Ordering::SeqCst);
            // one terminate per worker, queued behind all pending work
            for _ in 0..self.inner.size {
                let _ = self.inner.sender.send(Message::Terminate);
            }
        }

        for handle in handles.drain(..) {
            if handle.join().is_err() {
                debug!(self.inner.logger, "worker thread exited abnormally");
            }
        }

        let mut status = self.inner.status.write().unwrap();
        *status = PoolStatus::Closed;
        info!(self.inner.logger, "pool closed");
        Ok(())
    }

    /// Read-only view over pool, worker and process state.
    pub fn monitor(&self) -> Monitor {
        Monitor::new(Arc::clone(&self.inner))
    }
}

// release the workers if the pool is dropped without being closed
impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Ok(status) = self.inner.status.read() {
            if *status == PoolStatus::Running && !self.inner.closing.load(Ordering::SeqCst) {
                for _ in 0..self.inner.size {
                    let _ = self.inner.sender.send(Message::Terminate);
                }
            }
        }
    }
}
