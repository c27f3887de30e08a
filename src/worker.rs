use crate::error::Error;
use crate::pool::{Message, PoolInner};
use crate::process::Pid;
use crate::status::{ProcessStatus, WorkerStatus};
use crossbeam::channel::Receiver;
use slog::debug;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Observable state of one worker slot, mutated only by its own worker
/// thread and read by the monitor.
pub(crate) struct WorkerRecord {
    pub name: String,
    pub status: WorkerStatus,
    pub current_pid: Option<Pid>,
}

impl WorkerRecord {
    pub fn new(name: String) -> Self {
        WorkerRecord {
            name,
            status: WorkerStatus::Idle,
            current_pid: None,
        }
    }
}

pub(crate) struct WorkerCtx {
    pub slot: usize,
    pub inner: Arc<PoolInner>,
    pub receiver: Receiver<Message>,
}

impl WorkerCtx {
    fn name(&self) -> String {
        self.inner.workers[self.slot].lock().unwrap().name.clone()
    }
}

// listen to the work channel until a terminate message arrives
pub(crate) fn run(ctx: WorkerCtx) {
    while let Ok(message) = ctx.receiver.recv() {
        match message {
            Message::Work(pid) => execute(&ctx, &pid),
            Message::Terminate => break,
        }
    }

    let mut worker = ctx.inner.workers[ctx.slot].lock().unwrap();
    worker.status = WorkerStatus::Stopped;
    worker.current_pid = None;
}

fn execute(ctx: &WorkerCtx, pid: &Pid) {
    let record = match ctx.inner.registry.get(pid.as_str()) {
        Some(record) => record,
        None => return,
    };
    let name = ctx.name();

    let (process, token) = {
        let mut record = record.lock().unwrap();
        // killed while waiting, the record is already terminal
        if record.status != ProcessStatus::Waiting {
            debug!(ctx.inner.logger, "skipping killed process"; "pid" => %pid, "worker" => %name);
            return;
        }
        record.status = ProcessStatus::Running;
        record.started_at = Some(Instant::now());
        record.worker = Some(name.clone());
        (Arc::clone(&record.process), record.token.clone())
    };

    {
        let mut worker = ctx.inner.workers[ctx.slot].lock().unwrap();
        worker.status = WorkerStatus::Busy;
        worker.current_pid = Some(pid.clone());
    }
    debug!(ctx.inner.logger, "process started"; "pid" => %pid, "worker" => %name);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| process.start(&token)));

    let mut record = record.lock().unwrap();
    match outcome {
        Ok(Ok(())) => {
            if record.status == ProcessStatus::Killed {
                // the body ignored the kill and completed anyway; killed
                // records still carry the cancellation error
                if record.error.is_none() {
                    record.error = Some(Error::cancelled());
                }
            } else {
                record.status = ProcessStatus::Succeeded;
            }
        }
        Ok(Err(err)) => {
            // a kill that raced the body keeps its Killed status and
            // stores whatever the body returned
            if record.status != ProcessStatus::Killed {
                record.status = ProcessStatus::Failed;
            }
            record.error = Some(err);
        }
        Err(payload) => {
            if record.status != ProcessStatus::Killed {
                record.status = ProcessStatus::Failed;
            }
            record.error = Some(Error::process(format!(
                "process {} panicked: {}",
                pid,
                panic_message(payload)
            )));
        }
    }
    record.ended_at = Some(Instant::now());
    let status = record.status;
    drop(record);

    {
        let mut worker = ctx.inner.workers[ctx.slot].lock().unwrap();
        worker.status = WorkerStatus::Idle;
        worker.current_pid = None;
    }
    debug!(ctx.inner.logger, "process finished"; "pid" => %pid, "worker" => %name, "status" => %status);
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
