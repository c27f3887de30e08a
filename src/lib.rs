mod error;
mod monitor;
mod pool;
mod process;
mod registry;
mod status;
mod worker;

pub use error::{Error, ErrorKind, Result};
pub use monitor::{Monitor, ProcessStats};
pub use pool::WorkerPool;
pub use process::{CancelToken, Pid, Process};
pub use status::{PoolStatus, ProcessStatus, WorkerStatus};
