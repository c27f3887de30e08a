use crate::error::Result;
use crossbeam::channel::{bounded, Receiver, Sender, TryRecvError};
use std::borrow::Borrow;
use std::fmt::{self, Display};

/// Identifier of a registered process, unique within a pool.
/// Assigned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pid(String);

impl Pid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Pid {
    fn from(pid: &str) -> Self {
        Pid(pid.to_string())
    }
}

impl From<String> for Pid {
    fn from(pid: String) -> Self {
        Pid(pid)
    }
}

// lets the registry map be queried by &str
impl Borrow<str> for Pid {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of work executed by the pool.
///
/// The pool knows nothing about the body; it only invokes `start` with the
/// process cancellation token and records the outcome. Bodies that want to
/// be cancellable must observe the token, either by blocking on `done()` or
/// by polling `is_cancelled()`.
pub trait Process: Send + Sync {
    fn name(&self) -> String;
    fn pid(&self) -> Pid;
    fn start(&self, token: &CancelToken) -> Result<()>;
}

/// One-shot cooperative cancellation signal shared with a process body.
///
/// Nothing is ever sent on the underlying channel; the signal is the channel
/// becoming disconnected, so observing it does not consume anything and any
/// number of clones see it.
#[derive(Clone)]
pub struct CancelToken {
    done: Receiver<()>,
}

impl CancelToken {
    /// Channel that disconnects once the process is killed. Blocking on
    /// `recv` (or `recv_timeout`) returns an error as soon as that happens.
    pub fn done(&self) -> &Receiver<()> {
        &self.done
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.done.try_recv(), Err(TryRecvError::Disconnected))
    }
}

/// Control side of a token, held by the process record. Firing it drops the
/// sender, which disconnects every token clone.
pub(crate) struct CancelHandle {
    sender: Option<Sender<()>>,
}

impl CancelHandle {
    pub fn fire(&mut self) {
        self.sender.take();
    }
}

pub(crate) fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (sender, done) = bounded(1);
    (
        CancelHandle {
            sender: Some(sender),
        },
        CancelToken { done },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn token_reports_cancellation() {
        let (mut handle, token) = cancel_pair();
        let observer = token.clone();
        assert!(!token.is_cancelled());
        handle.fire();
        assert!(token.is_cancelled());
        assert!(observer.is_cancelled());
        // the signal is not consumed by repeated checks
        assert!(token.is_cancelled());
    }

    #[test]
    fn blocked_body_is_released() {
        let (mut handle, token) = cancel_pair();
        handle.fire();
        assert!(token.done().recv_timeout(Duration::from_secs(1)).is_err());
    }
}
