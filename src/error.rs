use crate::process::Pid;
use crate::status::PoolStatus;
use failure::{Context, Fail};
use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    inner: Context<ErrorKind>,
}

#[derive(Debug, Clone, PartialEq, Fail)]
pub enum ErrorKind {
    #[fail(display = "pool is not running, status {}", _0)]
    PoolNotRunning(PoolStatus),

    #[fail(display = "unable to start the pool, status: {}", _0)]
    PoolNotCreated(PoolStatus),

    #[fail(display = "unable to register processes, status: {}", _0)]
    RegistrationClosed(PoolStatus),

    #[fail(display = "invalid pool size: {}", _0)]
    InvalidPoolSize(usize),

    #[fail(display = "process {} is already registered", _0)]
    DuplicatePid(Pid),

    #[fail(display = "task was cancelled")]
    Cancelled,

    #[fail(display = "{}", _0)]
    Process(String),
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }

    pub fn as_string(&self) -> String {
        format!("{}", self)
    }

    /// The standard error attributed to cancelled processes.
    pub fn cancelled() -> Error {
        Error::from(ErrorKind::Cancelled)
    }

    /// An arbitrary error produced by a process body.
    pub fn process<T: Into<String>>(message: T) -> Error {
        Error::from(ErrorKind::Process(message.into()))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error {
            inner: Context::new(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_state_messages() {
        assert_eq!(
            "pool is not running, status Created",
            Error::from(ErrorKind::PoolNotRunning(PoolStatus::Created)).to_string()
        );
        assert_eq!(
            "unable to start the pool, status: Running",
            Error::from(ErrorKind::PoolNotCreated(PoolStatus::Running)).to_string()
        );
        assert_eq!(
            "unable to register processes, status: Closed",
            Error::from(ErrorKind::RegistrationClosed(PoolStatus::Closed)).to_string()
        );
    }

    #[test]
    fn cancellation_message() {
        assert_eq!("task was cancelled", Error::cancelled().to_string());
    }

    #[test]
    fn process_message_is_kept_verbatim() {
        let err = Error::process("something broke");
        assert_eq!("something broke", err.as_string());
        assert_eq!(&ErrorKind::Process("something broke".to_string()), err.kind());
    }
}
