use std::fmt;
use std::result::Result as StdResult;

use thiserror::Error;

pub type Result<T> = StdResult<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// transport failed to connect, read or write
    #[error(transparent)]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// room lookup failed
    #[error("resolve room: {0}")]
    Resolve(String),

    /// wire codec failure
    #[error(transparent)]
    Proto(#[from] crate::proto::Error),

    /// reconnect budget exhausted
    #[error("connect failed after {attempts} attempts")]
    ConnectFailed { attempts: usize },

    /// the client was already started
    #[error("already started")]
    AlreadyStarted,

    /// the session is gone
    #[error("closed")]
    Closed,
}

impl Error {
    pub fn resolve<E: fmt::Display>(err: E) -> Self {
        Error::Resolve(err.to_string())
    }
}
