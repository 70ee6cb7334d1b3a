//! Error taxonomy shared by the alignment and search engines.
//!
//! Configuration errors are raised while binding a configuration, before any
//! sequence is touched. Input errors are per call and leave the engine usable.
//! Resource errors come from matrix allocation. Internal errors flag a broken
//! invariant (for example a trace cell with no direction) and are logged at
//! error level where they are raised.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("invalid input: {0}")]
    Input(String),

    #[error("cannot allocate alignment matrix of {cells} cells")]
    Resource { cells: usize },

    #[error("internal consistency violation: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub(crate) fn input(msg: impl Into<String>) -> Self {
        Error::Input(msg.into())
    }

    /// True for errors caused by the configuration rather than by one call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}
