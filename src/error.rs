use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("process {0} not found")]
    ProcessNotFound(String),

    #[error("could not inspect process {pid}")]
    Procfs {
        pid: i32,
        #[source]
        source: procfs::ProcError,
    },

    #[error("could not read the memory map of process {pid}")]
    Maps {
        pid: i32,
        #[source]
        source: io::Error,
    },

    #[error("malformed memory map line {line:?}: {reason}")]
    MalformedMapLine { line: String, reason: &'static str },

    #[error("process memory at {address:#x} ({len} bytes) could not be read")]
    Read {
        address: usize,
        len: usize,
        #[source]
        source: nix::Error,
    },

    #[error("process memory at {address:#x} ({len} bytes) could not be written")]
    Write {
        address: usize,
        len: usize,
        #[source]
        source: nix::Error,
    },

    #[error("transfer at {address:#x} moved {actual} of {expected} bytes")]
    ShortTransfer {
        address: usize,
        expected: usize,
        actual: usize,
    },

    #[error("unsupported pattern width {0}, expected 1, 2, 4 or 8")]
    InvalidWidth(usize),

    #[error("{0:?} is not an integer")]
    InvalidValue(String),

    #[error("invalid value {value:?} for {key}")]
    Config { key: &'static str, value: String },

    #[error("the session has already finished")]
    SessionFinished,

    #[error("the session has not converged yet")]
    NotConverged,

    #[error("logging could not be initialised: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
