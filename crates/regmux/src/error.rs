use crate::arch::{Arch, Mode};
use thiserror::Error;

/// Broad classification of a [`RegError`], for callers that map errors onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown identifier or a width the caller got wrong.
    InvalidArgument,
    /// The architecture refused the value (for example an illegal segment selector).
    Permission,
}

/// Failure of a single register access.
///
/// Every variant is raised before the backing state is touched, so a failed
/// access never leaves a partial write behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegError {
    #[error("register {id} is not defined in {mode} mode")]
    UnknownRegister { id: u32, mode: Mode },

    #[error("register {id} is {expected} bytes wide, caller declared {declared}")]
    SizeMismatch {
        id: u32,
        expected: usize,
        declared: usize,
    },

    #[error("register {id} is read-only in {mode} mode")]
    ReadOnly { id: u32, mode: Mode },

    #[error("{segment} cannot be loaded with selector {selector:#06x}")]
    SegmentLoad {
        segment: &'static str,
        selector: u16,
    },
}

impl RegError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegError::UnknownRegister { .. }
            | RegError::SizeMismatch { .. }
            | RegError::ReadOnly { .. } => ErrorKind::InvalidArgument,
            RegError::SegmentLoad { .. } => ErrorKind::Permission,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegError>;

/// A batch stopped at element `index`; elements before it were applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("batch element {index} (register {id}) failed: {source}")]
pub struct BatchError {
    pub index: usize,
    pub id: u32,
    #[source]
    pub source: RegError,
}

impl BatchError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{arch} does not support {mode} mode")]
    UnsupportedMode { arch: Arch, mode: Mode },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context was saved from {saved_arch} {saved_mode}, cpu is {arch} {mode}")]
    Mismatch {
        saved_arch: Arch,
        saved_mode: Mode,
        arch: Arch,
        mode: Mode,
    },
}
