use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    InvalidArguments = 3,
    Io = 4,
    InvalidContent = 5,
    Manifest = 6,
}

impl ExitCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Success),
            3 => Some(Self::InvalidArguments),
            4 => Some(Self::Io),
            5 => Some(Self::InvalidContent),
            6 => Some(Self::Manifest),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SectionError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: BoxError },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: BoxError },

    #[error("invalid document {path}: {reason}")]
    InvalidContent { path: PathBuf, reason: String },

    #[error("invalid section title {title:?}: {reason}")]
    InvalidTitle { title: String, reason: &'static str },
}

impl SectionError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Read { .. } | Self::Write { .. } => ExitCode::Io,
            Self::InvalidContent { .. } => ExitCode::InvalidContent,
            Self::InvalidTitle { .. } => ExitCode::InvalidArguments,
        }
    }

    /// Returns the capability error that caused a read or write failure.
    pub fn io_source(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

pub type SectionResult<T> = Result<T, SectionError>;
