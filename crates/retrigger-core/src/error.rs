//! Error types for retrigger-core

use thiserror::Error as ThisError;

/// Result type alias for retrigger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Exit code for runtime failures (no match, build server errors)
pub const EXIT_RUNTIME: i32 = 1;

/// Exit code for usage errors reported by the argument parser
pub const EXIT_USAGE: i32 = 2;

/// Exit code for configuration errors (missing input, conflicting filters)
pub const EXIT_CONFIG: i32 = 3;

/// Main error type for retrigger operations
#[derive(Debug, ThisError)]
pub enum Error {
    /// Conflicting filters or malformed option value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required option has no value from any source
    #[error("Missing required option: {0}")]
    Missing(String),

    /// Repository identifier is not of the form `owner/name`
    #[error("Invalid repository: {0}")]
    InvalidRepository(String),

    /// No build in the listed set satisfied the filters
    #[error("No previous builds found for {repo}")]
    NotFound {
        /// Repository that was searched, as `owner/name`
        repo: String,
    },

    /// Credentials rejected by the build server
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request could not be delivered (DNS, TLS, connection, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Build server answered with a non-success status
    #[error("Server error: {0}")]
    Server(String),

    /// Build server response could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Runtime error (Tokio, threading, etc.)
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Decode(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(format!("JSON error: {}", err))
    }
}

/// Fieldless error category for zero-cost pattern matching.
///
/// Single byte representation (`#[repr(u8)]`), `Copy`, no allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorKind {
    /// Configuration error
    Config,
    /// Missing required option
    Missing,
    /// Malformed repository identifier
    InvalidRepository,
    /// No matching build
    NotFound,
    /// Rejected credentials
    Unauthorized,
    /// Transport failure
    Transport,
    /// Non-success server status
    Server,
    /// Undecodable response
    Decode,
    /// Runtime error
    Runtime,
    /// I/O operation error
    Io,
}

impl Error {
    /// Get the error kind without allocating
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Missing(_) => ErrorKind::Missing,
            Error::InvalidRepository(_) => ErrorKind::InvalidRepository,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Server(_) => ErrorKind::Server,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Runtime(_) => ErrorKind::Runtime,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Borrow the error message
    #[inline]
    pub fn message(&self) -> &str {
        match self {
            Error::Config(msg)
            | Error::Missing(msg)
            | Error::InvalidRepository(msg)
            | Error::Unauthorized(msg)
            | Error::Transport(msg)
            | Error::Server(msg)
            | Error::Decode(msg)
            | Error::Runtime(msg) => msg,
            Error::NotFound { repo } => repo,
            Error::Io(_) => "I/O error",
        }
    }

    /// True when the error came from a build server call.
    #[inline]
    pub const fn is_collaborator(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Unauthorized | ErrorKind::Transport | ErrorKind::Server | ErrorKind::Decode
        )
    }

    /// Process exit code for this error.
    ///
    /// Configuration problems (including a malformed repository identifier,
    /// which is caught before any request) exit with [`EXIT_CONFIG`];
    /// everything else is a runtime failure.
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Config | ErrorKind::Missing | ErrorKind::InvalidRepository => EXIT_CONFIG,
            _ => EXIT_RUNTIME,
        }
    }
}
