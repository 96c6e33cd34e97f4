//! Error types for boundlru

use std::fmt;
use std::io;

/// Result type alias for boundlru operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing or configuring a cache
///
/// Steady-state operations never fail; a missing key is a `None`/`false`
/// result, not an error.
#[derive(Debug)]
pub enum Error {
    /// Store constructed with a capacity of zero
    ZeroCapacity,

    /// Wrapper constructed with no store to wrap
    MissingStore,

    /// Internal structures fell out of lock-step
    Invariant(String),

    /// Configuration could not be read or parsed
    Config(String),

    /// I/O error while loading configuration
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroCapacity => write!(f, "Capacity must be greater than 0"),
            Error::MissingStore => write!(f, "No store to wrap"),
            Error::Invariant(msg) => write!(f, "Invariant violated: {}", msg),
            Error::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::ZeroCapacity.to_string(),
            "Capacity must be greater than 0"
        );
        assert_eq!(Error::MissingStore.to_string(), "No store to wrap");
        assert!(Error::Invariant("len".into()).to_string().contains("len"));
    }

    #[test]
    fn test_io_source() {
        use std::error::Error as _;

        let err = Error::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(Error::ZeroCapacity.source().is_none());
    }
}
