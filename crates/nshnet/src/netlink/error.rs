//! Error types for rtnetlink operations.

use std::io;

/// Result type for netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during netlink operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Kernel returned an error code.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Message was truncated.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Interface not found.
    #[error("interface not found: {name}")]
    InterfaceNotFound { name: String },
}

impl Error {
    /// Create a kernel error from the negative errno of an `NLMSG_ERROR`.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV, etc.).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => matches!(*errno, libc::ENOENT | libc::ENODEV),
            Self::InterfaceNotFound { .. } => true,
            _ => false,
        }
    }

    /// Get the errno value carried by this error, if any.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } => Some(*errno),
            Self::Io(e) => e.raw_os_error(),
            Self::InterfaceNotFound { .. } => Some(libc::ENODEV),
            _ => None,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            other => match other.errno() {
                Some(errno) => io::Error::from_raw_os_error(errno),
                None => io::Error::new(io::ErrorKind::InvalidData, other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_errno() {
        let err = Error::from_errno(-libc::EPERM);
        assert_eq!(err.errno(), Some(libc::EPERM));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::from_errno(-libc::ENOENT).is_not_found());
        assert!(Error::from_errno(-libc::ENODEV).is_not_found());
        assert!(
            Error::InterfaceNotFound {
                name: "eth0".into()
            }
            .is_not_found()
        );
    }

    #[test]
    fn test_into_io_error() {
        let io_err: io::Error = Error::from_errno(-libc::EEXIST).into();
        assert_eq!(io_err.raw_os_error(), Some(libc::EEXIST));

        let io_err: io::Error = Error::InterfaceNotFound {
            name: "eth9".into(),
        }
        .into();
        assert_eq!(io_err.raw_os_error(), Some(libc::ENODEV));

        let io_err: io::Error = Error::Parse("short".into()).into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
    }
}
