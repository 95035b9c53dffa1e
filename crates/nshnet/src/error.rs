//! Error type shared by every command driver.
//!
//! Each variant carries the name of the command that raised it plus the
//! context needed to render a one-line diagnostic. Rendering is left to
//! the caller through `Display`.

use std::io;
use std::path::PathBuf;

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the command drivers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required operand or option value was not supplied.
    #[error("{command}: missing required argument(s){}", suffix(.option))]
    MissingArgument {
        command: &'static str,
        /// The option whose value is missing, if one is to blame.
        option: Option<String>,
    },

    /// An operand could not be converted (address, MAC, number) or is not
    /// accepted by the current capability set.
    #[error("{command}: argument invalid{}", suffix(.argument))]
    InvalidArgument {
        command: &'static str,
        argument: Option<String>,
    },

    /// More positional operands than the command accepts.
    #[error("{command}: too many arguments")]
    TooManyArguments { command: &'static str },

    /// A working buffer could not be reserved.
    #[error("{command}: out of memory")]
    OutOfMemory { command: &'static str },

    /// An external call returned an error code.
    #[error("{command}: {operation} failed: {errno}")]
    CommandFailed {
        command: &'static str,
        operation: &'static str,
        errno: i32,
    },

    /// A lookup found no matching entry.
    #[error("{command}: no such {what}: {key}")]
    NoSuchEntry {
        command: &'static str,
        what: &'static str,
        key: String,
    },

    /// The device listing could not be opened.
    #[error("{command}: opendir {} failed: {errno}", .path.display())]
    EnumerationFailed {
        command: &'static str,
        path: PathBuf,
        errno: i32,
    },
}

fn suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {}", detail),
        None => String::new(),
    }
}

/// Plain discriminant of [`Error`] for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingArgument,
    InvalidArgument,
    TooManyArguments,
    OutOfMemory,
    CommandFailed,
    NoSuchEntry,
    EnumerationFailed,
}

impl Error {
    /// Missing operand with no specific option to blame.
    pub fn missing(command: &'static str) -> Self {
        Self::MissingArgument {
            command,
            option: None,
        }
    }

    /// Missing value after `option`.
    pub fn missing_option(command: &'static str, option: impl Into<String>) -> Self {
        Self::MissingArgument {
            command,
            option: Some(option.into()),
        }
    }

    /// Invalid operand.
    pub fn invalid(command: &'static str, argument: impl Into<String>) -> Self {
        Self::InvalidArgument {
            command,
            argument: Some(argument.into()),
        }
    }

    /// Wrap a failed external call, keeping its OS error code.
    pub fn failed(command: &'static str, operation: &'static str, err: &io::Error) -> Self {
        Self::CommandFailed {
            command,
            operation,
            errno: err.raw_os_error().unwrap_or(libc::EIO),
        }
    }

    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingArgument { .. } => ErrorKind::MissingArgument,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::TooManyArguments { .. } => ErrorKind::TooManyArguments,
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            Self::CommandFailed { .. } => ErrorKind::CommandFailed,
            Self::NoSuchEntry { .. } => ErrorKind::NoSuchEntry,
            Self::EnumerationFailed { .. } => ErrorKind::EnumerationFailed,
        }
    }

    /// Get the OS error code if this error came from an external call.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { errno, .. } | Self::EnumerationFailed { errno, .. } => {
                Some(*errno)
            }
            _ => None,
        }
    }

    /// Check if this is an entry-not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchEntry { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_messages() {
        assert_eq!(
            Error::missing("get").to_string(),
            "get: missing required argument(s)"
        );
        assert_eq!(
            Error::missing_option("ifconfig", "netmask").to_string(),
            "ifconfig: missing required argument(s): netmask"
        );
    }

    #[test]
    fn test_failed_keeps_errno() {
        let err = Error::failed("arp", "ioctl", &io::Error::from_raw_os_error(libc::EPERM));
        assert_eq!(err.kind(), ErrorKind::CommandFailed);
        assert_eq!(err.errno(), Some(libc::EPERM));
        assert_eq!(err.to_string(), format!("arp: ioctl failed: {}", libc::EPERM));
    }

    #[test]
    fn test_failed_without_os_code() {
        let err = Error::failed("wget", "wget", &io::Error::other("boom"));
        assert_eq!(err.errno(), Some(libc::EIO));
    }

    #[test]
    fn test_not_found() {
        let err = Error::NoSuchEntry {
            command: "arp",
            what: "ARP entry",
            key: "10.0.0.1".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "arp: no such ARP entry: 10.0.0.1");
    }
}
