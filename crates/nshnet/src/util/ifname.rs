//! Interface name and index utilities.

use std::path::Path;

/// Maximum interface name length (including null terminator).
pub const IFNAMSIZ: usize = 16;

/// Error type for interface operations.
#[derive(Debug, thiserror::Error)]
pub enum IfError {
    #[error("interface not found: {0}")]
    NotFound(String),

    #[error("invalid interface name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IfError> for std::io::Error {
    fn from(err: IfError) -> Self {
        match err {
            IfError::NotFound(_) => std::io::Error::from_raw_os_error(libc::ENODEV),
            IfError::InvalidName(_) => std::io::Error::from_raw_os_error(libc::EINVAL),
            IfError::Io(e) => e,
        }
    }
}

pub type Result<T> = std::result::Result<T, IfError>;

/// Validate an interface name.
pub fn validate(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(IfError::InvalidName("empty name".to_string()));
    }

    if name.len() >= IFNAMSIZ {
        return Err(IfError::InvalidName(format!(
            "name too long (max {} chars)",
            IFNAMSIZ - 1
        )));
    }

    if name.contains('/') || name.contains('\0') {
        return Err(IfError::InvalidName(
            "name contains invalid characters".to_string(),
        ));
    }

    if name.chars().any(|c| c.is_whitespace()) {
        return Err(IfError::InvalidName("name contains whitespace".to_string()));
    }

    Ok(())
}

/// Convert an interface name to index by reading `<root>/<name>/ifindex`.
pub fn name_to_index(root: &Path, name: &str) -> Result<u32> {
    validate(name)?;

    let content = std::fs::read_to_string(root.join(name).join("ifindex"))
        .map_err(|_| IfError::NotFound(name.to_string()))?;

    content
        .trim()
        .parse()
        .map_err(|_| IfError::NotFound(name.to_string()))
}

/// Convert an interface index to name.
pub fn index_to_name(root: &Path, index: u32) -> Result<String> {
    if index == 0 {
        return Err(IfError::NotFound("index 0".to_string()));
    }

    for entry in std::fs::read_dir(root)?.flatten() {
        if let Ok(content) = std::fs::read_to_string(entry.path().join("ifindex"))
            && content.trim().parse::<u32>().ok() == Some(index)
        {
            return Ok(entry.file_name().to_string_lossy().to_string());
        }
    }

    Err(IfError::NotFound(format!("index {}", index)))
}
