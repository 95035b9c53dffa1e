//! `nslookup <host>`

use std::net::IpAddr;

use crate::backend::NameResolver;
use crate::error::{Error, Result};

const COMMAND: &str = "nslookup";

/// One resolved address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    /// Name reported by the resolver. The system resolver reports the
    /// name it was asked for, not a canonical name.
    pub name: String,
    pub addr: IpAddr,
}

impl HostEntry {
    pub fn new(name: impl Into<String>, addr: IpAddr) -> Self {
        Self {
            name: name.into(),
            addr,
        }
    }
}

/// Resolve the single host operand.
pub async fn lookup<R: NameResolver, S: AsRef<str>>(
    resolver: &R,
    operands: &[S],
) -> Result<Vec<HostEntry>> {
    let host = match operands {
        [] => return Err(Error::missing(COMMAND)),
        [host] => host.as_ref(),
        _ => return Err(Error::TooManyArguments { command: COMMAND }),
    };

    resolver
        .resolve(host)
        .await
        .map_err(|e| Error::failed(COMMAND, "getaddrinfo", &e))
}
