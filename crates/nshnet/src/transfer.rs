//! File transfer argument handling for `get`, `put` and `wget`.
//!
//! ```text
//! get [-b|-n] [-f <local-path>] -h <ip-address> <remote-path>
//! put [-b|-n] [-f <remote-path>] -h <ip-address> <local-path>
//! wget [-o <local-path>] <url>
//! ```
//!
//! When no destination is given it is derived from the base name of the
//! source, and the derived name is owned by the argument set.

use std::borrow::Cow;
use std::fs::File;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::backend::{TransferClient, WebClient};
use crate::error::{Error, Result};
use crate::util::addr::parse_ipv4;

/// TFTP transfer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    /// `octet`
    Binary,
    /// `netascii`
    #[default]
    Text,
}

impl TransferMode {
    /// Mode name on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            TransferMode::Binary => "octet",
            TransferMode::Text => "netascii",
        }
    }
}

/// Validated `get`/`put` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferArgs<'a> {
    pub mode: TransferMode,
    /// Destination path; owned when derived from `src`.
    pub dest: Cow<'a, str>,
    pub src: &'a str,
    pub host: Ipv4Addr,
}

impl<'a> TransferArgs<'a> {
    /// Validate options and operands of `command`.
    ///
    /// Exactly one source operand and a host address are required.
    pub fn parse<S: AsRef<str>>(
        command: &'static str,
        mode: TransferMode,
        dest: Option<&'a str>,
        host: Option<&str>,
        operands: &'a [S],
    ) -> Result<Self> {
        let host = host
            .map(|h| parse_ipv4(h).map_err(|_| Error::invalid(command, h)))
            .transpose()?;

        let src = match operands {
            [] => return Err(Error::missing(command)),
            [src] => src.as_ref(),
            _ => return Err(Error::TooManyArguments { command }),
        };

        let host = match host {
            Some(host) if !host.is_unspecified() => host,
            _ => return Err(Error::missing_option(command, "-h")),
        };

        let dest = match dest {
            Some(dest) => Cow::Borrowed(dest),
            None => Cow::Owned(base_name(src).to_string()),
        };

        Ok(Self {
            mode,
            dest,
            src,
            host,
        })
    }

    /// Check if the destination was derived rather than supplied.
    pub fn dest_is_derived(&self) -> bool {
        matches!(self.dest, Cow::Owned(_))
    }
}

/// Last path component of `path` (or of a URL), ignoring trailing slashes.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return path;
    }
    match trimmed.rsplit_once('/') {
        Some((_, name)) => name,
        None => trimmed,
    }
}

/// Resolve `name` against the working directory.
pub fn full_path(cwd: &Path, name: &str) -> PathBuf {
    cwd.join(name)
}

/// Fetch `args.src` from the remote host into the local destination.
pub async fn get<C: TransferClient>(client: &C, args: &TransferArgs<'_>, cwd: &Path) -> Result<()> {
    let local = full_path(cwd, &args.dest);
    debug!(remote = args.src, local = %local.display(), host = %args.host, mode = args.mode.as_str(), "tftp get");
    client
        .get(args.src, &local, args.host, args.mode)
        .await
        .map_err(|e| Error::failed("get", "tftpget", &e))
}

/// Send the local source to the remote destination.
pub async fn put<C: TransferClient>(client: &C, args: &TransferArgs<'_>, cwd: &Path) -> Result<()> {
    let local = full_path(cwd, args.src);
    debug!(local = %local.display(), remote = %args.dest, host = %args.host, mode = args.mode.as_str(), "tftp put");
    client
        .put(&local, &args.dest, args.host, args.mode)
        .await
        .map_err(|e| Error::failed("put", "tftpput", &e))
}

/// Validated `wget` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WgetArgs<'a> {
    pub url: &'a str,
    /// Local file; owned when derived from the URL.
    pub local: Cow<'a, str>,
}

impl<'a> WgetArgs<'a> {
    pub fn parse<S: AsRef<str>>(output: Option<&'a str>, operands: &'a [S]) -> Result<Self> {
        let url = match operands {
            [] => return Err(Error::missing("wget")),
            [url] => url.as_ref(),
            _ => return Err(Error::TooManyArguments { command: "wget" }),
        };
        let local = match output {
            Some(path) => Cow::Borrowed(path),
            None => Cow::Owned(base_name(url).to_string()),
        };
        Ok(Self { url, local })
    }
}

/// Download `args.url` into the local file, truncating it first.
///
/// Returns the number of bytes written.
pub async fn wget<W: WebClient>(client: &W, args: &WgetArgs<'_>, cwd: &Path) -> Result<u64> {
    let path = full_path(cwd, &args.local);
    let mut file = File::create(&path).map_err(|e| Error::failed("wget", "open", &e))?;

    debug!(url = args.url, path = %path.display(), "wget");
    let written = client
        .fetch(args.url, &mut file)
        .await
        .map_err(|e| Error::failed("wget", "wget", &e))?;
    file.sync_all()
        .map_err(|e| Error::failed("wget", "write", &e))?;
    Ok(written)
}
