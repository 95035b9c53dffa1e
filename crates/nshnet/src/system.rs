//! Host-provided services: the system resolver, an external TFTP client
//! and HTTP downloads.

use std::io;
use std::net::Ipv4Addr;
use std::path::Path;

use tokio::process::Command;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::backend::{DownloadSink, NameResolver, TransferClient, WebClient};
use crate::nslookup::HostEntry;
use crate::transfer::TransferMode;

/// Resolver backed by the host's `getaddrinfo`.
///
/// Entries carry the queried name; canonical names are not available.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl NameResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<HostEntry>> {
        let mut entries: Vec<HostEntry> = Vec::new();
        for addr in tokio::net::lookup_host((host, 0)).await? {
            if !entries.iter().any(|e| e.addr == addr.ip()) {
                entries.push(HostEntry::new(host, addr.ip()));
            }
        }
        Ok(entries)
    }
}

/// Runs an external `tftp` client in command mode.
#[derive(Debug, Clone)]
pub struct TftpCommand {
    program: String,
}

impl TftpCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run `<program> -m <mode> <host> -c <verb> <from> <to>`.
    async fn run(
        &self,
        host: Ipv4Addr,
        mode: TransferMode,
        verb: &str,
        from: &str,
        to: &str,
    ) -> io::Result<()> {
        debug!(program = %self.program, %host, mode = mode.as_str(), verb, from, to, "run tftp client");
        let status = Command::new(&self.program)
            .arg("-m")
            .arg(mode.as_str())
            .arg(host.to_string())
            .arg("-c")
            .args([verb, from, to])
            .status()
            .await?;
        if !status.success() {
            return Err(io::Error::other(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}

fn path_arg(path: &Path) -> io::Result<&str> {
    path.to_str()
        .ok_or_else(|| io::Error::from_raw_os_error(libc::EINVAL))
}

impl TransferClient for TftpCommand {
    async fn get(
        &self,
        remote: &str,
        local: &Path,
        host: Ipv4Addr,
        mode: TransferMode,
    ) -> io::Result<()> {
        self.run(host, mode, "get", remote, path_arg(local)?).await
    }

    async fn put(
        &self,
        local: &Path,
        remote: &str,
        host: Ipv4Addr,
        mode: TransferMode,
    ) -> io::Result<()> {
        self.run(host, mode, "put", path_arg(local)?, remote).await
    }
}

/// Streaming HTTP client.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WebClient for HttpClient {
    async fn fetch(&self, url: &str, sink: &mut dyn DownloadSink) -> io::Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(io::Error::other)?;

        let mut stream = response.bytes_stream();
        let mut total = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(io::Error::other)?;
            sink.write_chunk(&chunk)?;
            total += chunk.len() as u64;
        }
        debug!(url, total, "download complete");
        Ok(total)
    }
}
