//! HTTP download infrastructure — implements `Fetcher` with `ureq`.

use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{Fetcher, ProgressSink};

/// Connect timeout for driver and ISO downloads.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Streaming buffer size.
const CHUNK_SIZE: usize = 64 * 1024;

/// Downloads over HTTP(S) into a temporary file beside the destination, then
/// moves it into place.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .user_agent(concat!("hvdriver/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, destination: &Path, progress: &dyn ProgressSink) -> Result<()> {
        tracing::debug!(url, destination = %destination.display(), "fetching");
        let response = self
            .agent
            .get(url)
            .call()
            .with_context(|| format!("GET {url}"))?;

        let total = response
            .header("Content-Length")
            .and_then(|v| v.parse::<u64>().ok());

        let dir = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating directory {}", dir.display()))?;
        let mut staged = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temporary file in {}", dir.display()))?;

        progress.start(total);
        let copied = copy_with_progress(&mut response.into_reader(), staged.as_file_mut(), progress);
        progress.finish();
        let written = copied.with_context(|| format!("downloading {url}"))?;

        if let Some(expected) = total {
            anyhow::ensure!(
                written == expected,
                "short download from {url}: got {written} of {expected} bytes"
            );
        }

        staged
            .persist(destination)
            .map_err(|e| e.error)
            .with_context(|| format!("moving download to {}", destination.display()))?;
        Ok(())
    }
}

/// Copy `reader` into `writer`, reporting each chunk. Returns bytes copied.
fn copy_with_progress(
    reader: &mut impl Read,
    writer: &mut impl Write,
    progress: &dyn ProgressSink,
) -> std::io::Result<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
        progress.advance(n as u64);
    }
    writer.flush()?;
    Ok(total)
}
