//! Console log follower.
//!
//! Reads lines appended to the server log, starting from the end of the
//! file at open time. When the log is rotated (replaced by a new file of the
//! same name) or truncated, the follower reattaches and reads the new file
//! from its beginning.

use std::collections::VecDeque;
use std::fs::Metadata;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use backon::BackoffBuilder;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::time::sleep;
use tracing::{debug, info};

/// Default delay between checks for new data.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Longest wait between attempts to reopen a missing log.
const MAX_REOPEN_DELAY: Duration = Duration::from_secs(5);

const READ_CHUNK: usize = 8192;

/// Backoff for reopening a log that has disappeared. Unlimited attempts.
fn reopen_backoff(min_delay: Duration) -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(min_delay)
        .with_max_delay(MAX_REOPEN_DELAY)
        .with_factor(2.0)
        .without_max_times()
        .build()
}

#[cfg(unix)]
fn file_identity(meta: &Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ino())
}

#[cfg(not(unix))]
fn file_identity(_meta: &Metadata) -> Option<u64> {
    None
}

/// Follows one log file, yielding complete lines.
pub struct LogFollower {
    path: PathBuf,
    poll_interval: Duration,
    file: File,
    identity: Option<u64>,
    /// Bytes read so far from the current file.
    position: u64,
    /// Trailing bytes of a line whose newline has not arrived yet.
    pending: Vec<u8>,
    ready: VecDeque<String>,
    read_buf: Vec<u8>,
}

impl LogFollower {
    /// Open `path` positioned at its current end.
    pub async fn open(path: impl Into<PathBuf>, poll_interval: Duration) -> io::Result<Self> {
        let path = path.into();
        let mut file = File::open(&path).await?;
        let identity = file_identity(&file.metadata().await?);
        let position = file.seek(SeekFrom::End(0)).await?;

        info!("Following {} from byte {}", path.display(), position);

        Ok(Self {
            path,
            poll_interval,
            file,
            identity,
            position,
            pending: Vec::new(),
            ready: VecDeque::new(),
            read_buf: vec![0u8; READ_CHUNK],
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the next complete line, without its line terminator.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub async fn next_line(&mut self) -> io::Result<String> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Ok(line);
            }

            let n = self.file.read(&mut self.read_buf).await?;
            if n > 0 {
                self.position += n as u64;
                self.absorb(n);
                continue;
            }

            if !self.check_rotation().await? {
                sleep(self.poll_interval).await;
            }
        }
    }

    /// Move the first `n` bytes of the read buffer into `pending` and split
    /// off every complete line.
    fn absorb(&mut self, n: usize) {
        self.pending.extend_from_slice(&self.read_buf[..n]);

        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let text = String::from_utf8_lossy(&line).into_owned();
            self.ready.push_back(text);
        }
    }

    /// Reattach if the file at our path is no longer the one we are reading.
    /// Returns true when a new file was opened.
    async fn check_rotation(&mut self) -> io::Result<bool> {
        let meta = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    "{} disappeared, waiting for it to return",
                    self.path.display()
                );
                self.reattach().await?;
                return Ok(true);
            }
            Err(e) => return Err(e),
        };

        let replaced = match (self.identity, file_identity(&meta)) {
            (Some(current), Some(on_disk)) => current != on_disk,
            _ => false,
        };
        let truncated = meta.len() < self.position;

        if replaced || truncated {
            info!(
                replaced,
                truncated,
                "{} was rotated, reading the new file",
                self.path.display()
            );
            self.reattach().await?;
            return Ok(true);
        }

        Ok(false)
    }

    async fn reattach(&mut self) -> io::Result<()> {
        let mut backoff = reopen_backoff(self.poll_interval);

        let file = loop {
            match File::open(&self.path).await {
                Ok(file) => break file,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    let delay = backoff.next().unwrap_or(MAX_REOPEN_DELAY);
                    debug!(
                        "{} not found, retrying in {:?}",
                        self.path.display(),
                        delay
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        };

        if !self.pending.is_empty() {
            debug!("Dropping {} bytes of a partial line", self.pending.len());
            self.pending.clear();
        }

        self.identity = file_identity(&file.metadata().await?);
        self.file = file;
        self.position = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::time::timeout;

    const POLL: Duration = Duration::from_millis(10);
    const WAIT: Duration = Duration::from_secs(5);

    fn append(path: &Path, text: &str) {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file.flush().unwrap();
    }

    #[tokio::test]
    async fn test_starts_at_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest.log");
        append(&path, "old line 1\nold line 2\n");

        let mut follower = LogFollower::open(&path, POLL).await.unwrap();
        append(&path, "new line\n");

        let line = timeout(WAIT, follower.next_line()).await.unwrap().unwrap();
        assert_eq!(line, "new line");
    }

    #[tokio::test]
    async fn test_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest.log");
        append(&path, "");

        let mut follower = LogFollower::open(&path, POLL).await.unwrap();
        append(&path, "first\r\nsecond\nthird\n");

        for expected in ["first", "second", "third"] {
            let line = timeout(WAIT, follower.next_line()).await.unwrap().unwrap();
            assert_eq!(line, expected);
        }
    }

    #[tokio::test]
    async fn test_partial_line_buffered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest.log");
        append(&path, "");

        let mut follower = LogFollower::open(&path, POLL).await.unwrap();
        append(&path, "hel");

        // Nothing complete yet
        let early = timeout(Duration::from_millis(100), follower.next_line()).await;
        assert!(early.is_err());

        append(&path, "lo\n");
        let line = timeout(WAIT, follower.next_line()).await.unwrap().unwrap();
        assert_eq!(line, "hello");
    }

    #[tokio::test]
    async fn test_line_longer_than_read_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest.log");
        append(&path, "");

        let mut follower = LogFollower::open(&path, POLL).await.unwrap();
        let long = "x".repeat(READ_CHUNK * 2 + 17);
        append(&path, &format!("{}\nafter\n", long));

        let line = timeout(WAIT, follower.next_line()).await.unwrap().unwrap();
        assert_eq!(line.len(), long.len());
        let line = timeout(WAIT, follower.next_line()).await.unwrap().unwrap();
        assert_eq!(line, "after");

        // The same buffer serves every read
        assert_eq!(follower.read_buf.len(), READ_CHUNK);
        assert!(follower.pending.is_empty());
    }

    #[tokio::test]
    async fn test_rotation_by_rename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest.log");
        append(&path, "before rotation\n");

        let mut follower = LogFollower::open(&path, POLL).await.unwrap();

        std::fs::rename(&path, dir.path().join("2024-01-01-1.log")).unwrap();
        append(&path, "fresh file\n");

        let line = timeout(WAIT, follower.next_line()).await.unwrap().unwrap();
        assert_eq!(line, "fresh file");
    }

    #[tokio::test]
    async fn test_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest.log");
        append(&path, "a fairly long line that sets the read position\n");

        let mut follower = LogFollower::open(&path, POLL).await.unwrap();

        std::fs::write(&path, "short\n").unwrap();

        let line = timeout(WAIT, follower.next_line()).await.unwrap().unwrap();
        assert_eq!(line, "short");
    }

    #[tokio::test]
    async fn test_waits_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest.log");
        append(&path, "");

        let mut follower = LogFollower::open(&path, POLL).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let writer_path = path.clone();
        let writer = tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            append(&writer_path, "back again\n");
        });

        let line = timeout(WAIT, follower.next_line()).await.unwrap().unwrap();
        assert_eq!(line, "back again");
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest.log");
        append(&path, "");

        let mut follower = LogFollower::open(&path, POLL).await.unwrap();
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap();
        file.write_all(b"bad \xff byte\n").unwrap();

        let line = timeout(WAIT, follower.next_line()).await.unwrap().unwrap();
        assert_eq!(line, "bad \u{FFFD} byte");
    }

    #[tokio::test]
    async fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = LogFollower::open(dir.path().join("nope.log"), POLL).await;
        let err = result.err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
