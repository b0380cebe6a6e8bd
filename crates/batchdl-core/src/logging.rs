//! Logging init: console on stderr plus a durable log file, or stderr only as a fallback.
//!
//! Job events reach both destinations through `sink::TracingSink`. The console
//! shows info and above; the file also keeps the raw tool output, which is
//! logged at debug. `RUST_LOG` overrides both. Each event is formatted into one
//! buffer and written with a single call, so lines from concurrent workers
//! never tear.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const CONSOLE_FILTER: &str = "info";
const FILE_FILTER: &str = "info,batchdl=debug,batchdl_core=debug";
const LOG_FILE_NAME: &str = "download_log.txt";

/// Writer that is either a file or stderr (used when file clone fails).
enum FileOrStderr {
    File(fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct FileMakeWriter(fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrStderr::File)
            .unwrap_or(FileOrStderr::Stderr)
    }
}

/// Default log file: `~/.local/state/batchdl/download_log.txt`.
pub fn default_log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("batchdl")?;
    Ok(xdg_dirs.get_state_home().join(LOG_FILE_NAME))
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Open `path` for appending, creating parent directories.
fn open_append(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log dir: {}", parent.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file: {}", path.display()))
}

/// Initialize logging to stderr and to `log_file` (or the XDG default).
/// Returns the log file path. On failure (e.g. log dir unwritable), returns Err
/// so the caller can fall back to `init_logging_stderr`.
pub fn init_logging(log_file: Option<&Path>) -> Result<PathBuf> {
    let log_file_path = match log_file {
        Some(p) => p.to_path_buf(),
        None => default_log_path()?,
    };
    let file = open_append(&log_file_path)?;
    let writer: BoxMakeWriter = BoxMakeWriter::new(FileMakeWriter(file));

    let console = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(env_filter(CONSOLE_FILTER));
    let durable = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(env_filter(FILE_FILTER));

    tracing_subscriber::registry()
        .with(console)
        .with(durable)
        .try_init()
        .context("install tracing subscriber")?;

    tracing::debug!("batchdl logging initialized at {}", log_file_path.display());
    Ok(log_file_path)
}

/// Initialize logging to stderr only (no file). Use when init_logging() fails so
/// the CLI doesn't crash, and for commands that never open the log file.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(CONSOLE_FILTER))
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn open_append_creates_parents_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/run.txt");
        open_append(&path).unwrap().write_all(b"one\n").unwrap();
        open_append(&path).unwrap().write_all(b"two\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn file_make_writer_writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let mw = FileMakeWriter(open_append(&path).unwrap());
        mw.make_writer().write_all(b"line\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "line\n");
    }
}
