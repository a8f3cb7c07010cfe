//! Log output routing.
//!
//! The TUI owns the terminal (raw mode, alternate screen), so while it runs
//! log lines go to a file under the state directory. Headless runs keep
//! stderr.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "moodring.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Where logs go while the TUI is on screen
    pub fn for_tui() -> Self {
        match dirs::state_dir().or_else(dirs::cache_dir) {
            Some(dir) => LogTarget::File(dir.join("moodring")),
            None => LogTarget::File(std::env::temp_dir().join("moodring")),
        }
    }
}

/// Open (append) the log file inside `dir`, creating the directory if needed
pub fn open_log_file(dir: &Path) -> io::Result<File> {
    std::fs::create_dir_all(dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
}

/// Build the writer for a target. A file that can't be opened discards output.
pub fn make_writer(target: &LogTarget) -> BoxMakeWriter {
    match target {
        LogTarget::Stderr => BoxMakeWriter::new(io::stderr),
        LogTarget::File(dir) => match open_log_file(dir) {
            Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
            Err(_) => BoxMakeWriter::new(io::sink),
        },
    }
}

/// Install the global subscriber, filtered by `RUST_LOG`
pub fn init(target: &LogTarget) {
    let ansi = *target == LogTarget::Stderr;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(make_writer(target))
                .with_ansi(ansi),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("moodring-log-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_tui_target_is_a_file() {
        assert!(matches!(LogTarget::for_tui(), LogTarget::File(_)));
    }

    #[test]
    fn test_file_writer_appends_to_log() {
        let dir = scratch_dir("append");
        let _ = std::fs::remove_dir_all(&dir);

        let writer = make_writer(&LogTarget::File(dir.clone()));
        writer.make_writer().write_all(b"first\n").unwrap();
        writer.make_writer().write_all(b"second\n").unwrap();

        let content = std::fs::read_to_string(dir.join(LOG_FILE)).unwrap();
        assert_eq!(content, "first\nsecond\n");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_subscriber_output_lands_in_file() {
        let dir = scratch_dir("subscriber");
        let _ = std::fs::remove_dir_all(&dir);

        let subscriber = tracing_subscriber::fmt()
            .with_writer(make_writer(&LogTarget::File(dir.clone())))
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("Error analyzing sentiment: connection refused");
        });

        let content = std::fs::read_to_string(dir.join(LOG_FILE)).unwrap();
        assert!(content.contains("Error analyzing sentiment: connection refused"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
