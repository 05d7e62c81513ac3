//! Logging
//!
//! Every event goes to the console and, when a [`LogSink`] is installed, is
//! appended to a log file as a timestamped `LEVEL target: message` line.
//!
//! The sink can be closed independently of the subscriber. After
//! [`LogSink::close`] the file is released and further events only reach
//! the console.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::{KvError, Result};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,dualkv=debug";

/// Append-mode log file shared by every writer handed to the subscriber
#[derive(Debug, Clone)]
pub struct LogSink {
    file: Arc<Mutex<Option<File>>>,
    path: PathBuf,
}

impl LogSink {
    /// Open (or create) `path` for appending
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(Some(file))),
            path,
        })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and release the file. Safe to call more than once.
    pub fn close(&self) {
        if let Some(mut file) = self.file.lock().take() {
            if let Err(e) = file.flush() {
                eprintln!("Failed to close log file {}: {}", self.path.display(), e);
            }
        }
    }

    /// Check if the file has been released
    pub fn is_closed(&self) -> bool {
        self.file.lock().is_none()
    }
}

/// Writer for a single formatted event
pub struct LogSinkWriter {
    file: Arc<Mutex<Option<File>>>,
}

impl Write for LogSinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.lock().as_mut() {
            Some(file) => {
                file.write_all(buf)?;
                Ok(buf.len())
            }
            // Closed: drop the bytes, the console layer still has them
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogSinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogSinkWriter {
            file: Arc::clone(&self.file),
        }
    }
}

/// Install the global subscriber: console output plus the optional file sink
pub fn init(sink: Option<LogSink>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console = fmt::layer().with_target(true).with_thread_ids(true);
    let file = sink.map(|sink| fmt::layer().with_ansi(false).with_target(true).with_writer(sink));

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| KvError::Logging(e.to_string()))
}
