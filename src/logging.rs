//! Optional log sink. The terminal is in raw mode while playing, so records go to a file.

use log::{LevelFilter, Log, Metadata, Record};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use thiserror::Error;

/// Writes one line per record: seconds since start, level, target, message.
pub struct FileLogger<W: Write + Send> {
    out: Mutex<W>,
    level: LevelFilter,
    started: Instant,
}

impl<W: Write + Send> FileLogger<W> {
    pub fn new(out: W, level: LevelFilter) -> Self {
        Self {
            out: Mutex::new(out),
            level,
            started: Instant::now(),
        }
    }
}

impl<W: Write + Send> Log for FileLogger<W> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let _ = writeln!(
            out,
            "{:>9.3} {:<5} {}: {}",
            self.started.elapsed().as_secs_f32(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        if let Ok(mut out) = self.out.lock() {
            let _ = out.flush();
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file: {0}")]
    Open(#[from] io::Error),
    #[error("a logger is already installed")]
    AlreadySet(#[from] log::SetLoggerError),
}

/// Truncate `path` and route every record at or above `level` into it.
pub fn init_file(path: &Path, level: LevelFilter) -> Result<(), LoggingError> {
    let file = File::create(path)?;
    log::set_boxed_logger(Box::new(FileLogger::new(io::LineWriter::new(file), level)))?;
    log::set_max_level(level);
    Ok(())
}
