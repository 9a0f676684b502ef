use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use crate::core::error::RpaError;
use crate::loggers::core::LogEntry;
use crate::loggers::table;

/// Append-only log file of one run: `rpa_{project}_{YYYYmmdd_HHMMSS}.log`.
///
/// The closing separator is written once, by [`LogFile::close`] or on drop.
pub struct LogFile {
    path: PathBuf,
    closed: AtomicBool,
}

impl LogFile {
    /// Creates `dir` if needed and picks a file name that is not taken yet.
    /// Failing to create the directory is the only error.
    pub fn create(dir: &Path, project_name: &str) -> Result<Self, RpaError> {
        fs::create_dir_all(dir).map_err(|e| RpaError::LogDirectoryError {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let mut path = dir.join(format!("rpa_{project_name}_{stamp}.log"));
        let mut n = 1;
        while path.exists() {
            path = dir.join(format!("rpa_{project_name}_{stamp}_{n}.log"));
            n += 1;
        }

        Ok(Self { path, closed: AtomicBool::new(false) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_header(&self) -> io::Result<()> {
        self.append_lines(&table::header_lines())
    }

    pub fn append(&self, entry: &LogEntry) -> io::Result<()> {
        self.append_lines(&table::entry_lines(entry))
    }

    /// Appends the closing separator. Later calls do nothing.
    pub fn close(&self) -> io::Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if !self.path.exists() {
            return Ok(());
        }
        self.append_lines(&[table::separator_line()])
    }

    fn append_lines(&self, lines: &[String]) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut buf = String::new();
        for line in lines {
            buf.push_str(line);
            buf.push('\n');
        }
        file.write_all(buf.as_bytes())
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
