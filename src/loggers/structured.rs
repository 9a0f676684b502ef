//! # Structured RPA logger
//!
//! Every entry is appended to the run's fixed-width log file, mirrored on the
//! console stream, and inserted into `{project}.logs` when a database is
//! bound. Only construction can fail; every logging call swallows its own
//! errors so a broken disk or database never takes the bot down.

use arc_swap::{ArcSwap, ArcSwapOption};
use chrono::{Local, Timelike};
use sqlx::{Connection, PgConnection};
use std::future::Future;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::connections::{ConnectionSlot, is_connection_error, schema};
use crate::core::error::RpaError;
use crate::loggers::console::{ConsoleBuilder, ConsoleLogger};
use crate::loggers::core::{LogEntry, LogLevel, LogStatus, ProcessType};
use crate::loggers::file::LogFile;
use crate::loggers::sampler::SystemSampler;
use crate::{error, log_base, warn};

/// Source identity used when no caller file can be determined.
pub const UNKNOWN_SOURCE: &str = "unknown";

pub const DEFAULT_BOT_NAME: &str = "Default Bot";

pub struct LoggerConfig {
    pub bot_name: String,
    pub debug_mode: bool,
}

/// What [`RpaLogger::connect_to_db`] binds to.
pub enum DbTarget {
    /// A slot owned by the connection manager.
    Shared(Arc<ConnectionSlot>),
    /// Open a dedicated connection from a connection string.
    Url(String),
}

impl From<Arc<ConnectionSlot>> for DbTarget {
    fn from(slot: Arc<ConnectionSlot>) -> Self {
        DbTarget::Shared(slot)
    }
}

impl From<String> for DbTarget {
    fn from(url: String) -> Self {
        DbTarget::Url(url)
    }
}

impl From<&str> for DbTarget {
    fn from(url: &str) -> Self {
        DbTarget::Url(url.to_string())
    }
}

struct LogTable {
    slot: Arc<ConnectionSlot>,
    schema: String,
}

pub struct RpaLogger {
    project_name: String,
    config: ArcSwap<LoggerConfig>,
    console: ConsoleLogger,
    file: LogFile,
    sampler: SystemSampler,
    table: ArcSwapOption<LogTable>,
}

pub struct LoggerBuilder {
    project_name: String,
    bot_name: String,
    log_dir: PathBuf,
    debug_mode: bool,
}

impl LoggerBuilder {
    pub fn new(project_name: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            bot_name: DEFAULT_BOT_NAME.to_string(),
            log_dir: PathBuf::from("logs"),
            debug_mode: false,
        }
    }

    pub fn with_bot_name(mut self, bot_name: &str) -> Self {
        self.bot_name = bot_name.to_string();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Creates the log directory and file and writes the header. Must run
    /// inside a tokio runtime (the console worker is spawned here).
    pub fn build(self) -> Result<RpaLogger, RpaError> {
        let console = ConsoleBuilder::new(&self.bot_name)
            .with_level(level_for(self.debug_mode))
            .build();

        let file = LogFile::create(&self.log_dir, &self.project_name)?;
        if let Err(e) = file.write_header() {
            warn!(console, "Failed to write log file header",
                "path" => file.path().display().to_string(), "error" => e.to_string());
        }

        Ok(RpaLogger {
            project_name: self.project_name,
            config: ArcSwap::from_pointee(LoggerConfig {
                bot_name: self.bot_name,
                debug_mode: self.debug_mode,
            }),
            console,
            file,
            sampler: SystemSampler::new(),
            table: ArcSwapOption::empty(),
        })
    }
}

fn level_for(debug_mode: bool) -> LogLevel {
    if debug_mode { LogLevel::Debug } else { LogLevel::Info }
}

impl RpaLogger {
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn log_path(&self) -> &Path {
        self.file.path()
    }

    pub fn console(&self) -> &ConsoleLogger {
        &self.console
    }

    pub fn bot_name(&self) -> String {
        self.config.load().bot_name.clone()
    }

    pub fn debug_mode(&self) -> bool {
        self.config.load().debug_mode
    }

    pub fn set_debug_mode(&self, debug_mode: bool) {
        let bot_name = self.bot_name();
        self.config.store(Arc::new(LoggerConfig { bot_name, debug_mode }));
        self.console.set_level(level_for(debug_mode));
    }

    /// True while a log table is bound and its connection slot is filled.
    pub async fn has_database(&self) -> bool {
        match self.table.load_full() {
            Some(table) => table.slot.is_connected().await,
            None => false,
        }
    }

    /// Binds the log table to a connection, creating `{project}` schema and
    /// `{project}.logs` when missing. Returns false (and keeps logging to the
    /// file only) on any database failure.
    pub async fn connect_to_db(&self, target: impl Into<DbTarget>) -> bool {
        let slot = match target.into() {
            DbTarget::Shared(slot) => slot,
            DbTarget::Url(url) => match PgConnection::connect(&url).await {
                Ok(conn) => Arc::new(ConnectionSlot::with_connection(conn)),
                Err(e) => {
                    error!(self.console, "Failed to connect to database", "error" => e.to_string());
                    return false;
                }
            },
        };

        let created = {
            let mut guard = slot.lock().await;
            match guard.as_mut() {
                Some(conn) => {
                    let result = schema::ensure_log_table(conn, &self.project_name).await;
                    if let Err(e) = &result {
                        if is_connection_error(e) {
                            *guard = None;
                        }
                    }
                    result.map_err(|e| e.to_string())
                }
                None => Err("connection slot is empty".to_string()),
            }
        };

        match created {
            Ok(()) => {
                self.table.store(Some(Arc::new(LogTable {
                    slot,
                    schema: self.project_name.clone(),
                })));
                true
            }
            Err(e) => {
                error!(self.console, "Failed to create log table", "error" => e);
                false
            }
        }
    }

    /// Drops the log table binding. The connection itself is left alone.
    pub fn disconnect_db(&self) {
        self.table.store(None);
    }

    /// Records one entry and returns it. The caller's source file is taken
    /// from the call site.
    #[track_caller]
    pub fn log_entry<'a>(
        &'a self,
        function_name: &'a str,
        message: &'a str,
        process_type: impl Into<ProcessType>,
        status: impl Into<LogStatus>,
        task_name: Option<&'a str>,
    ) -> impl Future<Output = LogEntry> {
        let source = Location::caller().file();
        let process_type = process_type.into();
        let status = status.into();
        self.write_entry(source, function_name, message, process_type, status, task_name)
    }

    /// Same as [`RpaLogger::log_entry`] with an explicit source file.
    pub async fn log_entry_from(
        &self,
        source_file: &str,
        function_name: &str,
        message: &str,
        process_type: impl Into<ProcessType>,
        status: impl Into<LogStatus>,
        task_name: Option<&str>,
    ) -> LogEntry {
        self.write_entry(source_file, function_name, message, process_type.into(), status.into(), task_name)
            .await
    }

    #[track_caller]
    pub fn log_info<'a>(&'a self, function_name: &'a str, message: &'a str, process_type: impl Into<ProcessType>) -> impl Future<Output = ()> {
        self.log_with_status(Location::caller(), function_name, message, process_type.into(), LogStatus::Information)
    }

    #[track_caller]
    pub fn log_success<'a>(&'a self, function_name: &'a str, message: &'a str, process_type: impl Into<ProcessType>) -> impl Future<Output = ()> {
        self.log_with_status(Location::caller(), function_name, message, process_type.into(), LogStatus::Success)
    }

    #[track_caller]
    pub fn log_warning<'a>(&'a self, function_name: &'a str, message: &'a str, process_type: impl Into<ProcessType>) -> impl Future<Output = ()> {
        self.log_with_status(Location::caller(), function_name, message, process_type.into(), LogStatus::Warning)
    }

    /// Status `failure`.
    #[track_caller]
    pub fn log_error<'a>(&'a self, function_name: &'a str, message: &'a str, process_type: impl Into<ProcessType>) -> impl Future<Output = ()> {
        self.log_with_status(Location::caller(), function_name, message, process_type.into(), LogStatus::Failure)
    }

    #[track_caller]
    pub fn log_critical<'a>(&'a self, function_name: &'a str, message: &'a str, process_type: impl Into<ProcessType>) -> impl Future<Output = ()> {
        self.log_with_status(Location::caller(), function_name, message, process_type.into(), LogStatus::Critical)
    }

    /// Writes the closing separator. Safe to call more than once.
    pub fn close(&self) {
        if let Err(e) = self.file.close() {
            warn!(self.console, "Failed to write closing line", "error" => e.to_string());
        }
    }

    async fn log_with_status(
        &self,
        location: &'static Location<'static>,
        function_name: &str,
        message: &str,
        process_type: ProcessType,
        status: LogStatus,
    ) {
        self.write_entry(location.file(), function_name, message, process_type, status, None)
            .await;
    }

    async fn write_entry(
        &self,
        source_file: &str,
        function_name: &str,
        message: &str,
        process_type: ProcessType,
        status: LogStatus,
        task_name: Option<&str>,
    ) -> LogEntry {
        let usage = self.sampler.sample();
        let now = Local::now();
        let timestamp = now.with_nanosecond(0).unwrap_or(now);

        let entry = LogEntry {
            timestamp,
            task_name: task_name.map_or_else(|| self.bot_name(), str::to_string),
            function_name: function_name.to_string(),
            source_file: source_name(source_file),
            cpu_usage: usage.cpu,
            memory_usage: usage.memory,
            message: message.to_string(),
            process_type,
            status,
        };

        if let Err(e) = self.file.append(&entry) {
            error!(self.console, "Failed to write log file",
                "path" => self.file.path().display().to_string(), "error" => e.to_string());
        }

        self.mirror_to_console(&entry);
        self.mirror_to_database(&entry).await;
        entry
    }

    fn mirror_to_console(&self, entry: &LogEntry) {
        let msg = format!("{} - {}: {}", entry.task_name, entry.function_name, entry.message);
        log_base!(self.console, entry.status.console_level(), msg,
            "process_type" => entry.process_type.as_str(),
            "status" => entry.status.as_str(),
            "source_file" => entry.source_file.as_str(),
            "cpu_usage" => entry.cpu_usage,
            "memory_usage" => entry.memory_usage,
        );
    }

    async fn mirror_to_database(&self, entry: &LogEntry) {
        let Some(table) = self.table.load_full() else {
            return;
        };

        let failure = {
            let mut guard = table.slot.lock().await;
            let Some(conn) = guard.as_mut() else {
                return;
            };
            match schema::insert_entry(conn, &table.schema, entry).await {
                Ok(()) => None,
                Err(e) => {
                    if is_connection_error(&e) {
                        *guard = None;
                    }
                    Some(e.to_string())
                }
            }
        };

        if let Some(e) = failure {
            error!(self.console, "Failed to log to database", "error" => e);
        }
    }
}

impl Drop for RpaLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// File name component of a source path (`src/bots/main.rs` → `main.rs`).
pub fn source_name(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or_default();
    if name.is_empty() {
        UNKNOWN_SOURCE.to_string()
    } else {
        name.to_string()
    }
}
