use serde::{Deserialize, Serialize};
use serde_json::Value;
use chrono::{DateTime, Local, Utc};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use crate::core::error::RpaError;

/// Console stream level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace, Debug, Info, Warn, Error, Fatal,
}

/// One line on the console stream.
#[derive(Debug, Serialize)]
pub struct ConsoleRecord {
    pub ts: DateTime<Utc>,
    pub level: LogLevel,
    pub msg: String,
    pub component: String,
    pub ctx: HashMap<String, Value>,
}

/// Origin layer of a structured log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessType {
    Robotic,
    Business,
    System,
    Process,
}

/// Outcome classification of a structured log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Information,
    Success,
    Warning,
    Failure,
    Critical,
}

/// Result of reading an enum from free text: either the input named a
/// variant, or it did not and the fallback was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerced<T> {
    Known(T),
    Defaulted(T),
}

impl<T: Copy> Coerced<T> {
    pub fn value(self) -> T {
        match self {
            Coerced::Known(v) | Coerced::Defaulted(v) => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Coerced::Defaulted(_))
    }
}

impl ProcessType {
    pub const ALL: [ProcessType; 4] = [
        ProcessType::Robotic,
        ProcessType::Business,
        ProcessType::System,
        ProcessType::Process,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::Robotic => "robotic",
            ProcessType::Business => "business",
            ProcessType::System => "system",
            ProcessType::Process => "process",
        }
    }

    /// Case-insensitive; anything else becomes `System`.
    pub fn coerce(input: &str) -> Coerced<Self> {
        match input.parse() {
            Ok(v) => Coerced::Known(v),
            Err(_) => Coerced::Defaulted(ProcessType::System),
        }
    }
}

impl LogStatus {
    pub const ALL: [LogStatus; 5] = [
        LogStatus::Information,
        LogStatus::Success,
        LogStatus::Warning,
        LogStatus::Failure,
        LogStatus::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Information => "information",
            LogStatus::Success => "success",
            LogStatus::Warning => "warning",
            LogStatus::Failure => "failure",
            LogStatus::Critical => "critical",
        }
    }

    /// Case-insensitive; anything else becomes `Information`.
    pub fn coerce(input: &str) -> Coerced<Self> {
        match input.parse() {
            Ok(v) => Coerced::Known(v),
            Err(_) => Coerced::Defaulted(LogStatus::Information),
        }
    }

    /// Console severity for this status.
    pub fn console_level(&self) -> LogLevel {
        match self {
            LogStatus::Critical => LogLevel::Fatal,
            LogStatus::Failure => LogLevel::Error,
            LogStatus::Warning => LogLevel::Warn,
            LogStatus::Information | LogStatus::Success => LogLevel::Info,
        }
    }
}

impl FromStr for ProcessType {
    type Err = RpaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| RpaError::InternalError(format!("unknown process type '{s}'")))
    }
}

impl FromStr for LogStatus {
    type Err = RpaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| RpaError::InternalError(format!("unknown log status '{s}'")))
    }
}

impl From<&str> for ProcessType {
    fn from(value: &str) -> Self {
        ProcessType::coerce(value).value()
    }
}

impl From<&str> for LogStatus {
    fn from(value: &str) -> Self {
        LogStatus::coerce(value).value()
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU and memory utilization at the time of a log call, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Usage {
    pub cpu: f32,
    pub memory: f32,
}

/// One structured audit entry, as written to the file and the log table.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub task_name: String,
    pub function_name: String,
    pub source_file: String,
    pub cpu_usage: f32,
    pub memory_usage: f32,
    pub message: String,
    pub process_type: ProcessType,
    pub status: LogStatus,
}
