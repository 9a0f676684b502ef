//! Structured RPA logging and the console stream it mirrors to.

pub mod console;
pub mod core;
pub mod file;
pub mod sampler;
pub mod structured;
pub mod table;
pub mod worker;

pub use console::{ConsoleBuilder, ConsoleLogger};
pub use core::{Coerced, LogEntry, LogLevel, LogStatus, ProcessType};
pub use structured::{DbTarget, LoggerBuilder, RpaLogger};

/// Sends one record to a [`ConsoleLogger`] if `$level` passes its filter.
/// Values are anything `Serialize`; unserializable ones become `null`.
#[macro_export]
macro_rules! log_base {
    ($logger:expr, $level:expr, $msg:expr) => {
        $crate::log_base!($logger, $level, $msg, );
    };
    ($logger:expr, $level:expr, $msg:expr, $( $k:expr => $v:expr ),* $(,)? ) => {{
        let level = $level;
        let cfg = $logger.config.load();
        if level >= cfg.level {
            #[allow(unused_mut)]
            let mut ctx = std::collections::HashMap::<String, serde_json::Value>::new();
            $( ctx.insert($k.to_string(), serde_json::to_value($v).unwrap_or(serde_json::Value::Null)); )*

            // Full channel drops the record.
            let _ = $logger.sender.try_send($crate::loggers::core::ConsoleRecord {
                ts: chrono::Utc::now(),
                level,
                msg: $msg.to_string(),
                component: cfg.component.clone(),
                ctx,
            });
        }
    }};
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, $msg:expr $(, $k:expr => $v:expr )* $(,)? ) => {
        $crate::log_base!($logger, $crate::loggers::core::LogLevel::Trace, $msg $(, $k => $v )* )
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $msg:expr $(, $k:expr => $v:expr )* $(,)? ) => {
        $crate::log_base!($logger, $crate::loggers::core::LogLevel::Debug, $msg $(, $k => $v )* )
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $msg:expr $(, $k:expr => $v:expr )* $(,)? ) => {
        $crate::log_base!($logger, $crate::loggers::core::LogLevel::Info, $msg $(, $k => $v )* )
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $msg:expr $(, $k:expr => $v:expr )* $(,)? ) => {
        $crate::log_base!($logger, $crate::loggers::core::LogLevel::Warn, $msg $(, $k => $v )* )
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $msg:expr $(, $k:expr => $v:expr )* $(,)? ) => {
        $crate::log_base!($logger, $crate::loggers::core::LogLevel::Error, $msg $(, $k => $v )* )
    };
}

#[macro_export]
macro_rules! fatal {
    ($logger:expr, $msg:expr $(, $k:expr => $v:expr )* $(,)? ) => {
        $crate::log_base!($logger, $crate::loggers::core::LogLevel::Fatal, $msg $(, $k => $v )* )
    };
}
