//! Console side of the logger: records go through a bounded channel to a
//! worker task that prints them as JSON lines.

use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::loggers::core::{ConsoleRecord, LogLevel};
use crate::loggers::worker::ConsoleWorker;

const DEFAULT_BUFFER: usize = 1024;

pub struct ConsoleConfig {
    pub level: LogLevel,
    pub component: String,
}

/// Handle onto the console stream. Cloning shares the channel and config.
#[derive(Clone)]
pub struct ConsoleLogger {
    pub sender: mpsc::Sender<ConsoleRecord>,
    pub config: Arc<ArcSwap<ConsoleConfig>>,
}

impl ConsoleLogger {
    /// Swaps the minimum level, keeping the component name.
    pub fn set_level(&self, level: LogLevel) {
        let component = self.config.load().component.clone();
        self.config.store(Arc::new(ConsoleConfig { level, component }));
    }
}

pub struct ConsoleBuilder {
    config: ConsoleConfig,
    buffer_size: usize,
}

impl ConsoleBuilder {
    /// `component` is the bot name shown on every record.
    pub fn new(component: &str) -> Self {
        Self {
            config: ConsoleConfig { level: LogLevel::Info, component: component.to_string() },
            buffer_size: DEFAULT_BUFFER,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Spawns the printing worker, so it must run inside a tokio runtime.
    pub fn build(self) -> ConsoleLogger {
        let (sender, receiver) = mpsc::channel(self.buffer_size);
        tokio::spawn(ConsoleWorker::new(receiver).run());

        ConsoleLogger {
            sender,
            config: Arc::new(ArcSwap::from_pointee(self.config)),
        }
    }
}
