use tokio::sync::mpsc;
use crate::loggers::core::ConsoleRecord;

/// Drains the console channel, one JSON line per record on stdout.
pub struct ConsoleWorker {
    receiver: mpsc::Receiver<ConsoleRecord>,
}

impl ConsoleWorker {
    pub fn new(receiver: mpsc::Receiver<ConsoleRecord>) -> Self {
        Self { receiver }
    }

    pub async fn run(mut self) {
        while let Some(record) = self.receiver.recv().await {
            if let Ok(json) = serde_json::to_string(&record) {
                println!("{}", json);
            }
        }
    }
}
