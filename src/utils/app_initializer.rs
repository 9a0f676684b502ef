//! # Application initializer
//!
//! [`AppContext`] wires settings, the structured logger and the connection
//! manager together. The process-wide entry points (`initialize_app`,
//! `cleanup_app`, `run_app`) memoize one context in a `OnceCell`, so
//! concurrent first calls still initialize exactly once.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::configs::Settings;
use crate::connections::{ConnectionSlot, DbManager};
use crate::core::error::RpaError;
use crate::loggers::{ProcessType, RpaLogger};

pub struct AppContext {
    settings: Arc<Settings>,
    logger: Arc<RpaLogger>,
    db: Arc<DbManager>,
}

impl AppContext {
    /// Builds the manager and its logger and attempts one connection. A
    /// failed connection only downgrades the run to file logging.
    pub async fn start(settings: Settings) -> Result<Self, RpaError> {
        let settings = Arc::new(settings);
        let db = Arc::new(DbManager::new(Arc::clone(&settings))?);
        let logger = db.logger();

        logger
            .log_info("initialize_app", "Application initialization started", ProcessType::System)
            .await;

        if db.connect().await {
            logger
                .log_success("initialize_app", "Database connection established", ProcessType::System)
                .await;
        } else {
            logger
                .log_warning("initialize_app", "Running without database connection", ProcessType::System)
                .await;
        }

        logger
            .log_success("initialize_app", "Application initialized successfully", ProcessType::System)
            .await;

        Ok(Self { settings, logger, db })
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn logger(&self) -> &Arc<RpaLogger> {
        &self.logger
    }

    pub fn db(&self) -> &Arc<DbManager> {
        &self.db
    }

    pub fn handles(&self) -> (Arc<RpaLogger>, Arc<DbManager>) {
        (Arc::clone(&self.logger), Arc::clone(&self.db))
    }

    /// Logs the shutdown, closes the connection and writes the log file's
    /// closing line.
    pub async fn shutdown(&self) {
        self.logger
            .log_info("cleanup_app", "Application shutdown initiated", ProcessType::System)
            .await;
        self.db.close().await;
        self.logger
            .log_info("cleanup_app", "Application shutdown completed", ProcessType::System)
            .await;
        self.logger.close();
    }
}

static APP: OnceCell<AppContext> = OnceCell::const_new();

/// Initializes the process-wide context from the environment, or returns the
/// existing one untouched.
pub async fn initialize_app() -> Result<(Arc<RpaLogger>, Arc<DbManager>), RpaError> {
    let ctx = APP
        .get_or_try_init(|| async { AppContext::start(Settings::load()?).await })
        .await?;
    Ok(ctx.handles())
}

/// Like [`initialize_app`] with explicit settings. Ignored once the context
/// exists.
pub async fn initialize_app_with(settings: Settings) -> Result<(Arc<RpaLogger>, Arc<DbManager>), RpaError> {
    let ctx = APP.get_or_try_init(|| AppContext::start(settings)).await?;
    Ok(ctx.handles())
}

/// Shuts the process-wide context down. Does nothing if it was never
/// initialized.
pub async fn cleanup_app() {
    if let Some(ctx) = APP.get() {
        ctx.shutdown().await;
    }
}

pub async fn get_logger() -> Result<Arc<RpaLogger>, RpaError> {
    Ok(initialize_app().await?.0)
}

pub async fn get_db_connection() -> Result<Option<Arc<ConnectionSlot>>, RpaError> {
    let (_, db) = initialize_app().await?;
    Ok(db.get_connection().await)
}

/// Runs `body` between [`initialize_app`] and [`cleanup_app`]. Cleanup runs
/// whatever `body` returns.
pub async fn run_app<F, Fut, T>(body: F) -> Result<T, RpaError>
where
    F: FnOnce(Arc<RpaLogger>, Arc<DbManager>) -> Fut,
    Fut: Future<Output = T>,
{
    let (logger, db) = initialize_app().await?;
    let out = body(logger, db).await;
    cleanup_app().await;
    Ok(out)
}
