//! # Database connection manager
//!
//! Owns the one PostgreSQL connection of the process and the structured
//! logger bound to it. The connection is opened lazily, probed before reuse
//! and dropped on any connection-level failure; callers get a boolean or a
//! `Result` and decide themselves whether to call [`DbManager::connect`]
//! again.

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Connection, PgConnection, Postgres};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::configs::Settings;
use crate::connections::{ConnectionSlot, is_connection_error, schema};
use crate::core::error::RpaError;
use crate::loggers::{LoggerBuilder, ProcessType, RpaLogger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

enum Probe {
    Empty,
    Alive,
    Lost(String),
}

pub struct DbManager {
    settings: Arc<Settings>,
    logger: Arc<RpaLogger>,
    slot: Arc<ConnectionSlot>,
    opened: AtomicUsize,
}

impl DbManager {
    /// Builds the structured logger from `settings`; fails only when the log
    /// directory cannot be created. No connection is opened here.
    pub fn new(settings: Arc<Settings>) -> Result<Self, RpaError> {
        let logger = LoggerBuilder::new(&settings.project.name)
            .with_bot_name(&settings.bot_name)
            .with_log_dir(settings.logs_folder())
            .with_debug_mode(settings.processing.debug_mode)
            .build()?;
        Ok(Self::with_logger(settings, Arc::new(logger)))
    }

    pub fn with_logger(settings: Arc<Settings>, logger: Arc<RpaLogger>) -> Self {
        Self {
            settings,
            logger,
            slot: Arc::new(ConnectionSlot::new()),
            opened: AtomicUsize::new(0),
        }
    }

    pub fn logger(&self) -> Arc<RpaLogger> {
        Arc::clone(&self.logger)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn state(&self) -> ConnectionState {
        if self.slot.is_connected().await {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Number of physical connections opened so far.
    pub fn physical_connections(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Ensures a live connection: reuses the current one if it answers a
    /// ping, otherwise opens a new one and binds the logger's table to it.
    pub async fn connect(&self) -> bool {
        let logger = &self.logger;

        match self.probe().await {
            Probe::Alive => {
                logger
                    .log_info("db_connect", "Using existing database connection", ProcessType::System)
                    .await;
                return true;
            }
            Probe::Lost(reason) => {
                let msg = format!("Database connection lost, reconnecting: {reason}");
                logger.log_warning("db_connect", &msg, ProcessType::System).await;
            }
            Probe::Empty => {}
        }

        let db = &self.settings.database;
        let Some(url) = db.connection_string() else {
            logger
                .log_warning("db_connect", "Database connection disabled in settings", ProcessType::System)
                .await;
            return false;
        };

        if self.settings.processing.debug_mode {
            let msg = format!(
                "Connecting to database {}:{}/{} as user {}",
                db.host, db.port, db.database, db.user
            );
            logger.log_info("db_connect", &msg, ProcessType::System).await;
        }

        let version = match self.open(&url).await {
            Ok(version) => version,
            Err(e) => {
                let msg = format!("Failed to connect to database: {e}");
                logger.log_error("db_connect", &msg, ProcessType::System).await;
                return false;
            }
        };

        let msg = format!("Connected to database: {version}");
        logger.log_success("db_connect", &msg, ProcessType::System).await;

        if !db.schema.is_empty() {
            match self.create_schema(&db.schema).await {
                Ok(()) => {
                    let msg = format!("Schema '{}' verified", db.schema);
                    logger.log_success("db_connect", &msg, ProcessType::System).await;
                }
                Err(e) => {
                    let msg = format!("Failed to create schema '{}': {e}", db.schema);
                    logger.log_error("db_connect", &msg, ProcessType::System).await;
                }
            }
        }

        if !logger.connect_to_db(Arc::clone(&self.slot)).await {
            logger
                .log_warning("db_connect", "Log table unavailable, logging to file only", ProcessType::System)
                .await;
        }

        self.slot.is_connected().await
    }

    /// The managed slot, connecting first if it is empty. `None` when no
    /// connection could be established.
    pub async fn get_connection(&self) -> Option<Arc<ConnectionSlot>> {
        if !self.slot.is_connected().await {
            self.connect().await;
        }
        if self.slot.is_connected().await {
            Some(Arc::clone(&self.slot))
        } else {
            None
        }
    }

    /// Runs a statement and returns the number of affected rows.
    pub async fn execute_query<'q>(&self, query: Query<'q, Postgres, PgArguments>) -> Result<u64, RpaError> {
        self.ensure_connected().await?;

        let result = {
            let mut guard = self.slot.lock().await;
            let Some(conn) = guard.as_mut() else {
                return Err(RpaError::NotConnected);
            };
            let result = query.execute(&mut *conn).await;
            if let Err(e) = &result {
                if is_connection_error(e) {
                    *guard = None;
                }
            }
            result
        };

        match result {
            Ok(done) => Ok(done.rows_affected()),
            Err(e) => Err(self.query_failed(e).await),
        }
    }

    /// Runs a query and returns all rows.
    pub async fn fetch_rows<'q>(&self, query: Query<'q, Postgres, PgArguments>) -> Result<Vec<PgRow>, RpaError> {
        self.ensure_connected().await?;

        let result = {
            let mut guard = self.slot.lock().await;
            let Some(conn) = guard.as_mut() else {
                return Err(RpaError::NotConnected);
            };
            let result = query.fetch_all(&mut *conn).await;
            if let Err(e) = &result {
                if is_connection_error(e) {
                    *guard = None;
                }
            }
            result
        };

        match result {
            Ok(rows) => Ok(rows),
            Err(e) => Err(self.query_failed(e).await),
        }
    }

    /// Closes and clears the connection. Returns true when there was nothing
    /// to close.
    pub async fn close(&self) -> bool {
        let conn = self.slot.lock().await.take();
        let Some(conn) = conn else {
            return true;
        };

        match conn.close().await {
            Ok(()) => {
                self.logger
                    .log_info("db_close", "Database connection closed", ProcessType::System)
                    .await;
                true
            }
            Err(e) => {
                let msg = format!("Error closing database connection: {e}");
                self.logger.log_error("db_close", &msg, ProcessType::System).await;
                false
            }
        }
    }

    async fn probe(&self) -> Probe {
        let mut guard = self.slot.lock().await;
        let Some(conn) = guard.as_mut() else {
            return Probe::Empty;
        };
        match conn.ping().await {
            Ok(()) => Probe::Alive,
            Err(e) => {
                *guard = None;
                Probe::Lost(e.to_string())
            }
        }
    }

    async fn open(&self, url: &str) -> Result<String, RpaError> {
        let mut conn = PgConnection::connect(url)
            .await
            .map_err(|e| RpaError::DatabaseError(e.to_string()))?;
        self.opened.fetch_add(1, Ordering::SeqCst);

        let version: String = sqlx::query_scalar::<Postgres, String>("SELECT version()")
            .fetch_one(&mut conn)
            .await
            .map_err(|e| RpaError::DatabaseError(e.to_string()))?;

        *self.slot.lock().await = Some(conn);
        Ok(version)
    }

    async fn create_schema(&self, name: &str) -> Result<(), RpaError> {
        let mut guard = self.slot.lock().await;
        let conn = guard.as_mut().ok_or(RpaError::NotConnected)?;
        schema::create_schema(conn, name)
            .await
            .map_err(|e| RpaError::DatabaseError(e.to_string()))
    }

    async fn ensure_connected(&self) -> Result<(), RpaError> {
        if self.slot.is_connected().await || self.connect().await {
            Ok(())
        } else if !self.settings.database.enabled {
            Err(RpaError::DatabaseDisabled)
        } else {
            Err(RpaError::NotConnected)
        }
    }

    async fn query_failed(&self, e: sqlx::Error) -> RpaError {
        let msg = format!("Query failed: {e}");
        self.logger.log_error("execute_query", &msg, ProcessType::System).await;
        RpaError::DatabaseError(e.to_string())
    }
}
