use sqlx::PgConnection;
use tokio::sync::{Mutex, MutexGuard};

pub mod manager;
pub mod schema;

pub use manager::{ConnectionState, DbManager};

/// Holder of at most one live PostgreSQL connection.
///
/// The connection manager owns the slot and fills or empties it; the
/// structured logger keeps a clone of the `Arc` and uses whatever connection
/// is currently inside. Never hold the guard across a logging call.
#[derive(Default)]
pub struct ConnectionSlot {
    inner: Mutex<Option<PgConnection>>,
}

impl ConnectionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connection(conn: PgConnection) -> Self {
        Self { inner: Mutex::new(Some(conn)) }
    }

    pub async fn lock(&self) -> MutexGuard<'_, Option<PgConnection>> {
        self.inner.lock().await
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.is_some()
    }
}

/// Errors after which the connection cannot be trusted any more. Besides
/// transport failures this covers server-side errors in SQLSTATE classes
/// `08` (connection exception) and `57P` (operator intervention, e.g. a
/// terminated backend).
pub fn is_connection_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolClosed
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => db.code().is_some_and(|code| is_connection_sqlstate(&code)),
        _ => false,
    }
}

pub fn is_connection_sqlstate(code: &str) -> bool {
    code.starts_with("08") || code.starts_with("57P")
}
