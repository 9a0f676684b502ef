// tests/test_db_manager.rs
use figment::providers::Serialized;
use rpa_bot_kit::RpaError;
use rpa_bot_kit::configs::{Environment, Settings};
use rpa_bot_kit::connections::{ConnectionState, DbManager};
use rpa_bot_kit::loggers::ProcessType;
use rpa_bot_kit::loggers::table;
use sqlx::Row;
use std::path::Path;
use std::sync::Arc;

fn settings(logs: &Path, pairs: &[(&str, String)]) -> Arc<Settings> {
    let mut figment = Settings::defaults(Environment::Production)
        .merge(Serialized::default("logs_folder", logs.display().to_string()));
    for (key, value) in pairs {
        figment = figment.merge(Serialized::default(key, value));
    }
    Arc::new(Settings::from_figment(Environment::Production, figment).expect("settings"))
}

fn unreachable_db(logs: &Path) -> Arc<Settings> {
    settings(
        logs,
        &[
            ("db_host", "127.0.0.1".to_string()),
            ("db_port", "1".to_string()),
            ("db_user", "bot".to_string()),
            ("db_password", "secret".to_string()),
        ],
    )
}

/// Settings for a real server, taken from `RPA_TEST_DB_*`. `None` skips the test.
fn live_db(logs: &Path) -> Option<Arc<Settings>> {
    let host = std::env::var("RPA_TEST_DB_HOST").ok()?;
    let user = std::env::var("RPA_TEST_DB_USER").ok()?;
    let password = std::env::var("RPA_TEST_DB_PASSWORD").ok()?;
    let mut pairs = vec![
        ("db_host", host),
        ("db_user", user),
        ("db_password", password),
        ("project_name", "rpa_kit_test".to_string()),
    ];
    if let Ok(port) = std::env::var("RPA_TEST_DB_PORT") {
        pairs.push(("db_port", port));
    }
    if let Ok(name) = std::env::var("RPA_TEST_DB_NAME") {
        pairs.push(("db_name", name));
    }
    Some(settings(logs, &pairs))
}

fn file_lines(manager: &DbManager) -> Vec<String> {
    std::fs::read_to_string(manager.logger().log_path())
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}

#[tokio::test]
async fn disabled_database_never_connects() {
    let dir = tempfile::tempdir().unwrap();
    let manager = DbManager::new(settings(dir.path(), &[])).unwrap();

    assert!(!manager.connect().await);
    assert_eq!(manager.physical_connections(), 0);
    assert_eq!(manager.state().await, ConnectionState::Disconnected);
    assert!(manager.get_connection().await.is_none());
    assert!(!manager.logger().has_database().await);

    let last = file_lines(&manager).pop().unwrap();
    assert!(last.contains("Database connection disabled"));
    assert!(last.ends_with("| system        | warning     |"));
}

#[tokio::test]
async fn queries_fail_cleanly_when_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let manager = DbManager::new(settings(dir.path(), &[])).unwrap();

    let result = manager.execute_query(sqlx::query("SELECT 1")).await;
    assert!(matches!(result, Err(RpaError::DatabaseDisabled)));

    let rows = manager.fetch_rows(sqlx::query("SELECT 1")).await;
    assert!(matches!(rows, Err(RpaError::DatabaseDisabled)));
}

#[tokio::test]
async fn unreachable_server_falls_back_to_file_logging() {
    let dir = tempfile::tempdir().unwrap();
    let manager = DbManager::new(unreachable_db(dir.path())).unwrap();

    assert!(!manager.connect().await);
    assert_eq!(manager.state().await, ConnectionState::Disconnected);
    assert!(file_lines(&manager)
        .iter()
        .any(|l| l.contains("Failed to connect to database") && l.contains("| failure ")));

    let logger = manager.logger();
    logger.log_critical("run", "boom", ProcessType::Robotic).await;

    let lines = file_lines(&manager);
    let n = lines.len();
    assert!(lines[n - 2].contains("| boom "));
    assert!(lines[n - 2].ends_with("| robotic       | critical    |"));
    assert_eq!(lines[n - 1], table::separator_line());

    let result = manager.execute_query(sqlx::query("SELECT 1")).await;
    assert!(matches!(result, Err(RpaError::NotConnected)));
}

#[tokio::test]
async fn close_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let manager = DbManager::new(unreachable_db(dir.path())).unwrap();

    let before = file_lines(&manager).len();
    assert!(manager.close().await);
    assert!(manager.close().await);
    assert_eq!(file_lines(&manager).len(), before);
}

#[tokio::test]
async fn live_connection_is_reused_and_logged_to_table() {
    let dir = tempfile::tempdir().unwrap();
    let Some(settings) = live_db(dir.path()) else {
        eprintln!("RPA_TEST_DB_* not set, skipping");
        return;
    };
    let manager = DbManager::new(settings).unwrap();

    assert!(manager.connect().await);
    assert!(manager.connect().await);
    assert_eq!(manager.physical_connections(), 1);
    assert_eq!(manager.state().await, ConnectionState::Connected);
    assert!(manager.logger().has_database().await);

    manager
        .logger()
        .log_success("live_test", "row for the table", ProcessType::Process)
        .await;

    let rows = manager
        .fetch_rows(
            sqlx::query(
                "SELECT log_message, process_type, status, source_file, task_name \
                 FROM rpa_kit_test.logs WHERE function_name = $1 ORDER BY id DESC",
            )
            .bind("live_test"),
        )
        .await
        .unwrap();
    assert!(!rows.is_empty());
    let row = &rows[0];
    assert_eq!(row.get::<String, _>("log_message"), "row for the table");
    assert_eq!(row.get::<String, _>("process_type"), "process");
    assert_eq!(row.get::<String, _>("status"), "success");
    assert_eq!(row.get::<String, _>("source_file"), "test_db_manager.rs");
    assert_eq!(row.get::<String, _>("task_name"), "Default Bot");

    let affected = manager
        .execute_query(sqlx::query("DELETE FROM rpa_kit_test.logs WHERE function_name = $1").bind("live_test"))
        .await
        .unwrap();
    assert!(affected >= 1);

    assert!(manager.close().await);
    assert_eq!(manager.state().await, ConnectionState::Disconnected);
    assert!(manager.close().await);
}

#[tokio::test]
async fn terminated_backend_empties_the_slot() {
    use sqlx::Connection;

    let dir = tempfile::tempdir().unwrap();
    let Some(settings) = live_db(dir.path()) else {
        eprintln!("RPA_TEST_DB_* not set, skipping");
        return;
    };
    let url = settings.database.connection_string().unwrap();
    let manager = DbManager::new(settings).unwrap();
    assert!(manager.connect().await);
    // Only the manager's own error handling may reset the slot here.
    manager.logger().disconnect_db();

    let rows = manager.fetch_rows(sqlx::query("SELECT pg_backend_pid()")).await.unwrap();
    let pid: i32 = rows[0].get(0);

    let mut admin = sqlx::PgConnection::connect(&url).await.unwrap();
    sqlx::query("SELECT pg_terminate_backend($1)")
        .bind(pid)
        .execute(&mut admin)
        .await
        .unwrap();
    admin.close().await.unwrap();

    let result = manager.execute_query(sqlx::query("SELECT 1")).await;
    assert!(matches!(result, Err(RpaError::DatabaseError(_))));
    assert_eq!(manager.state().await, ConnectionState::Disconnected);

    assert!(manager.connect().await);
    assert_eq!(manager.physical_connections(), 2);
    assert!(manager.close().await);
}
