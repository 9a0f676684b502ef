//! SQL for the per-project log table.

use sqlx::PgConnection;
use crate::loggers::core::LogEntry;

/// Double-quotes an identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn create_schema_sql(schema: &str) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema))
}

pub fn create_log_table_sql(schema: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {}.logs (
            id SERIAL PRIMARY KEY,
            task_name VARCHAR(255),
            function_name VARCHAR(255),
            source_file VARCHAR(255),
            cpu_usage FLOAT,
            memory_usage FLOAT,
            log_date DATE,
            log_time TIME,
            log_message TEXT,
            process_type VARCHAR(50),
            status VARCHAR(50),
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        quote_ident(schema)
    )
}

pub fn insert_log_sql(schema: &str) -> String {
    format!(
        "INSERT INTO {}.logs
            (task_name, function_name, source_file, cpu_usage, memory_usage,
             log_date, log_time, log_message, process_type, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        quote_ident(schema)
    )
}

pub async fn create_schema(conn: &mut PgConnection, schema: &str) -> Result<(), sqlx::Error> {
    sqlx::query(&create_schema_sql(schema)).execute(&mut *conn).await?;
    Ok(())
}

/// Schema plus `logs` table, both `IF NOT EXISTS`.
pub async fn ensure_log_table(conn: &mut PgConnection, schema: &str) -> Result<(), sqlx::Error> {
    create_schema(conn, schema).await?;
    sqlx::query(&create_log_table_sql(schema)).execute(&mut *conn).await?;
    Ok(())
}

pub async fn insert_entry(conn: &mut PgConnection, schema: &str, entry: &LogEntry) -> Result<(), sqlx::Error> {
    let sql = insert_log_sql(schema);
    sqlx::query(&sql)
        .bind(entry.task_name.as_str())
        .bind(entry.function_name.as_str())
        .bind(entry.source_file.as_str())
        .bind(f64::from(entry.cpu_usage))
        .bind(f64::from(entry.memory_usage))
        .bind(entry.timestamp.date_naive())
        .bind(entry.timestamp.time())
        .bind(entry.message.as_str())
        .bind(entry.process_type.as_str())
        .bind(entry.status.as_str())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("rpa_automation"), "\"rpa_automation\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn statements_are_schema_qualified() {
        assert_eq!(create_schema_sql("bot"), "CREATE SCHEMA IF NOT EXISTS \"bot\"");
        assert!(create_log_table_sql("bot").starts_with("CREATE TABLE IF NOT EXISTS \"bot\".logs"));
        assert!(create_log_table_sql("bot").contains("id SERIAL PRIMARY KEY"));
        let insert = insert_log_sql("bot");
        assert!(insert.starts_with("INSERT INTO \"bot\".logs"));
        assert!(insert.contains("$10"));
    }
}
