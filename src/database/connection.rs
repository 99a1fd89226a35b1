use crate::config::DatabaseConfig;
use crate::error::AppResult;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, FromQueryResult,
    Statement, Value,
};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(false);

    let pool = Database::connect(options).await?;
    log::info!(
        "Database pool ready (max_connections={})",
        config.max_connections
    );
    Ok(pool)
}

/// Builds a statement for the connection's backend from a catalog query.
pub fn statement<C: ConnectionTrait>(conn: &C, sql: &str, params: Vec<Value>) -> Statement {
    Statement::from_sql_and_values(conn.get_database_backend(), sql, params)
}

pub async fn fetch_one<T, C>(conn: &C, sql: &str, params: Vec<Value>) -> Result<Option<T>, DbErr>
where
    T: FromQueryResult,
    C: ConnectionTrait,
{
    T::find_by_statement(statement(conn, sql, params))
        .one(conn)
        .await
}

pub async fn fetch_all<T, C>(conn: &C, sql: &str, params: Vec<Value>) -> Result<Vec<T>, DbErr>
where
    T: FromQueryResult,
    C: ConnectionTrait,
{
    T::find_by_statement(statement(conn, sql, params))
        .all(conn)
        .await
}

/// Runs a write and returns the number of affected rows.
pub async fn execute<C: ConnectionTrait>(
    conn: &C,
    sql: &str,
    params: Vec<Value>,
) -> Result<u64, DbErr> {
    let result = conn.execute(statement(conn, sql, params)).await?;
    Ok(result.rows_affected())
}
