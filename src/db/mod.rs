//! Database access shim.
//!
//! Every logical operation opens its own connection through [`Database::connect`],
//! runs one or two statements through a [`Cursor`] and closes the connection
//! again. There is no pool. Statements are written with `%s` placeholders and
//! translated for the driver by [`placeholder::translate_placeholders`].

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::sqlite::SqliteConnectOptions;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

mod error;
pub mod mysql;
pub mod placeholder;
pub mod schema;
pub mod sqlite;

pub use error::DbError;

/// A bound parameter or a decoded column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One result row, columns in select order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row(pub Vec<Value>);

impl Row {
    pub fn int(&self, index: usize) -> Result<i64, DbError> {
        match self.0.get(index) {
            Some(Value::Int(v)) => Ok(*v),
            _ => Err(DbError::Decode {
                index,
                expected: "integer",
            }),
        }
    }

    /// Text column; SQL NULL reads as `None`.
    pub fn text(&self, index: usize) -> Result<Option<String>, DbError> {
        match self.0.get(index) {
            Some(Value::Text(v)) => Ok(Some(v.clone())),
            Some(Value::Null) => Ok(None),
            _ => Err(DbError::Decode {
                index,
                expected: "text",
            }),
        }
    }
}

/// Everything a single statement produced, fully buffered.
#[derive(Debug, Default)]
pub struct QueryOutput {
    pub rows: Vec<Row>,
    pub rows_affected: u64,
    /// `None` when the driver reports no generated key.
    pub last_insert_id: Option<i64>,
}

/// Whether a statement produces a result set, judged by its leading keyword
/// or a `RETURNING` clause. Row-returning statements are fetched, the rest
/// executed for their affected count and generated id.
pub(crate) fn returns_rows(sql: &str) -> bool {
    const ROW_KEYWORDS: [&str; 6] = ["SELECT", "WITH", "PRAGMA", "SHOW", "EXPLAIN", "VALUES"];

    let upper = sql.trim_start().to_ascii_uppercase();
    let leading = upper
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    ROW_KEYWORDS.contains(&leading)
        || upper
            .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .any(|word| word == "RETURNING")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    MySql,
}

/// A live connection to one backend.
#[async_trait]
pub trait Connection: Send {
    fn backend(&self) -> Backend;

    /// Runs one statement. `sql` uses `%s` placeholders.
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryOutput, DbError>;

    /// Statements run in autocommit mode, so there is nothing left to flush.
    async fn commit(&mut self) -> Result<(), DbError> {
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), DbError>;
}

impl dyn Connection {
    pub fn cursor(&mut self) -> Cursor<'_> {
        Cursor::new(self)
    }

    /// Closes the connection, logging instead of failing. Used on exit paths
    /// where the operation's own result must win.
    pub async fn release(self: Box<Self>) {
        if let Err(e) = self.close().await {
            warn!(error = %e, "closing database connection failed");
        }
    }
}

/// DB-API style cursor over a borrowed connection.
pub struct Cursor<'c> {
    conn: &'c mut (dyn Connection + 'static),
    rows: VecDeque<Row>,
    rowcount: i64,
    lastrowid: Option<i64>,
}

impl<'c> Cursor<'c> {
    fn new(conn: &'c mut (dyn Connection + 'static)) -> Self {
        Self {
            conn,
            rows: VecDeque::new(),
            rowcount: -1,
            lastrowid: None,
        }
    }

    /// Executes `sql`, replacing any rows buffered by a previous statement.
    pub async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<(), DbError> {
        let out = self.conn.query(sql, params).await?;
        self.rowcount = if out.rows.is_empty() {
            out.rows_affected as i64
        } else {
            out.rows.len() as i64
        };
        self.lastrowid = out.last_insert_id;
        self.rows = out.rows.into();
        Ok(())
    }

    pub fn fetchone(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    pub fn fetchall(&mut self) -> Vec<Row> {
        self.rows.drain(..).collect()
    }

    /// Rows returned by the last statement, or rows it affected when it
    /// returned none. `-1` before the first execute.
    pub fn rowcount(&self) -> i64 {
        self.rowcount
    }

    pub fn lastrowid(&self) -> Option<i64> {
        self.lastrowid
    }

    pub async fn commit(&mut self) -> Result<(), DbError> {
        self.conn.commit().await
    }

    pub fn close(self) {}
}

#[derive(Debug)]
enum Target {
    Sqlite(SqliteConnectOptions),
    MySql(MySqlConnectOptions),
}

/// Connection factory. Cheap to clone; options are built once at startup.
#[derive(Debug, Clone)]
pub struct Database {
    target: Arc<Target>,
}

impl Database {
    pub fn open(config: &DatabaseConfig) -> Result<Self, DbError> {
        let target = match config {
            DatabaseConfig::Sqlite { path } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                Target::Sqlite(sqlite::connect_options(path))
            }
            DatabaseConfig::CloudSql {
                instance,
                socket_dir,
                credentials,
            } => Target::MySql(mysql::cloud_sql_options(socket_dir, instance, credentials)),
            DatabaseConfig::MySql {
                host,
                port,
                credentials,
            } => Target::MySql(mysql::tcp_options(host, *port, credentials)),
        };
        Ok(Self {
            target: Arc::new(target),
        })
    }

    pub fn backend(&self) -> Backend {
        match *self.target {
            Target::Sqlite(_) => Backend::Sqlite,
            Target::MySql(_) => Backend::MySql,
        }
    }

    pub async fn connect(&self) -> Result<Box<dyn Connection>, DbError> {
        let conn: Box<dyn Connection> = match &*self.target {
            Target::Sqlite(opts) => Box::new(sqlite::SqliteConn::connect(opts).await?),
            Target::MySql(opts) => Box::new(mysql::MySqlConn::connect(opts).await?),
        };
        debug!(backend = ?conn.backend(), "database connection opened");
        Ok(conn)
    }
}
