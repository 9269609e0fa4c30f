use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Row as _};

use super::placeholder::translate_placeholders;
use super::{returns_rows, Backend, Connection, DbError, QueryOutput, Row, Value};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

pub fn connect_options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
}

pub struct SqliteConn {
    inner: SqliteConnection,
}

impl SqliteConn {
    pub async fn connect(opts: &SqliteConnectOptions) -> Result<Self, DbError> {
        let inner = opts.connect().await.map_err(DbError::Connect)?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl Connection for SqliteConn {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryOutput, DbError> {
        let sql = translate_placeholders(sql, !params.is_empty());
        let query = bind_all(sqlx::query(&sql), params);

        let mut out = QueryOutput::default();
        if returns_rows(&sql) {
            let rows = query.fetch_all(&mut self.inner).await?;
            out.rows = rows.iter().map(decode_row).collect::<Result<_, _>>()?;
        } else {
            let done = query.execute(&mut self.inner).await?;
            out.rows_affected = done.rows_affected();
            let id = done.last_insert_rowid();
            out.last_insert_id = (id != 0).then_some(id);
        }
        Ok(out)
    }

    async fn close(self: Box<Self>) -> Result<(), DbError> {
        sqlx::Connection::close(self.inner).await?;
        Ok(())
    }
}

fn bind_all<'q>(mut query: SqliteQuery<'q>, params: &'q [Value]) -> SqliteQuery<'q> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<String>),
            Value::Int(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

fn decode_row(row: &SqliteRow) -> Result<Row, DbError> {
    (0..row.len())
        .map(|i| {
            if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
                return Ok(Value::from(v));
            }
            row.try_get::<Option<String>, _>(i)
                .map(Value::from)
                .map_err(|_| DbError::Decode {
                    index: i,
                    expected: "integer or text",
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Row)
}
