use std::path::Path;

use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{ConnectOptions, Row as _};

use super::placeholder::translate_placeholders;
use super::{returns_rows, Backend, Connection, DbError, QueryOutput, Row, Value};
use crate::config::MySqlCredentials;

type MySqlQuery<'q> = sqlx::query::Query<'q, MySql, MySqlArguments>;

pub fn tcp_options(host: &str, port: u16, credentials: &MySqlCredentials) -> MySqlConnectOptions {
    with_credentials(MySqlConnectOptions::new().host(host).port(port), credentials)
}

/// Cloud SQL instances are mounted as unix sockets named after the
/// `project:region:instance` connection name.
pub fn cloud_sql_options(
    socket_dir: &Path,
    instance: &str,
    credentials: &MySqlCredentials,
) -> MySqlConnectOptions {
    with_credentials(
        MySqlConnectOptions::new().socket(socket_dir.join(instance)),
        credentials,
    )
}

fn with_credentials(opts: MySqlConnectOptions, credentials: &MySqlCredentials) -> MySqlConnectOptions {
    opts.username(&credentials.user)
        .password(&credentials.password)
        .database(&credentials.database)
}

pub struct MySqlConn {
    inner: MySqlConnection,
}

impl MySqlConn {
    pub async fn connect(opts: &MySqlConnectOptions) -> Result<Self, DbError> {
        let inner = opts.connect().await.map_err(DbError::Connect)?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl Connection for MySqlConn {
    fn backend(&self) -> Backend {
        Backend::MySql
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
            let id = done.last_insert_id();
            out.last_insert_id = (id != 0).then_some(id as i64);
        }
        Ok(out)
    }

    async fn close(self: Box<Self>) -> Result<(), DbError> {
        sqlx::Connection::close(self.inner).await?;
        Ok(())
    }
}

fn bind_all<'q>(mut query: MySqlQuery<'q>, params: &'q [Value]) -> MySqlQuery<'q> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<String>),
            Value::Int(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

fn decode_row(row: &MySqlRow) -> Result<Row, DbError> {
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
