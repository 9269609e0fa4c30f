use tracing::info;

use super::{Backend, Database, DbError};

pub const SQLITE_USER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(255),
    email VARCHAR(255),
    address TEXT,
    phonenumber VARCHAR(255),
    password VARCHAR(255)
)
"#;

pub const MYSQL_USER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id INT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255),
    email VARCHAR(255),
    address TEXT,
    phonenumber VARCHAR(255),
    password VARCHAR(255)
)
"#;

pub fn user_table_ddl(backend: Backend) -> &'static str {
    match backend {
        Backend::Sqlite => SQLITE_USER_TABLE,
        Backend::MySql => MYSQL_USER_TABLE,
    }
}

/// Creates the `user` table if it does not exist. Safe to call repeatedly.
pub async fn ensure_schema(db: &Database) -> Result<(), DbError> {
    let mut conn = db.connect().await?;
    let ddl = user_table_ddl(conn.backend());
    let result = async {
        let mut cur = conn.cursor();
        cur.execute(ddl, &[]).await?;
        cur.commit().await
    }
    .await;
    conn.release().await;
    result?;
    info!(backend = ?db.backend(), "user table ready");
    Ok(())
}
