use crate::db::{Database, DbError, Value};
use crate::users::repo_types::{NewUser, User};

const SELECT_PUBLIC: &str = "SELECT id, name, email, address, phonenumber FROM user";

const INSERT: &str =
    "INSERT INTO user (name, email, address, phonenumber, password) VALUES (%s, %s, %s, %s, %s)";

impl NewUser {
    fn params(&self) -> [Value; 5] {
        [
            self.name.as_str().into(),
            self.email.as_str().into(),
            self.address.as_str().into(),
            self.phonenumber.as_str().into(),
            self.password_hash.as_str().into(),
        ]
    }
}

impl User {
    /// All users, ascending id.
    pub async fn list_all(db: &Database) -> Result<Vec<User>, DbError> {
        let mut conn = db.connect().await?;
        let result = async {
            let mut cur = conn.cursor();
            cur.execute(&format!("{SELECT_PUBLIC} ORDER BY id"), &[]).await?;
            cur.fetchall()
                .into_iter()
                .map(User::try_from)
                .collect::<Result<Vec<_>, _>>()
        }
        .await;
        conn.release().await;
        result
    }

    pub async fn find_by_id(db: &Database, id: i64) -> Result<Option<User>, DbError> {
        let mut conn = db.connect().await?;
        let result = async {
            let mut cur = conn.cursor();
            cur.execute(&format!("{SELECT_PUBLIC} WHERE id = %s"), &[id.into()])
                .await?;
            cur.fetchone().map(User::try_from).transpose()
        }
        .await;
        conn.release().await;
        result
    }

    /// Inserts and returns the generated id.
    pub async fn insert(db: &Database, new: &NewUser) -> Result<i64, DbError> {
        let mut conn = db.connect().await?;
        let result = async {
            let mut cur = conn.cursor();
            cur.execute(INSERT, &new.params()).await?;
            cur.commit().await?;
            cur.lastrowid().ok_or(DbError::MissingInsertId)
        }
        .await;
        conn.release().await;
        result
    }

    /// Inserts, then reads back the row with the highest id on the same
    /// connection. The two statements are not one transaction: under
    /// concurrent inserts the row returned may belong to another request.
    pub async fn insert_and_fetch_latest(
        db: &Database,
        new: &NewUser,
    ) -> Result<Option<User>, DbError> {
        let mut conn = db.connect().await?;
        let result = async {
            let mut cur = conn.cursor();
            cur.execute(INSERT, &new.params()).await?;
            cur.commit().await?;
            cur.execute(&format!("{SELECT_PUBLIC} ORDER BY id DESC LIMIT 1"), &[])
                .await?;
            cur.fetchone().map(User::try_from).transpose()
        }
        .await;
        conn.release().await;
        result
    }

    /// Returns the number of rows removed (0 or 1).
    pub async fn delete_by_id(db: &Database, id: i64) -> Result<u64, DbError> {
        let mut conn = db.connect().await?;
        let result = async {
            let mut cur = conn.cursor();
            cur.execute("DELETE FROM user WHERE id = %s", &[id.into()])
                .await?;
            cur.commit().await?;
            Ok::<_, DbError>(cur.rowcount().max(0) as u64)
        }
        .await;
        conn.release().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::schema::ensure_schema;
    use crate::db::testing::temp_sqlite_path;

    async fn setup(tag: &str) -> (Database, std::path::PathBuf) {
        let path = temp_sqlite_path(tag);
        let db = Database::open(&DatabaseConfig::Sqlite { path: path.clone() }).unwrap();
        ensure_schema(&db).await.unwrap();
        (db, path)
    }

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: format!("{name}@example.com"),
            address: "1 Main St".into(),
            phonenumber: "555-0100".into(),
            password_hash: "$argon2id$placeholder".into(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let (db, path) = setup("repo-ids").await;
        let a = User::insert(&db, &new_user("ann")).await.unwrap();
        let b = User::insert(&db, &new_user("bob")).await.unwrap();
        assert!(b > a);

        let found = User::find_by_id(&db, b).await.unwrap().unwrap();
        assert_eq!(found.name, "bob");
        assert_eq!(found.email, "bob@example.com");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let (db, path) = setup("repo-list").await;
        for name in ["c", "a", "b"] {
            User::insert(&db, &new_user(name)).await.unwrap();
        }
        let users = User::list_all(&db).await.unwrap();
        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].name, "c");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_id_is_none() {
        let (db, path) = setup("repo-missing").await;
        assert!(User::find_by_id(&db, 999).await.unwrap().is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn delete_reports_affected_rows() {
        let (db, path) = setup("repo-delete").await;
        let id = User::insert(&db, &new_user("ann")).await.unwrap();
        assert_eq!(User::delete_by_id(&db, id).await.unwrap(), 1);
        assert_eq!(User::delete_by_id(&db, id).await.unwrap(), 0);
        assert!(User::find_by_id(&db, id).await.unwrap().is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn insert_and_fetch_latest_returns_new_row() {
        let (db, path) = setup("repo-latest").await;
        User::insert(&db, &new_user("first")).await.unwrap();
        let latest = User::insert_and_fetch_latest(&db, &new_user("second"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.name, "second");
        assert_eq!(User::list_all(&db).await.unwrap().len(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn queries_fail_without_schema() {
        let path = temp_sqlite_path("repo-noschema");
        let db = Database::open(&DatabaseConfig::Sqlite { path: path.clone() }).unwrap();
        let err = User::list_all(&db).await.unwrap_err();
        assert!(matches!(err, DbError::Query(_)));
        let _ = std::fs::remove_file(&path);
    }
}
