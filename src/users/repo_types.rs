use serde::{Deserialize, Serialize};

use crate::db::{DbError, Row};

/// User record as exposed on every read path. There is no password field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phonenumber: String,
}

/// Row about to be inserted; carries the hash, never the plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub address: String,
    pub phonenumber: String,
    pub password_hash: String,
}

/// Expects `id, name, email, address, phonenumber` in that order.
impl TryFrom<Row> for User {
    type Error = DbError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.int(0)?,
            name: row.text(1)?.unwrap_or_default(),
            email: row.text(2)?.unwrap_or_default(),
            address: row.text(3)?.unwrap_or_default(),
            phonenumber: row.text(4)?.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Value;

    #[test]
    fn decodes_public_columns() {
        let row = Row(vec![
            Value::Int(3),
            Value::Text("Ann".into()),
            Value::Text("a@x.com".into()),
            Value::Null,
            Value::Text("555-0100".into()),
        ]);
        let user = User::try_from(row).unwrap();
        assert_eq!(user.id, 3);
        assert_eq!(user.address, "");
        assert_eq!(user.phonenumber, "555-0100");
    }

    #[test]
    fn serialized_user_has_no_password() {
        let user = User {
            id: 1,
            name: "Ann".into(),
            email: "a@x.com".into(),
            address: "1 Main St".into(),
            phonenumber: "555-0100".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["id"], 1);
        assert_eq!(json["phonenumber"], "555-0100");
    }
}
