use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use super::repo_types::User;

/// Create payload, shared by the JSON API and the HTML form.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub phonenumber: Option<String>,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub password: Option<String>,
}

/// Reads a string, number or boolean field as text. `null`, `false` and
/// zero read as absent; arrays and objects are rejected.
pub fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarVisitor)
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok((v != 0).then(|| v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok((v != 0).then(|| v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok((v != 0.0).then(|| v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(v.then(|| "true".to_owned()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

/// A create payload with every field present and non-empty.
#[derive(Debug, Clone)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub address: String,
    pub phonenumber: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CreateUserRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn numbers_are_read_as_text() {
        let req = parse(r#"{"phonenumber": 5550100, "address": 12.5}"#);
        assert_eq!(req.phonenumber.as_deref(), Some("5550100"));
        assert_eq!(req.address.as_deref(), Some("12.5"));
    }

    #[test]
    fn falsy_values_read_as_absent() {
        let req = parse(r#"{"name": null, "email": false, "address": 0, "phonenumber": ""}"#);
        assert_eq!(req.name, None);
        assert_eq!(req.email, None);
        assert_eq!(req.address, None);
        assert_eq!(req.phonenumber.as_deref(), Some(""));
        assert_eq!(req.password, None);
    }

    #[test]
    fn nested_values_are_rejected() {
        assert!(serde_json::from_str::<CreateUserRequest>(r#"{"name": ["Ann"]}"#).is_err());
        assert!(serde_json::from_str::<CreateUserRequest>(r#"{"name": {"first": "Ann"}}"#).is_err());
    }
}
