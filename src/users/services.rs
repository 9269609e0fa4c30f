use tracing::info;

use crate::db::Database;
use crate::error::ApiError;
use crate::users::dto::{CreateUserRequest, Submission};
use crate::users::password::hash_password;
use crate::users::repo_types::{NewUser, User};

/// Required create fields, in the order they are reported.
pub const REQUIRED_FIELDS: [&str; 5] = ["name", "email", "address", "phonenumber", "password"];

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

impl CreateUserRequest {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let values = [
            &self.name,
            &self.email,
            &self.address,
            &self.phonenumber,
            &self.password,
        ];
        REQUIRED_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, v)| present(v).is_none())
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn validate(self) -> Result<Submission, ApiError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ApiError::MissingFields(missing));
        }
        Ok(Submission {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            phonenumber: self.phonenumber.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        })
    }
}

impl Submission {
    fn into_new_user(self) -> Result<NewUser, ApiError> {
        let password_hash = hash_password(&self.password)?;
        Ok(NewUser {
            name: self.name,
            email: self.email,
            address: self.address,
            phonenumber: self.phonenumber,
            password_hash,
        })
    }
}

/// Hashes, inserts and echoes the submitted fields with the new id.
pub async fn create_user(db: &Database, submission: Submission) -> Result<User, ApiError> {
    let new = submission.into_new_user()?;
    let id = User::insert(db, &new).await?;
    info!(user_id = id, "user created");
    Ok(User {
        id,
        name: new.name,
        email: new.email,
        address: new.address,
        phonenumber: new.phonenumber,
    })
}

/// Form flow: inserts, then returns whatever row is newest afterwards.
pub async fn submit_user(db: &Database, submission: Submission) -> Result<Option<User>, ApiError> {
    let new = submission.into_new_user()?;
    let latest = User::insert_and_fetch_latest(db, &new).await?;
    info!(user_id = ?latest.as_ref().map(|u| u.id), "user submitted");
    Ok(latest)
}

pub async fn get_user(db: &Database, id: i64) -> Result<User, ApiError> {
    User::find_by_id(db, id).await?.ok_or(ApiError::NotFound)
}

pub async fn delete_user(db: &Database, id: i64) -> Result<(), ApiError> {
    match User::delete_by_id(db, id).await? {
        0 => Err(ApiError::NotFound),
        _ => {
            info!(user_id = id, "user deleted");
            Ok(())
        }
    }
}
