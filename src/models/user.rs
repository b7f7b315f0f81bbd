use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// A user as stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    /// Always lowercased; backed by a unique index.
    pub email: String,
    pub password_hash: String,
    pub created_at: bson::DateTime,
}

impl UserDocument {
    pub fn new(username: String, email: &str, password_hash: String) -> Self {
        Self {
            id: None,
            username,
            email: normalize_email(email),
            password_hash,
            created_at: bson::DateTime::now(),
        }
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: doc.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: doc.username,
            email: doc.email,
            created_at: doc.created_at.to_chrono(),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
