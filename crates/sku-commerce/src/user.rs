//! The user entity.
//!
//! Identity resolution, token issuance, and password hashing live outside
//! this crate; users exist here only so the store can own them.

use serde::{Deserialize, Serialize};
use sku_data::Entity;

use crate::bulk::{FieldSpec, FieldValue};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned key; 0 until committed.
    pub id: i64,
    /// Login name; unique across users.
    pub username: String,
    /// Hash of the user's password, produced elsewhere.
    pub password_hash: String,
}

impl User {
    /// Create a user not yet persisted.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: 0,
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Fields a candidate must carry to be inserted.
    pub fn required_fields() -> [FieldSpec<User>; 2] {
        [
            FieldSpec {
                name: "username",
                get: |u| FieldValue::Text(u.username.clone()),
            },
            FieldSpec {
                name: "password_hash",
                get: |u| FieldValue::Text(u.password_hash.clone()),
            },
        ]
    }

    /// Fields whose equality marks a candidate as a duplicate.
    pub fn unique_fields() -> [FieldSpec<User>; 1] {
        [FieldSpec {
            name: "username",
            get: |u| FieldValue::Text(u.username.clone()),
        }]
    }
}

impl Entity for User {
    fn id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn label(&self) -> String {
        format!("user '{}'", self.username)
    }
}
