use rpc_framework::schema::{ObjectSchema, Schema};
use rpc_framework::ActorEntity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned user identifier. Serialized as a plain string (`"1"`, `"2"`, …).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl From<u64> for UserId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents a registered user in the system.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`] trait, allowing it to be managed by a
/// [`ResourceActor`](rpc_framework::ResourceActor).
///
/// - Creation parameters: [`UserCreate`]
/// - Partial updates: [`UserPatch`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Payload for creating a new user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
}

impl UserCreate {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Payload for updating an existing user. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Patch = UserPatch;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn from_create(id: UserId, params: UserCreate) -> Self {
        Self {
            id,
            name: params.name,
            email: params.email,
        }
    }

    fn apply_patch(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
    }
}

/// Fields a caller supplies to create a user: `name` (2+ characters) and a valid `email`.
pub fn user_create_schema() -> ObjectSchema {
    Schema::object()
        .required("name", Schema::string().min_len(2))
        .required("email", Schema::string().email())
}

/// A stored user as returned to callers.
pub fn user_schema() -> ObjectSchema {
    Schema::object()
        .required("id", Schema::string())
        .required("name", Schema::string().min_len(2))
        .required("email", Schema::string().email())
}
