use rpc_framework::schema::{ObjectSchema, Schema};
use rpc_framework::ActorEntity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned todo identifier, serialized as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub String);

impl From<u64> for TodoId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<&str> for TodoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
}

/// Payload for creating a todo. `completed` defaults to `false`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TodoCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl TodoCreate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: false,
        }
    }
}

/// Any subset of the creation fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl ActorEntity for Todo {
    type Id = TodoId;
    type Create = TodoCreate;
    type Patch = TodoPatch;

    fn id(&self) -> &TodoId {
        &self.id
    }

    fn from_create(id: TodoId, params: TodoCreate) -> Self {
        Self {
            id,
            title: params.title,
            description: params.description,
            completed: params.completed,
        }
    }

    fn apply_patch(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

pub fn todo_create_schema() -> ObjectSchema {
    Schema::object()
        .required("title", Schema::string().min_len(1))
        .optional("description", Schema::string())
        .optional("completed", Schema::boolean())
}

pub fn todo_schema() -> ObjectSchema {
    Schema::object()
        .required("id", Schema::string())
        .required("title", Schema::string().min_len(1))
        .optional("description", Schema::string())
        .required("completed", Schema::boolean())
}
