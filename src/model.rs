//! Records exchanged with the mapping service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a field mapping.
///
/// The client never interprets it; it only displays it and uses it as a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingId {
    Number(i64),
    Text(String),
}

impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingId::Number(n) => write!(f, "{}", n),
            MappingId::Text(s) => f.write_str(s),
        }
    }
}

/// A pair associating an external API field with an internal storage field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub id: MappingId,
    pub api_field: String,
    pub db_field: String,
}

impl FieldMapping {
    /// Display form used by every list rendering: `api_field → db_field`.
    pub fn arrow_line(&self) -> String {
        format!("{} \u{2192} {}", self.api_field, self.db_field)
    }
}

/// Body of a create-mapping request.
///
/// Only [`crate::MappingBook::validate`] builds one, so both fields are
/// non-blank whenever a value of this type exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFieldMapping {
    api_field: String,
    db_field: String,
}

impl NewFieldMapping {
    pub(crate) fn new(api_field: String, db_field: String) -> Self {
        Self {
            api_field,
            db_field,
        }
    }

    pub fn api_field(&self) -> &str {
        &self.api_field
    }

    pub fn db_field(&self) -> &str {
        &self.db_field
    }
}

/// Named boolean switch controlling a background task on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerFlag {
    pub task_name: String,
    pub enabled: bool,
}

impl SchedulerFlag {
    /// The compile-time default: disabled until the server says otherwise.
    pub fn disabled(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            enabled: false,
        }
    }
}
