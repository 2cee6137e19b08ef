//! Typed, named properties.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Value;

/// Property identifier, unique within its ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyId(pub u64);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    /// Primitive type name or the name of a concept.
    pub kind: String,
    pub value: Value,
}

impl Property {
    pub fn new(id: PropertyId, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { id, name: name.into(), kind: kind.into(), value: Value::Null }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prop {} ({})", self.name, self.kind)?;
        if !self.value.is_null() {
            write!(f, " = {}", self.value)?;
        }
        Ok(())
    }
}
