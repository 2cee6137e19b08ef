//! Concept nodes of an ontology.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Property, PropertyId};

/// Concept identifier, unique within its ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConceptId(pub u64);

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category in the ontology graph.
///
/// Links are ids into the owning [`Ontology`](super::Ontology): `children`
/// is the owning direction, `parents` are back references. Both lists keep
/// insertion order and never hold duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub id: ConceptId,
    pub name: String,
    pub properties: BTreeMap<PropertyId, Property>,
    pub annotations: BTreeMap<PropertyId, Property>,
    pub parents: Vec<ConceptId>,
    pub children: Vec<ConceptId>,
}

impl Concept {
    pub fn new(id: ConceptId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            properties: BTreeMap::new(),
            annotations: BTreeMap::new(),
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Property declared on this concept itself (not inherited).
    pub fn own_property(&self, name: &str) -> Option<&Property> {
        self.properties.values().find(|p| p.name == name)
    }

    pub fn annotation(&self, name: &str) -> Option<&Property> {
        self.annotations.values().find(|p| p.name == name)
    }

    pub fn is_orphan(&self) -> bool {
        self.parents.is_empty()
    }
}
