//! JSON snapshots of ontologies and trees.
//!
//! ```text
//! Ontology → export_ontology_json() → { name, concepts[], rules[] }
//!   → import_ontology_json() → Ontology (ids and links preserved)
//! Tree → export_tree_json() → { params, seed, segments[] }
//! ```
//!
//! Snapshots list properties as arrays so the JSON stays readable and
//! independent of map key encoding.

use std::io::Write;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::material::MaterialRegistry;
use crate::nature::{Segment, Tree, TreeParams};
use crate::semantics::{Concept, ConceptId, Ontology, Property, Rule};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptSnapshot {
    pub id: ConceptId,
    pub name: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub annotations: Vec<Property>,
    #[serde(default)]
    pub parents: Vec<ConceptId>,
    #[serde(default)]
    pub children: Vec<ConceptId>,
}

impl From<&Concept> for ConceptSnapshot {
    fn from(c: &Concept) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            properties: c.properties.values().cloned().collect(),
            annotations: c.annotations.values().cloned().collect(),
            parents: c.parents.clone(),
            children: c.children.clone(),
        }
    }
}

impl From<ConceptSnapshot> for Concept {
    fn from(s: ConceptSnapshot) -> Self {
        let mut c = Concept::new(s.id, s.name);
        c.properties = s.properties.into_iter().map(|p| (p.id, p)).collect();
        c.annotations = s.annotations.into_iter().map(|p| (p.id, p)).collect();
        c.parents = s.parents;
        c.children = s.children;
        c
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologySnapshot {
    pub name: String,
    pub concepts: Vec<ConceptSnapshot>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl From<&Ontology> for OntologySnapshot {
    fn from(o: &Ontology) -> Self {
        Self {
            name: o.name().to_owned(),
            concepts: o.concepts().into_iter().map(ConceptSnapshot::from).collect(),
            rules: o.rules().to_vec(),
        }
    }
}

impl OntologySnapshot {
    /// Rebuild the ontology. Links must reference concepts of the snapshot,
    /// be mirrored on both ends and form no cycle.
    pub fn into_ontology(self) -> Result<Ontology> {
        self.validate_links()?;
        let concepts = self.concepts.into_iter().map(Concept::from).collect();
        Ontology::from_parts(self.name, concepts, self.rules)
    }

    fn validate_links(&self) -> Result<()> {
        let by_id: HashMap<ConceptId, &ConceptSnapshot> = self.concepts.iter().map(|c| (c.id, c)).collect();
        if by_id.len() != self.concepts.len() {
            return Err(Error::InvalidParameter("duplicate concept ids".into()));
        }
        for c in &self.concepts {
            for p in &c.parents {
                let parent = by_id
                    .get(p)
                    .ok_or_else(|| Error::NotFound(format!("parent {p} of concept '{}'", c.name)))?;
                if !parent.children.contains(&c.id) {
                    return Err(Error::InvalidParameter(format!(
                        "concept '{}' lists parent '{}' which does not list it",
                        c.name, parent.name
                    )));
                }
            }
            for ch in &c.children {
                let child = by_id
                    .get(ch)
                    .ok_or_else(|| Error::NotFound(format!("child {ch} of concept '{}'", c.name)))?;
                if !child.parents.contains(&c.id) {
                    return Err(Error::InvalidParameter(format!(
                        "concept '{}' lists child '{}' which does not list it",
                        c.name, child.name
                    )));
                }
            }
        }

        // depth-first over parent links; a concept met again while still on
        // the stack closes a cycle
        let mut visited: HashSet<ConceptId> = HashSet::new();
        for c in &self.concepts {
            if !visited.insert(c.id) {
                continue;
            }
            let mut on_stack: HashSet<ConceptId> = HashSet::new();
            on_stack.insert(c.id);
            let mut stack = vec![(c.id, 0usize)];
            while let Some((id, next)) = stack.pop() {
                let parents = by_id.get(&id).map(|s| s.parents.as_slice()).unwrap_or_default();
                match parents.get(next) {
                    Some(&p) => {
                        stack.push((id, next + 1));
                        if on_stack.contains(&p) {
                            return Err(Error::Cycle(format!(
                                "concept '{}' is its own ancestor",
                                by_id.get(&p).map(|s| s.name.as_str()).unwrap_or("?")
                            )));
                        }
                        if visited.insert(p) {
                            on_stack.insert(p);
                            stack.push((p, 0));
                        }
                    }
                    None => {
                        on_stack.remove(&id);
                    }
                }
            }
        }
        Ok(())
    }
}

pub fn export_ontology_json(ontology: &Ontology, writer: &mut dyn Write) -> Result<()> {
    let snapshot = OntologySnapshot::from(ontology);
    serde_json::to_writer_pretty(&mut *writer, &snapshot)?;
    writeln!(writer)?;
    debug!(ontology = ontology.name(), concepts = snapshot.concepts.len(), "ontology exported");
    Ok(())
}

pub fn ontology_to_json(ontology: &Ontology) -> Result<String> {
    Ok(serde_json::to_string_pretty(&OntologySnapshot::from(ontology))?)
}

pub fn import_ontology_json(json: &str) -> Result<Ontology> {
    let snapshot: OntologySnapshot = serde_json::from_str(json)?;
    snapshot.into_ontology()
}

/// Growth inputs and resulting skeleton of a tree. Geometry is not stored;
/// [`TreeSnapshot::regrow`] rebuilds the same skeleton from params and seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub params: TreeParams,
    pub seed: u64,
    pub segments: Vec<Segment>,
}

impl From<&Tree> for TreeSnapshot {
    fn from(t: &Tree) -> Self {
        Self { params: t.params().clone(), seed: t.seed(), segments: t.segments().to_vec() }
    }
}

impl TreeSnapshot {
    pub fn regrow(&self, materials: &MaterialRegistry) -> Tree {
        let mut tree = Tree::new(materials);
        tree.setup(self.params.clone(), self.seed);
        tree
    }
}

pub fn export_tree_json(tree: &Tree, writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &TreeSnapshot::from(tree))?;
    writeln!(writer)?;
    Ok(())
}
