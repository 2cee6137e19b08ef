//! Ontology: an arena of concepts with multiple inheritance.
//!
//! # Property inheritance
//!
//! [`Ontology::properties`] walks the parents of a concept first, in
//! ascending id order and recursively, then applies the concept's own
//! properties. Same-named entries are overwritten by later writers, so a
//! concept's own property shadows anything inherited, and among several
//! parents that define the same name the one with the highest id wins. A
//! shared ancestor reached through two parents is applied once per path.
//!
//! # Cycles
//!
//! [`Ontology::append`] refuses links that would make a concept its own
//! ancestor, so the parent relation is always a DAG.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use hashbrown::{HashMap, HashSet};
use tracing::{debug, warn};

use super::{Concept, ConceptId, Property, PropertyId, Rule, Value};
use crate::{Error, Result};

/// Name of the root concept every ontology starts with.
pub const ROOT_CONCEPT: &str = "Thing";

#[derive(Debug, Clone)]
pub struct Ontology {
    name: String,
    concepts: HashMap<ConceptId, Concept>,
    /// First concept registered under each name.
    by_name: HashMap<String, ConceptId>,
    rules: Vec<Rule>,
    root: ConceptId,
    next_concept: u64,
    next_property: u64,
    next_rule: u64,
}

impl Ontology {
    pub fn new(name: impl Into<String>) -> Self {
        let root = ConceptId(0);
        let mut concepts = HashMap::new();
        concepts.insert(root, Concept::new(root, ROOT_CONCEPT));
        let mut by_name = HashMap::new();
        by_name.insert(ROOT_CONCEPT.to_string(), root);
        Self {
            name: name.into(),
            concepts,
            by_name,
            rules: Vec::new(),
            root,
            next_concept: 1,
            next_property: 0,
            next_rule: 0,
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn root(&self) -> ConceptId { self.root }
    pub fn len(&self) -> usize { self.concepts.len() }
    pub fn is_empty(&self) -> bool { self.concepts.is_empty() }
    pub fn rules(&self) -> &[Rule] { &self.rules }

    pub fn get(&self, id: ConceptId) -> Option<&Concept> {
        self.concepts.get(&id)
    }

    pub fn concept_id(&self, name: &str) -> Option<ConceptId> {
        self.by_name.get(name).copied()
    }

    /// Concept registered under `name`.
    pub fn concept(&self, name: &str) -> Option<&Concept> {
        self.concept_id(name).and_then(|id| self.get(id))
    }

    /// All concepts ordered by id.
    pub fn concepts(&self) -> Vec<&Concept> {
        let mut all: Vec<&Concept> = self.concepts.values().collect();
        all.sort_by_key(|c| c.id);
        all
    }

    fn concept_ref(&self, id: ConceptId) -> Result<&Concept> {
        self.concepts.get(&id).ok_or_else(|| Error::NotFound(format!("concept {id}")))
    }

    fn concept_mut(&mut self, id: ConceptId) -> Result<&mut Concept> {
        self.concepts.get_mut(&id).ok_or_else(|| Error::NotFound(format!("concept {id}")))
    }

    fn alloc_property(&mut self) -> PropertyId {
        let id = PropertyId(self.next_property);
        self.next_property += 1;
        id
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Create a concept without parents.
    pub fn create_concept(&mut self, name: impl Into<String>) -> ConceptId {
        let name = name.into();
        let id = ConceptId(self.next_concept);
        self.next_concept += 1;
        self.by_name.entry(name.clone()).or_insert(id);
        self.concepts.insert(id, Concept::new(id, name));
        id
    }

    /// Add `name` below `parent` (or below the root). An existing concept of
    /// the same name is returned unchanged.
    pub fn add_concept(&mut self, name: &str, parent: Option<&str>) -> Result<ConceptId> {
        let parent = match parent {
            Some(p) => self
                .concept_id(p)
                .ok_or_else(|| Error::NotFound(format!("parent concept '{p}' in ontology '{}'", self.name)))?,
            None => self.root,
        };
        if let Some(existing) = self.concept_id(name) {
            warn!(ontology = %self.name, concept = name, "concept already exists");
            return Ok(existing);
        }
        let id = self.create_concept(name);
        self.append(parent, id, false)?;
        Ok(id)
    }

    /// Create `name` and append it to `parent`.
    pub fn append_new(&mut self, parent: ConceptId, name: &str) -> Result<ConceptId> {
        self.concept_ref(parent)?;
        let id = self.create_concept(name);
        self.append(parent, id, false)?;
        Ok(id)
    }

    /// Link `child` below `parent`. `link` is reserved and has no effect.
    ///
    /// Fails with [`Error::Cycle`] when `child` is `parent` or one of its
    /// ancestors.
    pub fn append(&mut self, parent: ConceptId, child: ConceptId, link: bool) -> Result<()> {
        let _ = link;
        self.concept_ref(parent)?;
        self.concept_ref(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(Error::Cycle(format!(
                "'{}' is an ancestor of '{}'",
                self.concepts[&child].name, self.concepts[&parent].name
            )));
        }
        let p = self.concept_mut(parent)?;
        if !p.children.contains(&child) {
            p.children.push(child);
        }
        let c = self.concept_mut(child)?;
        if !c.parents.contains(&parent) {
            c.parents.push(parent);
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: ConceptId, of: ConceptId) -> bool {
        let mut stack = vec![of];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == candidate {
                return true;
            }
            if seen.insert(id) {
                if let Some(c) = self.concepts.get(&id) {
                    stack.extend(c.parents.iter().copied());
                }
            }
        }
        false
    }

    /// Unlink in both directions. Missing links are ignored.
    pub fn remove_child(&mut self, parent: ConceptId, child: ConceptId) {
        if let Some(p) = self.concepts.get_mut(&parent) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.concepts.get_mut(&child) {
            c.parents.retain(|&p| p != parent);
        }
    }

    pub fn remove_parent(&mut self, child: ConceptId, parent: ConceptId) {
        self.remove_child(parent, child);
    }

    /// Cut every link of `id`; the concept stays in the arena.
    pub fn detach(&mut self, id: ConceptId) {
        let Some(c) = self.concepts.get(&id) else { return };
        let (parents, children) = (c.parents.clone(), c.children.clone());
        for p in parents {
            self.remove_child(p, id);
        }
        for ch in children {
            self.remove_child(id, ch);
        }
    }

    /// With `Some(p)`: is `p` a direct parent. With `None`: has any parent.
    pub fn has_parent(&self, id: ConceptId, parent: Option<ConceptId>) -> bool {
        let Some(c) = self.concepts.get(&id) else { return false };
        match parent {
            Some(p) => c.parents.contains(&p),
            None => !c.parents.is_empty(),
        }
    }

    pub fn parents(&self, id: ConceptId) -> &[ConceptId] {
        self.concepts.get(&id).map(|c| c.parents.as_slice()).unwrap_or(&[])
    }

    pub fn children(&self, id: ConceptId) -> &[ConceptId] {
        self.concepts.get(&id).map(|c| c.children.as_slice()).unwrap_or(&[])
    }

    /// Reflexive, transitive subsumption by name.
    pub fn is_a(&self, id: ConceptId, name: &str) -> bool {
        let mut stack = vec![id];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(c) = self.concepts.get(&id) else { continue };
            if c.name == name {
                return true;
            }
            stack.extend(c.parents.iter().copied());
        }
        false
    }

    /// `id` followed by all of its descendants, depth first.
    pub fn descendance(&self, id: ConceptId) -> Vec<ConceptId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_descendance(id, &mut seen, &mut out);
        out
    }

    fn collect_descendance(&self, id: ConceptId, seen: &mut HashSet<ConceptId>, out: &mut Vec<ConceptId>) {
        if !seen.insert(id) {
            return;
        }
        let Some(c) = self.concepts.get(&id) else { return };
        out.push(id);
        for &ch in &c.children {
            self.collect_descendance(ch, seen, out);
        }
    }

    /// Deep copy of `id` and its subtree with fresh ids. The copy has no
    /// parents; a child shared by several copied parents is copied once per
    /// parent.
    pub fn copy(&mut self, id: ConceptId) -> Result<ConceptId> {
        self.copy_along(id, &mut Vec::new())
    }

    fn copy_along(&mut self, id: ConceptId, path: &mut Vec<ConceptId>) -> Result<ConceptId> {
        if path.contains(&id) {
            return Err(Error::Cycle(format!("concept {id} is its own descendant")));
        }
        let src = self.concept_ref(id)?.clone();
        let new_id = self.create_concept(src.name.clone());
        for p in src.properties.values() {
            let pid = self.alloc_property();
            let prop = Property { id: pid, ..p.clone() };
            self.concept_mut(new_id)?.properties.insert(pid, prop);
        }
        for a in src.annotations.values() {
            let pid = self.alloc_property();
            let prop = Property { id: pid, ..a.clone() };
            self.concept_mut(new_id)?.annotations.insert(pid, prop);
        }
        path.push(id);
        for ch in src.children {
            let copied = self.copy_along(ch, path)?;
            self.append(new_id, copied, false)?;
        }
        path.pop();
        Ok(new_id)
    }

    // ========================================================================
    // Properties
    // ========================================================================

    pub fn add_property(&mut self, id: ConceptId, name: &str, kind: &str) -> Result<PropertyId> {
        let pid = self.alloc_property();
        self.concept_mut(id)?.properties.insert(pid, Property::new(pid, name, kind));
        Ok(pid)
    }

    /// Property whose type is the concept `of`.
    pub fn add_concept_property(&mut self, id: ConceptId, name: &str, of: ConceptId) -> Result<PropertyId> {
        let kind = self.concept_ref(of)?.name.clone();
        self.add_property(id, name, &kind)
    }

    pub fn add_annotation(&mut self, id: ConceptId, name: &str, kind: &str) -> Result<PropertyId> {
        let pid = self.alloc_property();
        self.concept_mut(id)?.annotations.insert(pid, Property::new(pid, name, kind));
        Ok(pid)
    }

    /// Remove an own property.
    pub fn remove_property(&mut self, id: ConceptId, pid: PropertyId) -> Option<Property> {
        self.concepts.get_mut(&id)?.properties.remove(&pid)
    }

    /// Set the value of an own property or annotation.
    pub fn set_value(&mut self, id: ConceptId, pid: PropertyId, value: impl Into<Value>) -> Result<()> {
        let c = self.concept_mut(id)?;
        let prop = match c.properties.get_mut(&pid) {
            Some(p) => p,
            None => c
                .annotations
                .get_mut(&pid)
                .ok_or_else(|| Error::NotFound(format!("property {pid} of concept {id}")))?,
        };
        prop.value = value.into();
        Ok(())
    }

    /// Effective properties of `id`, inherited ones included, sorted by name.
    pub fn properties(&self, id: ConceptId) -> Vec<Property> {
        let mut merged = BTreeMap::new();
        self.merge_properties(id, &mut merged);
        merged.into_values().collect()
    }

    fn merge_properties(&self, id: ConceptId, out: &mut BTreeMap<String, Property>) {
        self.merge_along(id, &mut Vec::new(), out);
    }

    /// `path` holds the concepts being merged above `id`; a parent already
    /// on it is skipped.
    fn merge_along(&self, id: ConceptId, path: &mut Vec<ConceptId>, out: &mut BTreeMap<String, Property>) {
        let Some(c) = self.concepts.get(&id) else { return };
        path.push(id);
        let mut parents = c.parents.clone();
        parents.sort();
        for p in parents {
            if path.contains(&p) {
                warn!(concept = %c.name, parent = %p, "cyclic parent link ignored");
                continue;
            }
            self.merge_along(p, path, out);
        }
        path.pop();
        for p in c.properties.values() {
            out.insert(p.name.clone(), p.clone());
        }
    }

    /// Effective property by name, falling back to the concept's own
    /// annotations.
    pub fn property(&self, id: ConceptId, name: &str) -> Option<Property> {
        let found = self
            .properties(id)
            .into_iter()
            .find(|p| p.name == name)
            .or_else(|| self.get(id)?.annotation(name).cloned());
        if found.is_none() {
            warn!(concept = %self.concept_name(id), property = name, "property not found");
        }
        found
    }

    pub fn property_by_id(&self, id: ConceptId, pid: PropertyId) -> Option<Property> {
        let found = self.properties(id).into_iter().find(|p| p.id == pid);
        if found.is_none() {
            warn!(concept = %self.concept_name(id), property = %pid, "property id not found");
        }
        found
    }

    /// Effective properties whose type is `kind`. Zero or several matches
    /// are logged as suspicious.
    pub fn properties_of_type(&self, id: ConceptId, kind: &str) -> Vec<Property> {
        let res: Vec<Property> = self.properties(id).into_iter().filter(|p| p.kind == kind).collect();
        match res.len() {
            0 => warn!(concept = %self.concept_name(id), kind, "no properties of type"),
            1 => {}
            n => warn!(concept = %self.concept_name(id), kind, count = n, "multiple properties of type"),
        }
        res
    }

    pub fn property_id(&self, id: ConceptId, name: &str) -> Option<PropertyId> {
        self.properties(id).into_iter().find(|p| p.name == name).map(|p| p.id)
    }

    fn concept_name(&self, id: ConceptId) -> &str {
        self.concepts.get(&id).map(|c| c.name.as_str()).unwrap_or("?")
    }

    // ========================================================================
    // Rules
    // ========================================================================

    /// Parse and attach a rule to the concept named `concept`.
    pub fn add_rule(&mut self, statement: &str, concept: &str) -> Result<u64> {
        let rule = Rule::parse(self.next_rule, statement, concept)?;
        if self.concept_id(concept).is_none() {
            warn!(ontology = %self.name, concept, "rule attached to unknown concept");
        }
        self.next_rule += 1;
        let id = rule.id;
        self.rules.push(rule);
        Ok(id)
    }

    pub fn rules_for(&self, concept: &str) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.concept == concept)
    }

    // ========================================================================
    // Import / describe
    // ========================================================================

    /// Merge `other` into this ontology by concept name.
    ///
    /// Unknown concepts are created with copies of their properties and
    /// annotations; known ones are left as they are. Parent links are then
    /// re-created by name, the other root mapping to ours. Rules are copied.
    pub fn import(&mut self, other: &Ontology) {
        debug!(into = %self.name, from = %other.name, "import ontology");
        let mut mapping: HashMap<ConceptId, ConceptId> = HashMap::new();
        mapping.insert(other.root, self.root);

        for c in other.concepts() {
            if c.id == other.root {
                continue;
            }
            let id = match self.concept_id(&c.name) {
                Some(id) => id,
                None => {
                    let id = self.create_concept(c.name.clone());
                    for (src, annotation) in c
                        .properties
                        .values()
                        .map(|p| (p, false))
                        .chain(c.annotations.values().map(|a| (a, true)))
                    {
                        let pid = self.alloc_property();
                        let prop = Property { id: pid, ..src.clone() };
                        if let Some(dst) = self.concepts.get_mut(&id) {
                            if annotation {
                                dst.annotations.insert(pid, prop);
                            } else {
                                dst.properties.insert(pid, prop);
                            }
                        }
                    }
                    id
                }
            };
            mapping.insert(c.id, id);
        }

        for c in other.concepts() {
            let Some(&child) = mapping.get(&c.id) else { continue };
            for p in &c.parents {
                let Some(&parent) = mapping.get(p) else { continue };
                if let Err(e) = self.append(parent, child, false) {
                    warn!(into = %self.name, error = %e, "skipping imported link");
                }
            }
        }

        for r in &other.rules {
            if self.rules.iter().any(|own| own.statement == r.statement && own.concept == r.concept) {
                continue;
            }
            let rule = Rule { id: self.next_rule, ..r.clone() };
            self.next_rule += 1;
            self.rules.push(rule);
        }
    }

    /// Indented, human-readable dump of the concept tree and rules.
    pub fn describe(&self) -> String {
        let mut out = format!("ontology: {}\n", self.name);
        self.describe_concept(self.root, "  ", &mut Vec::new(), &mut out);
        for r in &self.rules {
            let _ = writeln!(out, "  rule {} ({}): {}", r.id, r.concept, r.statement);
        }
        out
    }

    fn describe_concept(&self, id: ConceptId, indent: &str, path: &mut Vec<ConceptId>, out: &mut String) {
        if path.contains(&id) {
            return;
        }
        let Some(c) = self.concepts.get(&id) else { return };
        let _ = writeln!(out, "{indent}concept: {}", c.name);
        for a in c.annotations.values() {
            let _ = writeln!(out, "{indent}  annotation {a}");
        }
        for p in self.properties(id) {
            let _ = writeln!(out, "{indent}  {p}");
        }
        let deeper = format!("{indent}  ");
        path.push(id);
        for &ch in &c.children {
            self.describe_concept(ch, &deeper, path, out);
        }
        path.pop();
    }

    // ========================================================================
    // Snapshot support
    // ========================================================================

    /// Rebuild from raw parts. Links are taken as given, so a consistent
    /// source (e.g. an exported snapshot) is expected.
    pub(crate) fn from_parts(name: String, concepts: Vec<Concept>, rules: Vec<Rule>) -> Result<Self> {
        let mut onto = Ontology::new(name);
        onto.concepts.clear();
        onto.by_name.clear();

        for c in concepts {
            onto.next_concept = onto.next_concept.max(c.id.0 + 1);
            for pid in c.properties.keys().chain(c.annotations.keys()) {
                onto.next_property = onto.next_property.max(pid.0 + 1);
            }
            onto.by_name.entry(c.name.clone()).or_insert(c.id);
            onto.concepts.insert(c.id, c);
        }
        onto.root = onto
            .concepts
            .values()
            .filter(|c| c.name == ROOT_CONCEPT && c.parents.is_empty())
            .map(|c| c.id)
            .min()
            .ok_or_else(|| Error::NotFound(format!("root concept '{ROOT_CONCEPT}'")))?;
        onto.next_rule = rules.iter().map(|r| r.id + 1).max().unwrap_or(0);
        onto.rules = rules;
        Ok(onto)
    }
}
