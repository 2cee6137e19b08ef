//! # Semantics
//!
//! Concept graphs with inherited properties and attached inference rules.
//!
//! An [`Ontology`] owns its [`Concept`]s in an id-addressed arena. Concepts
//! may have several parents (diamond hierarchies are fine); cycles are
//! rejected at link time. The [`OntologyLibrary`] holds a fixed set of
//! ready-made ontologies.

pub mod concept;
pub mod library;
pub mod ontology;
pub mod property;
pub mod rule;
pub mod value;

pub use concept::{Concept, ConceptId};
pub use library::OntologyLibrary;
pub use ontology::{Ontology, ROOT_CONCEPT};
pub use property::{Property, PropertyId};
pub use rule::{Rule, Statement, Term};
pub use value::Value;
