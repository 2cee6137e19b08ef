//! Built-in ontology library.
//!
//! A fixed set of manufacturing ontologies (math primitives, objects,
//! processes, machines, robots) built once on first access and read-only
//! afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, error};

use super::Ontology;
use crate::Result;

static STANDARD: Lazy<OntologyLibrary> = Lazy::new(OntologyLibrary::standard);

#[derive(Debug, Clone, Default)]
pub struct OntologyLibrary {
    ontologies: BTreeMap<String, Arc<Ontology>>,
}

impl OntologyLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance of [`OntologyLibrary::standard`].
    pub fn global() -> &'static OntologyLibrary {
        &STANDARD
    }

    pub fn get(&self, name: &str) -> Option<Arc<Ontology>> {
        self.ontologies.get(name).cloned()
    }

    pub fn insert(&mut self, key: impl Into<String>, ontology: Ontology) {
        self.ontologies.insert(key.into(), Arc::new(ontology));
    }

    pub fn names(&self) -> Vec<&str> {
        self.ontologies.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize { self.ontologies.len() }
    pub fn is_empty(&self) -> bool { self.ontologies.is_empty() }

    /// The fifteen built-in ontologies. A build failure is logged and yields
    /// an empty library.
    pub fn standard() -> Self {
        match Self::build_standard() {
            Ok(lib) => {
                debug!(ontologies = lib.len(), "ontology library ready");
                lib
            }
            Err(e) => {
                error!(error = %e, "failed to build ontology library");
                Self::default()
            }
        }
    }

    fn build_standard() -> Result<Self> {
        let props = |o: &mut Ontology, concept: &str, list: &[(&str, &str)]| -> Result<()> {
            let id = o
                .concept_id(concept)
                .ok_or_else(|| crate::Error::NotFound(format!("concept '{concept}'")))?;
            for (name, kind) in list {
                o.add_property(id, name, kind)?;
            }
            Ok(())
        };

        let mut math = Ontology::new("Math");
        math.add_concept("Volume", None)?;
        math.add_concept("Vector", None)?;
        math.add_concept("Quaternion", None)?;
        props(&mut math, "Vector", &[("x", "float"), ("y", "float"), ("z", "float")])?;
        props(&mut math, "Quaternion", &[("x", "float"), ("y", "float"), ("z", "float"), ("w", "float")])?;
        math.add_concept("Position", Some("Vector"))?;
        math.add_concept("Normal", Some("Vector"))?;
        math.add_concept("Direction", Some("Vector"))?;
        math.add_concept("Orientation", Some("Quaternion"))?;
        math.add_concept("Box", Some("Volume"))?;
        props(&mut math, "Box", &[("min", "Vector"), ("max", "Vector")])?;
        math.add_rule("inside(p,b):Box(b);Position(p);isGe(p,b/min);isGe(b/max,p)", "Box")?;

        let mut object = Ontology::new("Object");
        object.import(&math);
        object.add_concept("Object", None)?;
        props(&mut object, "Object", &[("position", "Position"), ("orientation", "Orientation")])?;

        let mut process = Ontology::new("Process");
        process.add_concept("Process", None)?;
        props(&mut process, "Process", &[("fragment", "Process"), ("state", "int")])?;
        process.add_rule("is(p/state,1):Process(p);is_not(p/state,1);is_all(p/fragment/state,1)", "Process")?;

        let mut feature = Ontology::new("Feature");
        feature.add_concept("Feature", None)?;
        props(&mut feature, "Feature", &[("state", "int")])?;

        let mut action = Ontology::new("Action");
        action.add_concept("Action", None)?;

        let mut machine = Ontology::new("Machine");
        machine.import(&object);
        machine.add_concept("Machine", Some("Object"))?;

        let mut processing = Ontology::new("Processing");
        processing.import(&feature);
        processing.import(&action);
        processing.add_concept("Processing", Some("Action"))?;
        props(&mut processing, "Processing", &[("result", "Feature"), ("state", "int")])?;
        processing.add_rule("is(s/result/state,1):Processing(s);is(s/state,1)", "Processing")?;

        let mut prod_machine = Ontology::new("ProductionMachine");
        prod_machine.import(&machine);
        prod_machine.import(&processing);
        prod_machine.add_concept("Productionmachine", Some("Machine"))?;
        props(&mut prod_machine, "Productionmachine", &[("processing", "Processing")])?;

        let mut borehole = Ontology::new("Borehole");
        borehole.import(&math);
        borehole.import(&feature);
        borehole.add_concept("Borehole", Some("Feature"))?;
        props(
            &mut borehole,
            "Borehole",
            &[("radius", "float"), ("direction", "Direction"), ("position", "Position"), ("depth", "float")],
        )?;

        let mut drilling = Ontology::new("Drilling");
        drilling.import(&borehole);
        drilling.import(&processing);
        drilling.add_concept("Drilling", Some("Processing"))?;
        props(
            &mut drilling,
            "Drilling",
            &[("volume", "Box"), ("position", "Position"), ("direction", "Direction"), ("speed", "float")],
        )?;

        let mut product = Ontology::new("Product");
        product.import(&feature);
        product.import(&object);
        product.add_concept("Product", Some("Object"))?;
        props(&mut product, "Product", &[("feature", "Feature"), ("body", "Volume")])?;

        let mut production = Ontology::new("Production");
        production.import(&product);
        production.import(&prod_machine);
        production.import(&process);
        production.add_concept("Production", None)?;
        props(
            &mut production,
            "Production",
            &[("machine", "Machine"), ("job", "Product"), ("process", "Process")],
        )?;

        let mut drill = Ontology::new("Drill");
        drill.import(&prod_machine);
        drill.import(&processing);
        drill.import(&drilling);
        drill.add_concept("Drill", Some("Productionmachine"))?;

        let mut manipulation = Ontology::new("Manipulation");
        manipulation.import(&object);
        manipulation.import(&action);
        manipulation.add_concept("Manipulation", Some("Action"))?;
        for kind in ["Grab", "Translation", "Rotation"] {
            manipulation.add_concept(kind, Some("Manipulation"))?;
        }
        props(
            &mut manipulation,
            "Manipulation",
            &[("volume", "Box"), ("state", "String"), ("object", "Object")],
        )?;

        let mut robot = Ontology::new("Robot");
        robot.import(&manipulation);
        robot.import(&machine);
        robot.add_concept("Robot", Some("Machine"))?;
        props(&mut robot, "Robot", &[("skill", "Manipulation")])?;

        let mut lib = Self::new();
        lib.insert("Math", math);
        lib.insert("Feature", feature);
        lib.insert("Machine", machine);
        lib.insert("ProductionMachine", prod_machine);
        lib.insert("Manipulation", manipulation);
        lib.insert("Borehole", borehole);
        lib.insert("Drilling", drilling);
        lib.insert("Processing", processing);
        lib.insert("Action", action);
        lib.insert("Process", process);
        lib.insert("Product", product);
        lib.insert("Production", production);
        lib.insert("Drill", drill);
        lib.insert("Robot", robot);
        lib.insert("Object", object);
        Ok(lib)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_has_fifteen_ontologies() {
        let lib = OntologyLibrary::global();
        assert_eq!(lib.len(), 15);
        for name in ["Math", "Object", "Process", "Robot", "Drill", "ProductionMachine"] {
            assert!(lib.get(name).is_some(), "missing {name}");
        }
        assert!(lib.get("Nonexistent").is_none());
    }

    #[test]
    fn test_imports_carry_inheritance() {
        let robot = OntologyLibrary::global().get("Robot").unwrap();
        let r = robot.concept_id("Robot").unwrap();
        assert!(robot.is_a(r, "Machine"));
        assert!(robot.is_a(r, "Object"));
        let names: Vec<String> = robot.properties(r).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["orientation", "position", "skill"]);
    }

    #[test]
    fn test_drill_chain() {
        let drill = OntologyLibrary::global().get("Drill").unwrap();
        let d = drill.concept_id("Drill").unwrap();
        assert!(drill.is_a(d, "Productionmachine"));
        assert!(drill.is_a(d, "Machine"));
        let drilling = drill.concept_id("Drilling").unwrap();
        assert!(drill.is_a(drilling, "Action"));
        assert!(drill.rules_for("Processing").count() >= 1);
    }

    #[test]
    fn test_box_rule_in_math() {
        let math = OntologyLibrary::global().get("Math").unwrap();
        let rule = math.rules_for("Box").next().unwrap();
        assert_eq!(rule.body.len(), 4);
        let b = math.concept_id("Box").unwrap();
        assert_eq!(math.properties_of_type(b, "Vector").len(), 2);
    }

    #[test]
    fn test_global_is_shared() {
        let a = OntologyLibrary::global().get("Math").unwrap();
        let b = OntologyLibrary::global().get("Math").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
