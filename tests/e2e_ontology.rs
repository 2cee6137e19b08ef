//! End-to-end ontology tests: hierarchy links, property inheritance,
//! subsumption, copies and the built-in library.

use polyvr::semantics::ROOT_CONCEPT;
use polyvr::{Error, Ontology, OntologyLibrary, Value};
use pretty_assertions::assert_eq;

fn vehicles() -> Ontology {
    let mut o = Ontology::new("Vehicles");
    let v = o.add_concept("Vehicle", None).unwrap();
    o.add_property(v, "wheels", "int").unwrap();
    o.add_property(v, "speed", "float").unwrap();
    o.add_concept("Car", Some("Vehicle")).unwrap();
    o.add_concept("Boat", Some("Vehicle")).unwrap();
    o.add_concept("Sportscar", Some("Car")).unwrap();
    o
}

#[test]
fn test_append_then_detach() {
    let mut o = vehicles();
    let car = o.concept_id("Car").unwrap();
    let truck = o.create_concept("Truck");
    assert!(!o.has_parent(truck, None));

    o.append(car, truck, false).unwrap();
    assert!(o.has_parent(truck, Some(car)));
    assert!(o.children(car).contains(&truck));

    o.detach(truck);
    assert!(!o.has_parent(truck, Some(car)));
    assert!(!o.children(car).contains(&truck));
}

#[test]
fn test_detach_cuts_children_too() {
    let mut o = vehicles();
    let car = o.concept_id("Car").unwrap();
    let sports = o.concept_id("Sportscar").unwrap();
    o.detach(car);
    assert!(!o.has_parent(sports, None));
    assert!(!o.is_a(sports, "Vehicle"));
}

#[test]
fn test_own_property_shadows_inherited() {
    let mut o = vehicles();
    let boat = o.concept_id("Boat").unwrap();
    o.add_property(boat, "wheels", "none").unwrap();

    let props = o.properties(boat);
    let wheels: Vec<_> = props.iter().filter(|p| p.name == "wheels").collect();
    assert_eq!(wheels.len(), 1);
    assert_eq!(wheels[0].kind, "none");

    let car = o.concept_id("Car").unwrap();
    assert_eq!(o.property(car, "wheels").unwrap().kind, "int");
}

#[test]
fn test_is_a_reflexive_and_transitive() {
    let o = vehicles();
    let s = o.concept_id("Sportscar").unwrap();
    assert!(o.is_a(s, "Sportscar"));
    assert!(o.is_a(s, "Car"));
    assert!(o.is_a(s, "Vehicle"));
    assert!(o.is_a(s, ROOT_CONCEPT));
    assert!(!o.is_a(s, "Boat"));
}

#[test]
fn test_diamond_inheritance() {
    let mut o = vehicles();
    let amphibian = o.add_concept("Amphibian", Some("Car")).unwrap();
    let boat = o.concept_id("Boat").unwrap();
    o.append(boat, amphibian, false).unwrap();
    o.add_property(boat, "draft", "float").unwrap();

    assert!(o.is_a(amphibian, "Boat"));
    assert!(o.is_a(amphibian, "Car"));
    let names: Vec<String> = o.properties(amphibian).into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["draft", "speed", "wheels"]);

    let vehicle = o.concept_id("Vehicle").unwrap();
    let below = o.descendance(vehicle);
    assert_eq!(below.iter().filter(|&&c| c == amphibian).count(), 1);
}

#[test]
fn test_cycles_are_rejected() {
    let mut o = vehicles();
    let vehicle = o.concept_id("Vehicle").unwrap();
    let sports = o.concept_id("Sportscar").unwrap();
    assert!(matches!(o.append(sports, vehicle, false), Err(Error::Cycle(_))));
    assert!(matches!(o.append(sports, sports, false), Err(Error::Cycle(_))));
    assert!(!o.has_parent(vehicle, Some(sports)));
}

#[test]
fn test_copy_is_independent() {
    let mut o = vehicles();
    let car = o.concept_id("Car").unwrap();
    let speed = o.add_property(car, "doors", "int").unwrap();
    o.set_value(car, speed, 4i64).unwrap();

    let copy = o.copy(car).unwrap();
    assert_ne!(copy, car);
    assert_eq!(o.get(copy).unwrap().name, "Car");
    assert_eq!(o.children(copy).len(), 1);

    let copied_doors = o.get(copy).unwrap().own_property("doors").unwrap().id;
    o.set_value(copy, copied_doors, 2i64).unwrap();
    assert_eq!(o.get(car).unwrap().own_property("doors").unwrap().value, Value::Int(4));
    assert_eq!(o.get(copy).unwrap().own_property("doors").unwrap().value, Value::Int(2));

    let copied_child = o.children(copy)[0];
    assert_ne!(copied_child, o.concept_id("Sportscar").unwrap());
}

#[test]
fn test_missing_lookups_degrade() {
    let o = vehicles();
    let car = o.concept_id("Car").unwrap();
    assert!(o.property(car, "altitude").is_none());
    assert!(o.concept_id("Plane").is_none());
    assert!(o.properties_of_type(car, "string").is_empty());
}

#[test]
fn test_rules_and_describe() {
    let mut o = vehicles();
    o.add_rule("fast(c):Sportscar(c);isGe(c/speed,200)", "Sportscar").unwrap();
    assert!(matches!(o.add_rule("fast(c)", "Sportscar"), Err(Error::RuleSyntax { .. })));

    let text = o.describe();
    assert!(text.contains("concept: Sportscar"));
    assert!(text.contains("prop wheels (int)"));
    assert!(text.contains("fast(c):Sportscar(c)"));
}

#[test]
fn test_import_merges_by_name() {
    let mut base = vehicles();
    let mut extra = Ontology::new("Extra");
    extra.add_concept("Vehicle", None).unwrap();
    extra.add_concept("Bike", Some("Vehicle")).unwrap();
    base.import(&extra);

    let bike = base.concept_id("Bike").unwrap();
    assert!(base.is_a(bike, "Vehicle"));
    assert_eq!(base.property(bike, "wheels").unwrap().kind, "int");
    let vehicles: Vec<_> = base.concepts().into_iter().filter(|c| c.name == "Vehicle").collect();
    assert_eq!(vehicles.len(), 1);
}

#[test]
fn test_library_production_chain() {
    let lib = OntologyLibrary::global();
    let production = lib.get("Production").unwrap();
    let p = production.concept_id("Production").unwrap();
    let kinds: Vec<String> = production.properties(p).into_iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec!["Product", "Machine", "Process"]);
    let m = production.concept_id("Productionmachine").unwrap();
    assert!(production.is_a(m, "Object"));
}
