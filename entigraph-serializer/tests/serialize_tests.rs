mod common;

use common::{entity_type, keys, make_employee, make_person, person_model, staff_model};
use entigraph_model::{Entity, Value};
use entigraph_serializer::{EntitySerializer, SerializationSettings, SerializeError};
use pretty_assertions::assert_eq;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;

fn settings() -> SerializationSettings {
    SerializationSettings::default()
}

// ── Default output ───────────────────────────────────────────────

#[test]
fn person_with_one_report() {
    let (_, person) = person_model();
    let ann = make_person(&person, "Ann");
    let bob = make_person(&person, "Bob");
    ann.set("reports", vec![Arc::clone(&bob)]).unwrap();

    let serializer = EntitySerializer::new();
    let output = serializer.serialize(&ann, settings()).unwrap();

    assert_eq!(
        JsonValue::Object(output.clone()),
        json!({
            "name": "Ann",
            "manager": null,
            "reports": [{"name": "Bob", "manager": null, "reports": []}]
        })
    );
    assert_eq!(keys(&output), vec!["name", "manager", "reports"]);
}

#[test]
fn scalars_lists_and_dates() {
    let model = staff_model();
    let ann = make_employee(&model, "e1", "Ann");

    let output = EntitySerializer::new().serialize(&ann, settings()).unwrap();

    assert_eq!(
        JsonValue::Object(output),
        json!({
            "id": "e1",
            "name": "Ann",
            "hired": "2024-03-01T00:00:00.000Z",
            "salary": 1200,
            "tags": ["a", "b"],
            "scores": [1, 2],
            "manager": null
        })
    );
}

#[test]
fn inherited_properties_come_first() {
    let model = staff_model();
    let ann = make_employee(&model, "e1", "Ann");

    let output = EntitySerializer::new().serialize(&ann, settings()).unwrap();

    assert_eq!(
        keys(&output),
        vec!["id", "name", "hired", "salary", "tags", "scores", "manager"]
    );
}

#[test]
fn calculated_and_constant_properties_are_skipped() {
    let model = staff_model();
    let ann = make_employee(&model, "e1", "Ann");
    ann.set("displayName", "Ann (e1)").unwrap();
    ann.set("kind", "staff").unwrap();

    let output = EntitySerializer::new().serialize(&ann, settings()).unwrap();

    assert!(!output.contains_key("displayName"));
    assert!(!output.contains_key("kind"));
}

#[test]
fn nested_entity_uses_same_settings() {
    let model = staff_model();
    let ann = make_employee(&model, "e1", "Ann");
    let bob = make_employee(&model, "e2", "Bob");
    ann.set("manager", Arc::clone(&bob)).unwrap();

    let mut serializer = EntitySerializer::new();
    serializer.register_alias("Party", "fullName", "name");
    let output = serializer
        .serialize(&ann, SerializationSettings::new().with_aliases())
        .unwrap();

    assert_eq!(output["fullName"], "Ann");
    assert_eq!(output["manager"]["fullName"], "Bob");
    assert_eq!(output["manager"]["manager"], JsonValue::Null);
}

#[test]
fn shared_reference_serialized_at_each_position() {
    let model = staff_model();
    let team = Entity::new(&entity_type(&model, "Team"), Some("t1".into()));
    let ann = make_employee(&model, "e1", "Ann");
    team.set("lead", Arc::clone(&ann)).unwrap();
    team.set("members", vec![Arc::clone(&ann)]).unwrap();

    let output = EntitySerializer::new().serialize(&team, settings()).unwrap();

    assert_eq!(output["lead"], output["members"][0]);
    assert_eq!(output["lead"]["name"], "Ann");
}

#[test]
fn plain_object_in_reference_slot_passes_through() {
    let (_, person) = person_model();
    let ann = make_person(&person, "Ann");
    ann.set("manager", Value::from(json!({"name": "Unloaded"}))).unwrap();

    let output = EntitySerializer::new().serialize(&ann, settings()).unwrap();

    assert_eq!(output["manager"], json!({"name": "Unloaded"}));
}

// ── Cycles ───────────────────────────────────────────────────────

#[test]
fn reference_cycle_is_an_error() {
    let model = staff_model();
    let ann = make_employee(&model, "e1", "Ann");
    let bob = make_employee(&model, "e2", "Bob");
    ann.set("manager", Arc::clone(&bob)).unwrap();
    bob.set("manager", Arc::clone(&ann)).unwrap();

    let err = EntitySerializer::new().serialize(&ann, settings()).unwrap_err();

    assert!(matches!(err, SerializeError::Cycle { ref id, .. } if id == "e1"));
}

#[test]
fn self_reference_is_an_error() {
    let model = staff_model();
    let ann = make_employee(&model, "e1", "Ann");
    ann.set("manager", Arc::clone(&ann)).unwrap();

    let err = EntitySerializer::new().serialize(&ann, settings()).unwrap_err();

    assert!(matches!(err, SerializeError::Cycle { .. }));
}

#[test]
fn serialize_context_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<entigraph_serializer::SerializeContext<'static>>();
}

// ── String output ────────────────────────────────────────────────

#[test]
fn serialize_to_string_keeps_key_order() {
    let (_, person) = person_model();
    let ann = make_person(&person, "Ann");

    let text = EntitySerializer::new().serialize_to_string(&ann, settings()).unwrap();

    assert_eq!(text, r#"{"name":"Ann","manager":null,"reports":[]}"#);
}
