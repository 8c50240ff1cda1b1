//! Shared model fixtures for serializer tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use entigraph_model::{Entity, EntityType, Model, PropertyDescriptor, Value};
use std::sync::Arc;

/// `Person { name, manager: Person, reports: Person[] }`, no identifier.
pub fn person_model() -> (Model, Arc<EntityType>) {
    let mut model = Model::new();
    let person = model
        .define(
            EntityType::builder("Person")
                .property(PropertyDescriptor::string("name"))
                .property(PropertyDescriptor::reference("manager", "Person"))
                .property(PropertyDescriptor::reference("reports", "Person").list()),
        )
        .unwrap();
    (model, person)
}

pub fn make_person(person: &Arc<EntityType>, name: &str) -> Arc<Entity> {
    let p = Entity::new(person, None);
    p.set("name", name).unwrap();
    p
}

/// Party (id, name) <- Employee; Team references employees.
pub fn staff_model() -> Model {
    let mut model = Model::new();
    let party = model
        .define(
            EntityType::builder("Party")
                .identifier("id")
                .property(PropertyDescriptor::string("id"))
                .property(PropertyDescriptor::string("name")),
        )
        .unwrap();
    model
        .define(
            EntityType::builder("Employee")
                .base(&party)
                .property(PropertyDescriptor::date("hired"))
                .property(PropertyDescriptor::number("salary"))
                .property(PropertyDescriptor::string("tags").list())
                .property(PropertyDescriptor::number("scores").list())
                .property(PropertyDescriptor::reference("manager", "Employee"))
                .property(PropertyDescriptor::string("displayName").calculated())
                .property(PropertyDescriptor::string("kind").constant()),
        )
        .unwrap();
    model
        .define(
            EntityType::builder("Team")
                .identifier("id")
                .property(PropertyDescriptor::string("id"))
                .property(PropertyDescriptor::string("name"))
                .property(PropertyDescriptor::reference("lead", "Employee"))
                .property(PropertyDescriptor::reference("members", "Employee").list()),
        )
        .unwrap();
    model
}

pub fn entity_type(model: &Model, name: &str) -> Arc<EntityType> {
    Arc::clone(model.get_type(name).unwrap())
}

/// An employee with every serializable property set.
pub fn make_employee(model: &Model, id: &str, name: &str) -> Arc<Entity> {
    let e = Entity::new(&entity_type(model, "Employee"), Some(id.to_string()));
    e.set("name", name).unwrap();
    e.set("hired", Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()).unwrap();
    e.set("salary", 1200_i64).unwrap();
    e.set("tags", vec![Value::from("a"), Value::from("b")]).unwrap();
    e.set("scores", vec![Value::from(1_i64), Value::from(2_i64)]).unwrap();
    e
}

/// Keys of a serialized object, in output order.
pub fn keys(map: &serde_json::Map<String, serde_json::Value>) -> Vec<&str> {
    map.keys().map(String::as_str).collect()
}
