mod common;

use common::{make_person, person_model};
use entigraph_model::{Entity, PropertyDescriptor, Value};
use entigraph_serializer::{EntitySerializer, Resolution, ResolverChain, SerializationSettings};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

fn counting(
    counter: &Arc<AtomicUsize>,
    answer: Option<&'static str>,
) -> impl Fn(&Arc<Entity>, &PropertyDescriptor, &Value) -> Option<Resolution> + Send + Sync + use<> {
    let counter = Arc::clone(counter);
    move |_: &Arc<Entity>, _: &PropertyDescriptor, _: &Value| {
        counter.fetch_add(1, Ordering::SeqCst);
        answer.map(Resolution::ready)
    }
}

// ── Chain order ──────────────────────────────────────────────────

#[tokio::test]
async fn first_answer_wins() {
    let (_, person) = person_model();
    let ann = make_person(&person, "Ann");
    let name = person.property("name").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut serializer = EntitySerializer::new();
    serializer.register_resolver(counting(&calls, None));
    serializer.register_resolver(counting(&calls, Some("two")));
    serializer.register_resolver(counting(&calls, Some("three")));

    let resolution = serializer.resolve_value(&ann, &name, &ann.get("name")).unwrap();

    assert_eq!(resolution.into_value().await, Value::from("two"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn no_answer_yields_none() {
    let (_, person) = person_model();
    let ann = make_person(&person, "Ann");
    let name = person.property("name").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut serializer = EntitySerializer::new();
    serializer.register_resolver(counting(&calls, None));
    serializer.register_resolver(counting(&calls, None));

    assert!(serializer.resolve_value(&ann, &name, &Value::Null).is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn empty_chain_yields_none() {
    let (_, person) = person_model();
    let ann = make_person(&person, "Ann");
    let name = person.property("name").unwrap();

    assert!(EntitySerializer::new().resolve_value(&ann, &name, &Value::Null).is_none());
}

#[test]
fn falsy_answers_still_win() {
    let (_, person) = person_model();
    let ann = make_person(&person, "Ann");
    let name = person.property("name").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    for falsy in [Value::Bool(false), Value::from(0_i64), Value::from(""), Value::Null] {
        let mut chain = ResolverChain::new();
        let answer = falsy.clone();
        chain.register(Arc::new(move |_: &Arc<Entity>, _: &PropertyDescriptor, _: &Value| {
            Some(Resolution::Ready(answer.clone()))
        }));
        chain.register(Arc::new(counting(&calls, Some("fallback"))));

        let resolution = chain.resolve(&ann, &name, &Value::Null).unwrap();
        assert_eq!(tokio_test::block_on(resolution.into_value()), falsy);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn resolver_sees_entity_property_and_value() {
    let (_, person) = person_model();
    let ann = make_person(&person, "Ann");
    let name = person.property("name").unwrap();
    let mut serializer = EntitySerializer::new();
    serializer.register_resolver(|entity: &Arc<Entity>, property: &PropertyDescriptor, value: &Value| {
        let owner = entity.get("name");
        let text = format!("{}.{}={}", owner.as_str()?, property.name(), value.as_str()?);
        Some(Resolution::ready(text))
    });

    let resolution = serializer.resolve_value(&ann, &name, &Value::from("x")).unwrap();

    assert!(!resolution.is_pending());
    assert_eq!(tokio_test::block_on(resolution.into_value()), Value::from("Ann.name=x"));
}

// ── Pending results ──────────────────────────────────────────────

#[tokio::test]
async fn pending_result_settles_later() {
    let (_, person) = person_model();
    let ann = make_person(&person, "Ann");
    let manager = person.property("manager").unwrap();
    let (tx, rx) = oneshot::channel::<Value>();
    let rx = Mutex::new(Some(rx));
    let mut serializer = EntitySerializer::new();
    serializer.register_resolver(move |_: &Arc<Entity>, p: &PropertyDescriptor, _: &Value| {
        if p.name() != "manager" {
            return None;
        }
        let rx = rx.lock().unwrap().take()?;
        Some(Resolution::pending(async move { rx.await.unwrap_or_default() }))
    });

    let resolution = serializer.resolve_value(&ann, &manager, &Value::Null).unwrap();
    assert!(resolution.is_pending());

    let bea = make_person(&person, "Bea");
    let sender = tokio::spawn(async move {
        tx.send(Value::Entity(bea)).unwrap();
    });
    let resolved = resolution.into_value().await;
    sender.await.unwrap();

    assert_eq!(resolved.as_entity().unwrap().get("name").as_str(), Some("Bea"));
}

#[tokio::test]
async fn resolution_is_independent_of_converters() {
    let (_, person) = person_model();
    let ann = make_person(&person, "Ann");
    let name = person.property("name").unwrap();
    let mut serializer = EntitySerializer::new();
    serializer.register_converter(entigraph_serializer::IgnorePropertiesConverter::new("Person", ["name"]));
    serializer.register_resolver(|_: &Arc<Entity>, _: &PropertyDescriptor, value: &Value| {
        Some(Resolution::ready(value.clone()))
    });

    let resolved = serializer
        .resolve_value(&ann, &name, &ann.get("name"))
        .unwrap()
        .into_value()
        .await;
    let output = serializer.serialize(&ann, SerializationSettings::default()).unwrap();

    assert_eq!(resolved, Value::from("Ann"));
    assert!(!output.contains_key("name"));
}
