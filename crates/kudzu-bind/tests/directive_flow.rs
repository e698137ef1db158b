//! End-to-end binding flows: directives loaded from JSON, resolved against
//! a live model, driven through edits, and torn down.

use std::cell::RefCell;
use std::rc::Rc;

use kudzu_bind::{
    BindingDirective, BindingScope, PropertySet, PropertyTarget, Transformer,
    TransformerRegistry,
};
use kudzu_observe::{ObsObject, Value, adapt};
use serde_json::json;

fn registry_with_upper() -> TransformerRegistry {
    let mut registry = TransformerRegistry::new();
    registry.register(Transformer::new("upper", |v| match v {
        Value::Str(s) => Value::Str(s.to_uppercase()),
        other => other.clone(),
    }));
    registry
}

#[test]
fn directives_from_json_drive_a_view() {
    let model = adapt(json!({
        "user": {"name": "ada", "age": 36}
    }));
    let model = model.as_object().unwrap().clone();
    let view = Rc::new(RefCell::new(PropertySet::with_properties([
        "nameLabel",
        "ageLabel",
    ])));
    let registry = registry_with_upper();

    let directives: Vec<BindingDirective> = serde_json::from_value(json!([
        {"source_key_path": "user.name", "target_property": "nameLabel", "transformer": "upper"},
        {"source_key_path": "user.age", "target_property": "ageLabel"}
    ]))
    .unwrap();

    let mut scope = BindingScope::new();
    for directive in &directives {
        let target: Rc<RefCell<dyn PropertyTarget>> = view.clone();
        scope.hold(directive.resolve(&model, target, &registry).unwrap());
    }

    // Initial pull, transformed.
    assert_eq!(
        view.borrow().get_property("nameLabel"),
        Some(Value::from("ADA"))
    );
    assert_eq!(view.borrow().get_property("ageLabel"), Some(Value::Int(36)));

    // A nested model edit flows through.
    let user = model.get("user").unwrap().as_object().cloned().unwrap();
    user.set("name", "grace");
    assert_eq!(
        view.borrow().get_property("nameLabel"),
        Some(Value::from("GRACE"))
    );
}

#[test]
fn two_way_edit_round_trip() {
    let model = ObsObject::new();
    let settings = ObsObject::new();
    settings.set("volume", 5);
    model.set("settings", settings.clone());

    let view = Rc::new(RefCell::new(PropertySet::with_properties(["slider"])));
    let registry = TransformerRegistry::new();

    let mut directive = BindingDirective::new("settings.volume", "slider");
    directive.two_way = true;
    let target: Rc<RefCell<dyn PropertyTarget>> = view.clone();
    let binding = directive.resolve(&model, target, &registry).unwrap();

    assert_eq!(view.borrow().get_property("slider"), Some(Value::Int(5)));

    // View edit flows back into the nested model object.
    view.borrow_mut().set_property("slider", Value::Int(9));
    binding.push_from_target().unwrap();
    assert_eq!(settings.get("volume"), Some(Value::Int(9)));

    // Model edit still flows forward.
    settings.set("volume", 2);
    assert_eq!(view.borrow().get_property("slider"), Some(Value::Int(2)));
}

#[test]
fn replacing_an_intermediate_updates_the_view() {
    let model = ObsObject::new();
    let first = ObsObject::new();
    first.set("name", "one");
    model.set("doc", first);

    let view = Rc::new(RefCell::new(PropertySet::with_properties(["title"])));
    let registry = TransformerRegistry::new();
    let target: Rc<RefCell<dyn PropertyTarget>> = view.clone();
    let _binding = BindingDirective::new("doc.name", "title")
        .resolve(&model, target, &registry)
        .unwrap();
    assert_eq!(view.borrow().get_property("title"), Some(Value::from("one")));

    let second = ObsObject::new();
    second.set("name", "two");
    model.set("doc", second.clone());
    assert_eq!(view.borrow().get_property("title"), Some(Value::from("two")));

    second.set("name", "three");
    assert_eq!(
        view.borrow().get_property("title"),
        Some(Value::from("three"))
    );
}

#[test]
fn scope_teardown_disconnects_the_view() {
    let model = ObsObject::new();
    model.set("status", "ready");
    let view = Rc::new(RefCell::new(PropertySet::with_properties(["label"])));
    let registry = TransformerRegistry::new();

    let mut scope = BindingScope::new();
    let target: Rc<RefCell<dyn PropertyTarget>> = view.clone();
    scope.hold(
        BindingDirective::new("status", "label")
            .resolve(&model, target, &registry)
            .unwrap(),
    );

    model.set("status", "busy");
    assert_eq!(
        view.borrow().get_property("label"),
        Some(Value::from("busy"))
    );

    scope.clear();
    model.set("status", "done");
    assert_eq!(
        view.borrow().get_property("label"),
        Some(Value::from("busy")),
        "no flow after teardown"
    );
}
