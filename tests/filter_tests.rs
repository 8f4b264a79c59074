//! Integration tests for attribute filters
//!
//! Covers filter construction from schemas (including arrays of models), subtree
//! switching, the wire form, and lookups of undeclared names.

mod common;

use brrtbind::filter::{AttributeFilter, FilterEntry};
use brrtbind::model::{AttributeDescriptor, ModelSchema};
use common::fixtures;
use serde_json::json;

#[test]
fn test_filter_of_empty_model_has_no_keys() {
    let empty = ModelSchema::builder("Empty").build().unwrap();
    let filter = empty.attribute_filter(true);
    assert!(filter.keys().is_empty());
    assert!(filter.is_empty());
    assert!(!filter.any_fields_enabled());
}

#[test]
fn test_filter_mirrors_nested_models() {
    let sub = ModelSchema::builder("SubModel")
        .attribute(AttributeDescriptor::string("colour"))
        .build()
        .unwrap();
    let schema = ModelSchema::builder("MyModel")
        .attribute(AttributeDescriptor::string("name"))
        .attribute(AttributeDescriptor::model("sub", &sub))
        .build()
        .unwrap();

    let filter = schema.attribute_filter(true);
    assert_eq!(filter.keys(), vec!["name", "sub"]);
    assert_eq!(filter.model(), "MyModel");
    assert!(filter.is_visible("name").unwrap());
    assert!(filter.is_visible("sub").unwrap());
    assert!(filter.child("sub").unwrap().is_visible("colour").unwrap());
    assert_eq!(filter.child("sub").unwrap().model(), "SubModel");
}

#[test]
fn test_array_of_models_gets_a_nested_filter() {
    let schema = fixtures::parent_with_children();
    let mut filter = schema.attribute_filter(false);

    assert!(matches!(filter.entry("children").unwrap(), FilterEntry::Nested(_)));
    assert!(!filter.is_visible("children").unwrap());

    filter.child_mut("children").unwrap().set("child_age", true).unwrap();
    assert!(filter.is_visible("children").unwrap());
    assert!(filter.any_fields_enabled());

    let tags = ModelSchema::builder("Tags")
        .attribute(AttributeDescriptor::array("tags", AttributeDescriptor::string("tag")))
        .build()
        .unwrap();
    let filter = tags.attribute_filter(true);
    assert_eq!(filter.entry("tags").unwrap(), &FilterEntry::Visible(true));
}

#[test]
fn test_setting_nested_entry_switches_subtree() {
    let schema = fixtures::family();
    let mut filter = schema.attribute_filter(false);

    filter.set("children", true).unwrap();
    let child_a = filter.child("children").unwrap();
    assert!(child_a.is_visible("child_a_name").unwrap());
    assert!(child_a.child("children").unwrap().is_visible("child_b_age").unwrap());
    assert!(!filter.is_visible("parent_name").unwrap());

    filter.set_all(false);
    assert!(!filter.any_fields_enabled());
}

#[test]
fn test_unknown_names_are_lookup_errors() {
    let schema = fixtures::person();
    let mut filter = schema.attribute_filter(true);

    assert!(filter.is_visible("missing").unwrap_err().is_lookup());
    assert!(filter.set("missing", false).unwrap_err().is_lookup());
    // scalar entries have no child filter
    assert!(filter.child("first_name").is_err());
}

#[test]
fn test_set_child_requires_matching_model() {
    let schema = fixtures::all_types();
    let mut filter = schema.attribute_filter(true);

    let replacement = fixtures::sub_model().attribute_filter(false);
    filter.set_child("sub", replacement).unwrap();
    assert!(!filter.is_visible("sub").unwrap());

    let wrong = fixtures::person().attribute_filter(true);
    assert!(filter.set_child("sub", wrong).is_err());
}

#[test]
fn test_wire_form() {
    let schema = fixtures::parent_with_children();
    let filter = AttributeFilter::from_model(&schema, false)
        .with("parent_name", true)
        .unwrap();

    assert_eq!(filter.to_value(false), json!({"parent_name": true}));
    assert_eq!(
        filter.to_value(true),
        json!({"parent_name": true, "parent_percent": false, "children": false})
    );

    let parsed = AttributeFilter::from_value(
        &schema,
        &json!({"parent_percent": true, "children": {"child_name": true}}),
    )
    .unwrap();
    assert!(!parsed.is_visible("parent_name").unwrap());
    assert!(parsed.is_visible("parent_percent").unwrap());
    let children = parsed.child("children").unwrap();
    assert!(children.is_visible("child_name").unwrap());
    assert!(!children.is_visible("child_age").unwrap());

    let round_trip = AttributeFilter::from_value(&schema, &parsed.to_value(true)).unwrap();
    assert_eq!(round_trip, parsed);
}

#[test]
fn test_wire_form_rejects_bad_shapes() {
    let schema = fixtures::parent_with_children();

    let err = AttributeFilter::from_value(&schema, &json!({"nobody": true})).unwrap_err();
    assert!(err.is_lookup());

    let err =
        AttributeFilter::from_value(&schema, &json!({"children": {"child_age": "yes"}}))
            .unwrap_err();
    assert_eq!(err.path(), Some("children.child_age"));

    assert!(AttributeFilter::from_value(&schema, &json!([true])).is_err());
}
