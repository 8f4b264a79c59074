//! Integration tests for minified keys and the key table cache
//!
//! # Test Coverage
//!
//! - The letter-repetition key sequence and its prefix property
//! - Alphabetical token assignment per schema
//! - Suffixed rewrite maps and their inverses
//! - Cache sharing across identical schemas and concurrent first use

mod common;

use brrtbind::key_cache::{self, KeyTableCache};
use brrtbind::minify::{generate_attribute_key, generate_minified_keys, KeyTable};
use brrtbind::model::{AttributeDescriptor, ModelSchema};
use common::fixtures;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

fn names_schema() -> Arc<ModelSchema> {
    ModelSchema::builder("MyModel")
        .attribute(AttributeDescriptor::string("name"))
        .attribute(AttributeDescriptor::string("first_name"))
        .attribute(AttributeDescriptor::string("last_name"))
        .build()
        .unwrap()
}

fn scalars_schema() -> Arc<ModelSchema> {
    ModelSchema::builder("Scalars")
        .attribute(AttributeDescriptor::boolean("boolean"))
        .attribute(AttributeDescriptor::float("float"))
        .attribute(AttributeDescriptor::integer("integer"))
        .attribute(AttributeDescriptor::string("string"))
        .build()
        .unwrap()
}

#[test]
fn test_generate_attribute_key() {
    assert_eq!(generate_attribute_key(0), "a");
    assert_eq!(generate_attribute_key(1), "b");
    assert_eq!(generate_attribute_key(25), "z");
    assert_eq!(generate_attribute_key(26), "aa");
    assert_eq!(generate_attribute_key(27), "bb");
    assert_eq!(generate_attribute_key(51), "zz");
    assert_eq!(generate_attribute_key(52), "aaa");
    assert_eq!(generate_attribute_key(54), "ccc");
    assert_eq!(generate_attribute_key(77), "zzz");
    assert_eq!(generate_attribute_key(78), "aaaa");
}

#[test]
fn test_generate_minified_keys() {
    assert_eq!(generate_minified_keys(3, ""), ["a", "b", "c"]);
    assert_eq!(generate_minified_keys(5, ""), ["a", "b", "c", "d", "e"]);
    assert_eq!(generate_minified_keys(3, "_"), ["_a", "_b", "_c"]);
    assert_eq!(generate_minified_keys(5, "_"), ["_a", "_b", "_c", "_d", "_e"]);
    assert!(generate_minified_keys(0, "_").is_empty());

    let keys = generate_minified_keys(29, "");
    assert_eq!(&keys[24..], ["y", "z", "aa", "bb", "cc"]);
}

#[test]
fn test_minified_keys_extend_as_prefixes() {
    let mut previous = Vec::new();
    for count in 0..120 {
        let keys = generate_minified_keys(count, "k");
        assert_eq!(&keys[..previous.len()], previous.as_slice());
        previous = keys;
    }

    let unique: std::collections::HashSet<_> = previous.iter().collect();
    assert_eq!(unique.len(), previous.len());
}

#[test]
fn test_generate_attribute_token_rewrite_map() {
    let schema = scalars_schema();
    let expected: BTreeMap<String, String> = [
        ("boolean", "a"),
        ("float", "b"),
        ("integer", "c"),
        ("string", "d"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(schema.generate_attribute_token_rewrite_map(), expected);
    assert_eq!(
        schema.generate_attribute_tokens(),
        ["boolean", "float", "integer", "string"]
    );
}

#[test]
fn test_attribute_rewrite_map() {
    let schema = names_schema();
    let suffix = schema.schema_token();
    let rewrite = schema.attribute_rewrite_map();

    assert_eq!(rewrite["first_name"], format!("a_{suffix}"));
    assert_eq!(rewrite["last_name"], format!("b_{suffix}"));
    assert_eq!(rewrite["name"], format!("c_{suffix}"));

    let reverse = schema.attribute_rewrite_reverse_map();
    assert_eq!(reverse.len(), 3);
    for (name, token) in &rewrite {
        assert_eq!(&reverse[token], name);
    }
}

#[test]
fn test_token_assignment_ignores_declaration_order() {
    let reordered = ModelSchema::builder("Reordered")
        .attribute(AttributeDescriptor::string("last_name"))
        .attribute(AttributeDescriptor::string("name"))
        .attribute(AttributeDescriptor::string("first_name"))
        .build()
        .unwrap();
    assert_eq!(
        reordered.generate_attribute_token_rewrite_map(),
        names_schema().generate_attribute_token_rewrite_map()
    );
}

#[test]
fn test_schema_tokens_differ_between_schemas() {
    let names = names_schema();
    let scalars = scalars_schema();
    assert_ne!(names.schema_token(), scalars.schema_token());
    assert_ne!(
        names.attribute_rewrite_map()["first_name"],
        fixtures::person().attribute_rewrite_map()["first_name"]
    );
}

#[test]
fn test_key_table_lookups() {
    let table = KeyTable::build(&names_schema());
    assert_eq!(table.model(), "MyModel");
    assert_eq!(table.sorted_names(), ["first_name", "last_name", "name"]);
    assert_eq!(table.token_for("name"), Some("c"));
    assert_eq!(table.name_for_token("a"), Some("first_name"));
    assert_eq!(table.token_for("missing"), None);
    assert_eq!(table.token_reverse_map().len(), 3);
}

#[test]
fn test_cache_shares_tables_of_identical_schemas() {
    let cache = KeyTableCache::new(true);
    let first = cache.get_or_build(&names_schema());
    let second = cache.get_or_build(&names_schema());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.size(), 1);

    cache.get_or_build(&scalars_schema());
    assert_eq!(cache.size(), 2);

    cache.clear();
    assert_eq!(cache.size(), 0);
    assert_eq!(*cache.get_or_build(&names_schema()), *first);
}

#[test]
fn test_disabled_cache_builds_equal_tables() {
    let cache = KeyTableCache::new(false);
    let first = cache.get_or_build(&names_schema());
    let second = cache.get_or_build(&names_schema());
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first, second);
    assert_eq!(cache.size(), 0);
}

#[test]
fn test_prebuild_visits_nested_schemas() {
    let cache = KeyTableCache::new(true);
    let family = fixtures::family();
    let visited = cache.prebuild([&family]);
    // Family, ChildA, ChildB
    assert_eq!(visited, 3);
    assert_eq!(cache.size(), 3);
}

#[test]
fn test_concurrent_first_use_builds_one_table() {
    let cache = KeyTableCache::new(true);
    let schema = fixtures::all_types();

    let tables: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| cache.get_or_build(&schema)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(cache.size(), 1);
    for table in &tables[1..] {
        assert!(Arc::ptr_eq(&tables[0], table));
    }
}

#[test]
fn test_global_cache_matches_direct_build() {
    let schema = names_schema();
    assert_eq!(*key_cache::key_table(&schema), KeyTable::build(&schema));
    assert_eq!(*schema.key_table(), KeyTable::build(&schema));
}
