//! # Minified Key Module
//!
//! Deterministic short keys for attribute names.
//!
//! Keys come from a letter-repetition sequence over the lowercase alphabet: indices
//! 0-25 map to `a`..`z`, 26-51 to `aa`..`zz`, 52-77 to `aaa`..`zzz`, and so on. This is
//! not positional base-26; index 27 is `bb`, not `ab`.
//!
//! A schema's tokens are assigned to its attribute names sorted alphabetically, so the
//! assignment depends only on the set of names and never on declaration order.
//!
//! ```rust
//! use brrtbind::minify::{generate_attribute_key, generate_minified_keys};
//!
//! assert_eq!(generate_attribute_key(0), "a");
//! assert_eq!(generate_attribute_key(26), "aa");
//! assert_eq!(generate_attribute_key(27), "bb");
//! assert_eq!(generate_minified_keys(3, "_"), ["_a", "_b", "_c"]);
//! ```

use crate::model::ModelSchema;
use std::collections::BTreeMap;

const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Key for the attribute at `index` in alphabetical order.
pub fn generate_attribute_key(index: usize) -> String {
    let letter = char::from(ALPHABET[index % ALPHABET.len()]);
    let repeat = index / ALPHABET.len() + 1;
    std::iter::repeat(letter).take(repeat).collect()
}

/// The first `count` keys of the sequence, each prefixed with `prefix`.
pub fn generate_minified_keys(count: usize, prefix: &str) -> Vec<String> {
    (0..count)
        .map(|index| format!("{prefix}{}", generate_attribute_key(index)))
        .collect()
}

/// Token assignments of one schema.
///
/// Built once per schema and shared through [`crate::key_cache`]. All four maps are
/// bijections over the schema's attribute names; each reverse map is the exact inverse
/// of its forward map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTable {
    model: String,
    schema_token: String,
    sorted_names: Vec<String>,
    token_map: BTreeMap<String, String>,
    token_reverse_map: BTreeMap<String, String>,
    rewrite_map: BTreeMap<String, String>,
    rewrite_reverse_map: BTreeMap<String, String>,
}

impl KeyTable {
    pub fn build(schema: &ModelSchema) -> Self {
        let mut sorted_names: Vec<String> = schema
            .attributes()
            .iter()
            .map(|a| a.name().to_string())
            .collect();
        sorted_names.sort();

        let schema_token = schema.schema_token().to_string();
        let mut token_map = BTreeMap::new();
        let mut token_reverse_map = BTreeMap::new();
        let mut rewrite_map = BTreeMap::new();
        let mut rewrite_reverse_map = BTreeMap::new();
        for (index, name) in sorted_names.iter().enumerate() {
            let key = generate_attribute_key(index);
            let suffixed = format!("{key}_{schema_token}");
            token_reverse_map.insert(key.clone(), name.clone());
            token_map.insert(name.clone(), key);
            rewrite_reverse_map.insert(suffixed.clone(), name.clone());
            rewrite_map.insert(name.clone(), suffixed);
        }

        Self {
            model: schema.name().to_string(),
            schema_token,
            sorted_names,
            token_map,
            token_reverse_map,
            rewrite_map,
            rewrite_reverse_map,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn schema_token(&self) -> &str {
        &self.schema_token
    }

    /// Attribute names, not tokens, sorted alphabetically. The name at index `i`
    /// gets token `generate_attribute_key(i)`.
    pub fn sorted_names(&self) -> &[String] {
        &self.sorted_names
    }

    /// `name -> token`, the keys used on the wire when minifying.
    pub fn token_map(&self) -> &BTreeMap<String, String> {
        &self.token_map
    }

    pub fn token_reverse_map(&self) -> &BTreeMap<String, String> {
        &self.token_reverse_map
    }

    /// `name -> "<token>_<schema token>"`, unique across schemas.
    pub fn rewrite_map(&self) -> &BTreeMap<String, String> {
        &self.rewrite_map
    }

    pub fn rewrite_reverse_map(&self) -> &BTreeMap<String, String> {
        &self.rewrite_reverse_map
    }

    pub fn token_for(&self, name: &str) -> Option<&str> {
        self.token_map.get(name).map(String::as_str)
    }

    pub fn name_for_token(&self, token: &str) -> Option<&str> {
        self.token_reverse_map.get(token).map(String::as_str)
    }
}
