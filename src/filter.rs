//! # Attribute Filter Module
//!
//! A boolean visibility tree mirroring a [`ModelSchema`], applied symmetrically by
//! validation and serialization.
//!
//! A filter is always complete: it has exactly one entry per schema attribute, in
//! declaration order, and a nested filter for every model or array-of-model attribute.
//! Build a defaulted filter with [`AttributeFilter::from_model`], then flip individual
//! flags. Any access to a name the schema does not declare fails with
//! [`ModelError::Lookup`].

use crate::error::{ModelError, Violation};
use crate::model::ModelSchema;
use serde_json::{Map, Value as JsonValue};

/// Visibility of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEntry {
    /// Scalar or array-of-scalar attribute
    Visible(bool),
    /// Model or array-of-model attribute
    Nested(AttributeFilter),
}

impl FilterEntry {
    /// A nested entry is visible when any leaf below it is.
    pub fn is_visible(&self) -> bool {
        match self {
            FilterEntry::Visible(visible) => *visible,
            FilterEntry::Nested(child) => child.any_fields_enabled(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeFilter {
    model: String,
    entries: Vec<(String, FilterEntry)>,
}

impl AttributeFilter {
    /// A complete filter for `schema` with every leaf set to `default`.
    pub fn from_model(schema: &ModelSchema, default: bool) -> Self {
        let entries = schema
            .attributes()
            .iter()
            .map(|attribute| {
                let entry = match attribute.nested_schema() {
                    Some(nested) => FilterEntry::Nested(Self::from_model(nested, default)),
                    None => FilterEntry::Visible(default),
                };
                (attribute.name().to_string(), entry)
            })
            .collect();
        Self {
            model: schema.name().to_string(),
            entries,
        }
    }

    /// Name of the model this filter mirrors.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn entry(&self, name: &str) -> Result<&FilterEntry, ModelError> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entry)| entry)
            .ok_or_else(|| ModelError::lookup(&self.model, name))
    }

    /// Entry by declaration position. Only meaningful after [`Self::ensure_covers`].
    pub(crate) fn entry_at(&self, index: usize) -> Option<&FilterEntry> {
        self.entries.get(index).map(|(_, entry)| entry)
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut FilterEntry, ModelError> {
        let model = &self.model;
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, entry)| entry)
            .ok_or_else(|| ModelError::lookup(model, name))
    }

    pub fn is_visible(&self, name: &str) -> Result<bool, ModelError> {
        self.entry(name).map(FilterEntry::is_visible)
    }

    /// Set one flag. On a nested entry this enables or disables the whole subtree.
    pub fn set(&mut self, name: &str, visible: bool) -> Result<(), ModelError> {
        match self.entry_mut(name)? {
            FilterEntry::Visible(flag) => *flag = visible,
            FilterEntry::Nested(child) => child.set_all(visible),
        }
        Ok(())
    }

    /// Builder form of [`AttributeFilter::set`].
    pub fn with(mut self, name: &str, visible: bool) -> Result<Self, ModelError> {
        self.set(name, visible)?;
        Ok(self)
    }

    pub fn set_all(&mut self, visible: bool) {
        for (_, entry) in &mut self.entries {
            match entry {
                FilterEntry::Visible(flag) => *flag = visible,
                FilterEntry::Nested(child) => child.set_all(visible),
            }
        }
    }

    pub fn child(&self, name: &str) -> Result<&AttributeFilter, ModelError> {
        match self.entry(name)? {
            FilterEntry::Nested(child) => Ok(child),
            FilterEntry::Visible(_) => Err(ModelError::lookup(&self.model, name)),
        }
    }

    pub fn child_mut(&mut self, name: &str) -> Result<&mut AttributeFilter, ModelError> {
        let model = self.model.clone();
        match self.entry_mut(name)? {
            FilterEntry::Nested(child) => Ok(child),
            FilterEntry::Visible(_) => Err(ModelError::lookup(model, name)),
        }
    }

    /// Replace a nested filter. The replacement must mirror the same model.
    pub fn set_child(&mut self, name: &str, filter: AttributeFilter) -> Result<(), ModelError> {
        let child = self.child_mut(name)?;
        if child.model != filter.model || child.keys() != filter.keys() {
            return Err(ModelError::lookup(&filter.model, name));
        }
        *child = filter;
        Ok(())
    }

    /// True iff at least one leaf flag, transitively, is set.
    pub fn any_fields_enabled(&self) -> bool {
        self.entries.iter().any(|(_, entry)| entry.is_visible())
    }

    /// Check that this level covers exactly the attributes of `schema`, in order, with a
    /// nested filter wherever the attribute holds models.
    pub(crate) fn ensure_covers(&self, schema: &ModelSchema) -> Result<(), ModelError> {
        let attributes = schema.attributes();
        for (attribute, (name, entry)) in attributes.iter().zip(&self.entries) {
            if attribute.name() != name {
                return Err(if schema.contains(name) {
                    ModelError::lookup(&self.model, attribute.name())
                } else {
                    ModelError::lookup(schema.name(), name)
                });
            }
            // a leaf flag cannot stand in for a nested filter, nor the reverse
            if matches!(entry, FilterEntry::Nested(_)) != attribute.nested_schema().is_some() {
                return Err(ModelError::lookup(schema.name(), name));
            }
        }
        if let Some((name, _)) = self.entries.get(attributes.len()) {
            return Err(ModelError::lookup(schema.name(), name));
        }
        if let Some(attribute) = attributes.get(self.entries.len()) {
            return Err(ModelError::lookup(&self.model, attribute.name()));
        }
        Ok(())
    }

    /// Wire form used by client artifacts.
    ///
    /// Visible leaves are always emitted and nested filters are emitted when they are
    /// not empty. With `complete`, every key is present: hidden leaves as `false` and
    /// nested filters as their complete form, or `false` when nothing below is enabled.
    pub fn to_value(&self, complete: bool) -> JsonValue {
        let mut out = Map::new();
        for (name, entry) in &self.entries {
            match entry {
                FilterEntry::Visible(visible) => {
                    if *visible || complete {
                        out.insert(name.clone(), JsonValue::Bool(*visible));
                    }
                }
                FilterEntry::Nested(child) => {
                    if child.any_fields_enabled() {
                        out.insert(name.clone(), child.to_value(complete));
                    } else if complete {
                        out.insert(name.clone(), JsonValue::Bool(false));
                    }
                }
            }
        }
        JsonValue::Object(out)
    }

    /// Parse the wire form: start from an all-hidden filter for `schema` and apply each
    /// flag. `true`/`false` on a nested attribute switches its whole subtree.
    pub fn from_value(schema: &ModelSchema, value: &JsonValue) -> Result<Self, ModelError> {
        let mut filter = Self::from_model(schema, false);
        filter.apply(value, "")?;
        Ok(filter)
    }

    fn apply(&mut self, value: &JsonValue, path: &str) -> Result<(), ModelError> {
        let JsonValue::Object(flags) = value else {
            return Err(ModelError::violation(
                path,
                Violation::Type { expected: "object" },
            ));
        };
        for (name, flag) in flags {
            let entry = self.entry_mut(name)?;
            let entry_path = if path.is_empty() {
                name.clone()
            } else {
                format!("{path}.{name}")
            };
            match (entry, flag) {
                (FilterEntry::Visible(visible), JsonValue::Bool(b)) => *visible = *b,
                (FilterEntry::Nested(child), JsonValue::Bool(b)) => child.set_all(*b),
                (FilterEntry::Nested(child), JsonValue::Object(_)) => {
                    child.apply(flag, &entry_path)?
                }
                (FilterEntry::Visible(_), _) => {
                    return Err(ModelError::violation(
                        entry_path,
                        Violation::Type { expected: "boolean" },
                    ))
                }
                (FilterEntry::Nested(_), _) => {
                    return Err(ModelError::violation(
                        entry_path,
                        Violation::Type {
                            expected: "boolean or object",
                        },
                    ))
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeDescriptor;
    use serde_json::json;
    use std::sync::Arc;

    fn parent() -> Arc<ModelSchema> {
        let child = ModelSchema::builder("Child")
            .attribute(AttributeDescriptor::string("name"))
            .attribute(AttributeDescriptor::integer("age"))
            .build()
            .unwrap();
        ModelSchema::builder("Parent")
            .attribute(AttributeDescriptor::string("title"))
            .attribute(AttributeDescriptor::model("child", &child))
            .attribute(AttributeDescriptor::array(
                "children",
                AttributeDescriptor::model("element", &child),
            ))
            .attribute(AttributeDescriptor::array("tags", AttributeDescriptor::string("tag")))
            .build()
            .unwrap()
    }

    #[test]
    fn from_model_mirrors_schema_at_every_level() {
        let schema = parent();
        let filter = AttributeFilter::from_model(&schema, true);
        assert_eq!(filter.keys(), schema.attribute_keys());
        assert_eq!(filter.child("child").unwrap().keys(), ["name", "age"]);
        assert_eq!(filter.child("children").unwrap().keys(), ["name", "age"]);
        assert!(matches!(filter.entry("tags"), Ok(FilterEntry::Visible(true))));
    }

    #[test]
    fn unknown_names_are_lookup_errors() {
        let mut filter = AttributeFilter::from_model(&parent(), false);
        assert!(filter.set("missing", true).unwrap_err().is_lookup());
        assert!(filter.is_visible("missing").unwrap_err().is_lookup());
        assert!(filter.child("title").unwrap_err().is_lookup());
    }

    #[test]
    fn nested_visibility_follows_leaves() {
        let mut filter = AttributeFilter::from_model(&parent(), false);
        assert!(!filter.is_visible("child").unwrap());
        filter.child_mut("child").unwrap().set("age", true).unwrap();
        assert!(filter.is_visible("child").unwrap());
        assert!(filter.any_fields_enabled());

        filter.set("child", false).unwrap();
        assert!(!filter.any_fields_enabled());
        filter.set("children", true).unwrap();
        assert!(filter.child("children").unwrap().is_visible("name").unwrap());
    }

    #[test]
    fn wire_form_round_trips() {
        let schema = parent();
        let filter = AttributeFilter::from_model(&schema, false)
            .with("title", true)
            .unwrap();
        assert_eq!(filter.to_value(false), json!({"title": true}));
        assert_eq!(
            filter.to_value(true),
            json!({"title": true, "child": false, "children": false, "tags": false})
        );

        let parsed = AttributeFilter::from_value(
            &schema,
            &json!({"title": true, "child": {"age": true}, "children": true}),
        )
        .unwrap();
        assert!(parsed.is_visible("title").unwrap());
        assert!(!parsed.child("child").unwrap().is_visible("name").unwrap());
        assert!(parsed.child("child").unwrap().is_visible("age").unwrap());
        assert!(parsed.child("children").unwrap().is_visible("name").unwrap());
        assert!(!parsed.is_visible("tags").unwrap());
    }

    #[test]
    fn from_value_rejects_unknown_names_and_bad_shapes() {
        let schema = parent();
        let err = AttributeFilter::from_value(&schema, &json!({"nope": true})).unwrap_err();
        assert!(err.is_lookup());
        assert!(AttributeFilter::from_value(&schema, &json!([true])).is_err());
        assert!(AttributeFilter::from_value(&schema, &json!({"title": {"x": true}})).is_err());
    }

    #[test]
    fn ensure_covers_detects_drift() {
        let schema = parent();
        let filter = AttributeFilter::from_model(&schema, true);
        assert!(filter.ensure_covers(&schema).is_ok());

        let other = ModelSchema::builder("Parent")
            .attribute(AttributeDescriptor::string("title"))
            .build()
            .unwrap();
        assert!(filter.ensure_covers(&other).unwrap_err().is_lookup());

        // same names, but `child` is a plain string here
        let flat = ModelSchema::builder("Parent")
            .attribute(AttributeDescriptor::string("title"))
            .attribute(AttributeDescriptor::string("child"))
            .build()
            .unwrap();
        let err = filter.ensure_covers(&flat).unwrap_err();
        assert!(err.is_lookup());
        let err = AttributeFilter::from_model(&flat, true)
            .ensure_covers(&schema)
            .unwrap_err();
        assert!(err.is_lookup());
    }
}
