//! Model schemas: ordered attribute declarations, registered explicitly.

use super::{AttributeDescriptor, ModelInstance};
use crate::error::ModelError;
use crate::filter::AttributeFilter;
use crate::key_cache;
use crate::minify::KeyTable;
use crate::validator::{self, ValidateOptions};
use serde_json::{json, Map, Value as JsonValue};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Stable identifier of a schema: `"<name>:<fingerprint prefix>"`.
///
/// Two schemas with the same name and the same attribute shapes share an id, which is
/// what the process-wide key table cache is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(String);

impl SchemaId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The static shape of a model.
///
/// Built once through [`ModelSchema::builder`] and shared behind an `Arc`. The attribute
/// list is fully merged: inherited attributes come first in ancestor declaration order,
/// an attribute redeclared by a descendant replaces the inherited one in place, and new
/// attributes follow in declaration order.
#[derive(Debug)]
pub struct ModelSchema {
    name: String,
    id: SchemaId,
    token: String,
    description: Option<String>,
    required: bool,
    parent: Option<Arc<ModelSchema>>,
    attributes: Vec<AttributeDescriptor>,
}

impl ModelSchema {
    pub fn builder(name: impl Into<String>) -> ModelSchemaBuilder {
        ModelSchemaBuilder {
            name: name.into(),
            description: None,
            required: true,
            parent: None,
            attributes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &SchemaId {
        &self.id
    }

    /// Six lowercase letters, stable for the schema's lifetime.
    pub fn schema_token(&self) -> &str {
        &self.token
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether instances of this schema are required unless a parent attribute says otherwise.
    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn parent(&self) -> Option<&Arc<ModelSchema>> {
        self.parent.as_ref()
    }

    /// All attributes, inherited ones included, in declaration order.
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub(crate) fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    /// Number of attributes at this level and above. Nested models and arrays count once.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn attribute_keys(&self) -> Vec<&str> {
        self.attributes.iter().map(AttributeDescriptor::name).collect()
    }

    /// Name lookup across the whole ancestor chain.
    pub fn contains(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn blueprint(&self) -> JsonValue {
        self.blueprint_with(self.required, self.description.as_deref())
    }

    pub(crate) fn blueprint_with(&self, required: bool, description: Option<&str>) -> JsonValue {
        let fields: Map<String, JsonValue> = self
            .attributes
            .iter()
            .map(|a| (a.name().to_string(), a.blueprint()))
            .collect();
        json!({
            "type": "model",
            "constraints": {
                "required": required,
                "description": description,
            },
            "fields": fields,
        })
    }

    /// Minified key table for this schema, from the process-wide cache.
    pub fn key_table(&self) -> Arc<KeyTable> {
        key_cache::key_table(self)
    }

    /// Attribute names sorted alphabetically, the order tokens are assigned in.
    pub fn generate_attribute_tokens(&self) -> Vec<String> {
        self.key_table().sorted_names().to_vec()
    }

    /// `attribute name -> token` (`a`, `b`, ...).
    pub fn generate_attribute_token_rewrite_map(&self) -> BTreeMap<String, String> {
        self.key_table().token_map().clone()
    }

    /// `attribute name -> "<token>_<schema token>"`.
    pub fn attribute_rewrite_map(&self) -> BTreeMap<String, String> {
        self.key_table().rewrite_map().clone()
    }

    pub fn attribute_rewrite_reverse_map(&self) -> BTreeMap<String, String> {
        self.key_table().rewrite_reverse_map().clone()
    }

    /// A fresh instance: defaults applied, nested models instantiated, arrays empty.
    pub fn new_instance(self: &Arc<Self>) -> ModelInstance {
        ModelInstance::new(self)
    }

    pub fn attribute_filter(&self, default: bool) -> AttributeFilter {
        AttributeFilter::from_model(self, default)
    }

    /// See [`crate::validator::validate`].
    pub fn validate(
        self: &Arc<Self>,
        raw: Option<&JsonValue>,
        options: &ValidateOptions<'_>,
    ) -> Result<Option<ModelInstance>, ModelError> {
        validator::validate(self, raw, options)
    }
}

/// Registers the attributes of a [`ModelSchema`].
///
/// ```rust
/// use brrtbind::model::{AttributeDescriptor, ModelSchema};
///
/// let person = ModelSchema::builder("Person")
///     .attribute(AttributeDescriptor::string("first_name"))
///     .attribute(AttributeDescriptor::string("last_name").optional())
///     .build()
///     .unwrap();
/// let employee = ModelSchema::builder("Employee")
///     .extends(&person)
///     .attribute(AttributeDescriptor::integer("staff_id"))
///     .build()
///     .unwrap();
/// assert_eq!(employee.attribute_count(), 3);
/// assert!(employee.contains("first_name"));
/// ```
#[derive(Debug)]
pub struct ModelSchemaBuilder {
    name: String,
    description: Option<String>,
    required: bool,
    parent: Option<Arc<ModelSchema>>,
    attributes: Vec<AttributeDescriptor>,
}

impl ModelSchemaBuilder {
    pub fn extends(mut self, parent: &Arc<ModelSchema>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn attribute(mut self, descriptor: AttributeDescriptor) -> Self {
        self.attributes.push(descriptor);
        self
    }

    pub fn attributes<I>(mut self, descriptors: I) -> Self
    where
        I: IntoIterator<Item = AttributeDescriptor>,
    {
        self.attributes.extend(descriptors);
        self
    }

    pub fn build(self) -> Result<Arc<ModelSchema>, ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::definition(
                "",
                "",
                "model name must not be empty",
            ));
        }

        let mut seen = HashSet::new();
        for descriptor in &self.attributes {
            if !seen.insert(descriptor.name()) {
                return Err(ModelError::definition(
                    &self.name,
                    descriptor.name(),
                    "attribute declared more than once",
                ));
            }
        }

        let mut merged: Vec<AttributeDescriptor> = self
            .parent
            .as_ref()
            .map(|p| p.attributes.clone())
            .unwrap_or_default();
        for mut descriptor in self.attributes {
            descriptor.finalize(&self.name)?;
            match merged.iter().position(|a| a.name() == descriptor.name()) {
                Some(index) => merged[index] = descriptor,
                None => merged.push(descriptor),
            }
        }

        let digest = fingerprint(&self.name, &merged);
        let hex: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
        let token: String = digest
            .iter()
            .take(6)
            .map(|b| char::from(b'a' + b % 26))
            .collect();

        Ok(Arc::new(ModelSchema {
            id: SchemaId(format!("{}:{}", self.name, hex)),
            token,
            name: self.name,
            description: self.description,
            required: self.required,
            parent: self.parent,
            attributes: merged,
        }))
    }
}

fn fingerprint(name: &str, attributes: &[AttributeDescriptor]) -> Vec<u8> {
    let mut entries: Vec<(&str, String)> = attributes
        .iter()
        .map(|a| (a.name(), a.kind().label()))
        .collect();
    entries.sort();

    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b"\n");
    for (attribute, label) in entries {
        hasher.update(attribute.as_bytes());
        hasher.update(b":");
        hasher.update(label.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Arc<ModelSchema> {
        ModelSchema::builder("Person")
            .attribute(AttributeDescriptor::string("name"))
            .attribute(AttributeDescriptor::string("first_name"))
            .attribute(AttributeDescriptor::string("last_name"))
            .build()
            .unwrap()
    }

    #[test]
    fn keys_follow_declaration_order() {
        assert_eq!(person().attribute_keys(), ["name", "first_name", "last_name"]);
    }

    #[test]
    fn redeclared_attribute_replaces_in_place() {
        let base = person();
        let derived = ModelSchema::builder("Derived")
            .extends(&base)
            .attribute(AttributeDescriptor::integer("age"))
            .attribute(AttributeDescriptor::string("first_name").max_length(5))
            .build()
            .unwrap();
        assert_eq!(
            derived.attribute_keys(),
            ["name", "first_name", "last_name", "age"]
        );
        let first = derived.attribute("first_name").unwrap();
        assert_eq!(first.constraints().max_length, Some(5));
        // parent unaffected
        assert_eq!(base.attribute("first_name").unwrap().constraints().max_length, None);
    }

    #[test]
    fn duplicate_attribute_is_a_definition_error() {
        let err = ModelSchema::builder("Broken")
            .attribute(AttributeDescriptor::string("name"))
            .attribute(AttributeDescriptor::integer("name"))
            .build()
            .unwrap_err();
        assert!(err.is_schema_definition());
    }

    #[test]
    fn id_and_token_are_stable_and_shape_sensitive() {
        let a = person();
        let b = person();
        assert_eq!(a.id(), b.id());
        assert_eq!(a.schema_token(), b.schema_token());
        assert_eq!(a.schema_token().len(), 6);
        assert!(a.schema_token().chars().all(|c| c.is_ascii_lowercase()));
        assert!(a.id().as_str().starts_with("Person:"));

        let other = ModelSchema::builder("Person")
            .attribute(AttributeDescriptor::integer("name"))
            .build()
            .unwrap();
        assert_ne!(a.id(), other.id());
    }

    #[test]
    fn blueprint_shape() {
        let blueprint = person().blueprint();
        assert_eq!(blueprint["type"], "model");
        assert_eq!(blueprint["constraints"]["required"], true);
        assert!(blueprint["constraints"]["description"].is_null());
        assert_eq!(blueprint["fields"]["name"]["type"], "string");
    }
}
