//! # Validation Pipeline
//!
//! Turns untyped wire data (`serde_json::Value`) into a [`ModelInstance`], recursively.
//!
//! For each attribute of the schema, in declaration order:
//!
//! 1. If an [`AttributeFilter`] is given and the attribute is hidden, the instance
//!    value is `null` and nothing else is checked for it or its children
//! 2. The raw value is looked up by plain name, or by minified token when `minified`
//! 3. Nested models and arrays recurse with the matching child filter. An optional
//!    model that is absent or `null` becomes a fresh instance, as in
//!    [`ModelInstance::new`], so nested models are only ever `null` when hidden
//! 4. Scalars are coerced to their type and checked against their constraints
//!
//! The first failure aborts the whole call. Errors carry the full path of the field,
//! e.g. `children[0].child_b_name`. Nothing is logged here; reporting is the caller's
//! business.

use crate::error::{ModelError, Violation};
use crate::filter::{AttributeFilter, FilterEntry};
use crate::model::{AttributeDescriptor, AttributeKind, ModelInstance, ModelSchema, Value};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Options for [`validate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions<'a> {
    /// Visibility mask; `None` means every attribute is visible
    pub attribute_filter: Option<&'a AttributeFilter>,
    /// Look raw values up by minified token instead of attribute name
    pub minified: bool,
    /// Overrides the schema's own required flag for the root model
    pub required: Option<bool>,
}

/// Validate `raw` against `schema`.
///
/// Returns `Ok(None)` only when the root is absent or `null` and the model is not
/// required. A root that is not a JSON object always fails with
/// [`ModelError::RequiredAttribute`].
///
/// ```rust
/// use brrtbind::model::{AttributeDescriptor, ModelSchema};
/// use brrtbind::validator::{validate, ValidateOptions};
/// use serde_json::json;
///
/// let schema = ModelSchema::builder("Person")
///     .attribute(AttributeDescriptor::string("name"))
///     .attribute(AttributeDescriptor::integer("age").optional())
///     .build()
///     .unwrap();
/// let raw = json!({"name": "Ada", "age": "36"});
/// let person = validate(&schema, Some(&raw), &ValidateOptions::default())
///     .unwrap()
///     .unwrap();
/// assert_eq!(person.get("age").unwrap().as_i64(), Some(36));
/// ```
pub fn validate(
    schema: &Arc<ModelSchema>,
    raw: Option<&JsonValue>,
    options: &ValidateOptions<'_>,
) -> Result<Option<ModelInstance>, ModelError> {
    let required = options.required.unwrap_or_else(|| schema.is_required());
    validate_model(
        schema,
        raw,
        required,
        schema.description(),
        options.attribute_filter,
        options.minified,
    )
}

fn validate_model(
    schema: &Arc<ModelSchema>,
    raw: Option<&JsonValue>,
    required: bool,
    description: Option<&str>,
    filter: Option<&AttributeFilter>,
    minified: bool,
) -> Result<Option<ModelInstance>, ModelError> {
    let object = match raw {
        None | Some(JsonValue::Null) if !required => return Ok(None),
        Some(JsonValue::Object(object)) => object,
        _ => {
            return Err(ModelError::RequiredAttribute {
                path: String::new(),
            })
        }
    };

    if let Some(filter) = filter {
        filter.ensure_covers(schema)?;
    }
    let keys = minified.then(|| schema.key_table());

    let mut values = Vec::with_capacity(schema.attribute_count());
    for (index, attribute) in schema.attributes().iter().enumerate() {
        let name = attribute.name();
        let entry = filter.and_then(|f| f.entry_at(index));
        if entry.is_some_and(|e| !e.is_visible()) {
            values.push(Value::Null);
            continue;
        }
        let key = keys
            .as_ref()
            .and_then(|table| table.token_for(name))
            .unwrap_or(name);
        let child_filter = match entry {
            Some(FilterEntry::Nested(child)) => Some(child),
            _ => None,
        };
        let value = validate_attribute(attribute, object.get(key), child_filter, minified)
            .map_err(|e| e.nested(name))?;
        values.push(value);
    }

    Ok(Some(ModelInstance::from_parts(
        schema,
        values,
        required,
        description.map(str::to_string),
    )))
}

/// Errors are relative to the attribute; the caller adds its name.
fn validate_attribute(
    attribute: &AttributeDescriptor,
    raw: Option<&JsonValue>,
    filter: Option<&AttributeFilter>,
    minified: bool,
) -> Result<Value, ModelError> {
    match attribute.kind() {
        AttributeKind::Scalar(_) => attribute
            .coerce(raw)
            .map_err(|v| ModelError::violation("", v)),
        AttributeKind::Model(schema) => {
            let description = attribute
                .description_text()
                .or_else(|| schema.description());
            let child = match validate_model(
                schema,
                raw,
                attribute.is_required(),
                description,
                filter,
                minified,
            )? {
                Some(child) => child,
                // an absent optional child comes back as a fresh instance
                None => {
                    let fresh = ModelInstance::masked(schema, filter)?.with_required(false);
                    match description {
                        Some(description) => fresh.with_description(description),
                        None => fresh,
                    }
                }
            };
            Ok(Value::Model(child))
        }
        AttributeKind::Array(element) => {
            let items = match raw {
                None | Some(JsonValue::Null) if attribute.is_required() => {
                    return Err(ModelError::violation("", Violation::Required))
                }
                None | Some(JsonValue::Null) => return Ok(Value::Array(Vec::new())),
                Some(JsonValue::Array(items)) => items,
                Some(_) => {
                    return Err(ModelError::violation(
                        "",
                        Violation::Type { expected: "array" },
                    ))
                }
            };
            attribute
                .check_length(items.len())
                .map_err(|v| ModelError::violation("", v))?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    validate_attribute(element, Some(item), filter, minified)
                        .map_err(|e| e.nested(&format!("[{i}]")))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
    }
}
