//! # Serialization Pipeline
//!
//! Turns a [`ModelInstance`] back into untyped wire data. Key selection (plain or
//! minified) and filtering mirror [`crate::validator`], so validating the output of
//! [`serialize`] with the same options reproduces the instance.
//!
//! Omission rules, unless `complete` is set:
//!
//! - hidden attributes are left out
//! - `null` scalars are left out
//! - falsy scalars (`""`, `false`, `0`, `0.0`) are left out only when equal to the
//!   attribute's default, which validation restores
//! - nested models and arrays are left out when empty, unless the attribute is required;
//!   validation turns them back into a fresh instance or `[]`
//!
//! With `complete` every key is emitted: `false` for hidden attributes and `null` for
//! unset values.

use crate::error::{ModelError, Violation};
use crate::filter::{AttributeFilter, FilterEntry};
use crate::model::{AttributeDescriptor, AttributeKind, ModelInstance, Value};
use serde_json::{Map, Value as JsonValue};

/// Options for [`serialize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeOptions<'a> {
    /// Visibility mask; `None` means every attribute is visible
    pub attribute_filter: Option<&'a AttributeFilter>,
    /// Emit minified tokens instead of attribute names
    pub minified: bool,
    /// Emit every key, marking hidden attributes `false`
    pub complete: bool,
}

/// Serialize `instance` to a JSON object.
pub fn serialize(
    instance: &ModelInstance,
    options: &SerializeOptions<'_>,
) -> Result<JsonValue, ModelError> {
    serialize_model(instance, options.attribute_filter, options).map(JsonValue::Object)
}

fn serialize_model(
    instance: &ModelInstance,
    filter: Option<&AttributeFilter>,
    options: &SerializeOptions<'_>,
) -> Result<Map<String, JsonValue>, ModelError> {
    let schema = instance.schema();
    if let Some(filter) = filter {
        filter.ensure_covers(schema)?;
    }
    let keys = options.minified.then(|| schema.key_table());

    let mut out = Map::new();
    for (index, (attribute, value)) in instance.iter().enumerate() {
        let name = attribute.name();
        let key = keys
            .as_ref()
            .and_then(|table| table.token_for(name))
            .unwrap_or(name)
            .to_string();
        let entry = filter.and_then(|f| f.entry_at(index));
        if entry.is_some_and(|e| !e.is_visible()) {
            if options.complete {
                out.insert(key, JsonValue::Bool(false));
            }
            continue;
        }
        let child_filter = match entry {
            Some(FilterEntry::Nested(child)) => Some(child),
            _ => None,
        };
        if let Some(json) = serialize_attribute(attribute, value, child_filter, options)
            .map_err(|e| e.nested(name))?
        {
            out.insert(key, json);
        }
    }
    Ok(out)
}

/// `None` means the attribute is omitted.
fn serialize_attribute(
    attribute: &AttributeDescriptor,
    value: &Value,
    filter: Option<&AttributeFilter>,
    options: &SerializeOptions<'_>,
) -> Result<Option<JsonValue>, ModelError> {
    let keep_empty = options.complete || attribute.is_required();
    match (attribute.kind(), value) {
        (_, Value::Null) => Ok(options.complete.then_some(JsonValue::Null)),
        (AttributeKind::Model(_), Value::Model(child)) => {
            let fields = serialize_model(child, filter, options)?;
            Ok((keep_empty || !fields.is_empty()).then_some(JsonValue::Object(fields)))
        }
        (AttributeKind::Array(element), Value::Array(items)) => {
            let items = serialize_elements(element, items, filter, options)?;
            Ok((keep_empty || !items.is_empty()).then_some(JsonValue::Array(items)))
        }
        (AttributeKind::Scalar(_), scalar) => {
            let Some(json) = scalar.scalar_to_json() else {
                return Err(mismatch(value));
            };
            let omit = !options.complete
                && scalar.is_falsy()
                && attribute.default_value() == Some(scalar);
            Ok((!omit).then_some(json))
        }
        _ => Err(mismatch(value)),
    }
}

fn serialize_elements(
    element: &AttributeDescriptor,
    items: &[Value],
    filter: Option<&AttributeFilter>,
    options: &SerializeOptions<'_>,
) -> Result<Vec<JsonValue>, ModelError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let json = match item {
                Value::Model(child) => serialize_model(child, filter, options).map(JsonValue::Object),
                Value::Array(inner) => {
                    let inner_element = element.element().unwrap_or(element);
                    serialize_elements(inner_element, inner, filter, options).map(JsonValue::Array)
                }
                scalar => scalar.scalar_to_json().ok_or_else(|| mismatch(scalar)),
            };
            json.map_err(|e| e.nested(&format!("[{i}]")))
        })
        .collect()
}

fn mismatch(value: &Value) -> ModelError {
    ModelError::violation(
        "",
        Violation::Type {
            expected: value.type_name(),
        },
    )
}
