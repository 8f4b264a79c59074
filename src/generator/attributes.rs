use crate::model::{AttributeDescriptor, AttributeKind, ModelSchema, Value};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Metadata row describing one attribute to a client code generator.
///
/// Rows carry no validation logic; generators consume them verbatim to emit filter
/// classes with `enable<Name>` / `disable<Name>` accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterAttribute {
    /// Attribute name as it appears on the wire (e.g. `first_name`)
    pub public_name: String,
    /// CamelCase form (e.g. `FirstName`)
    pub camel_case: String,
    /// camelCase form with a lowercase initial, used as a field identifier (e.g. `firstName`)
    pub field_identifier: String,
    pub is_model: bool,
    pub is_array: bool,
    /// Model name for models and arrays of models, otherwise the scalar type name
    pub element_type: String,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub choices: Option<Vec<JsonValue>>,
    pub format: Option<String>,
    pub default: Option<JsonValue>,
}

/// One row per attribute of `schema`, in declaration order.
pub fn filter_attributes(schema: &ModelSchema) -> Vec<FilterAttribute> {
    schema.attributes().iter().map(filter_attribute).collect()
}

fn filter_attribute(attribute: &AttributeDescriptor) -> FilterAttribute {
    let constraints = attribute.constraints();
    let camel_case = to_camel_case(attribute.name());
    FilterAttribute {
        public_name: attribute.name().to_string(),
        field_identifier: lower_initial(&camel_case),
        camel_case,
        is_model: attribute.is_model(),
        is_array: attribute.is_array(),
        element_type: element_type(attribute.kind()),
        required: attribute.is_required(),
        min_length: constraints.min_length,
        max_length: constraints.max_length,
        minimum: constraints.minimum,
        maximum: constraints.maximum,
        choices: constraints
            .choices
            .as_ref()
            .map(|choices| choices.iter().filter_map(Value::scalar_to_json).collect()),
        format: constraints.format.clone(),
        default: attribute.default_value().and_then(Value::scalar_to_json),
    }
}

fn element_type(kind: &AttributeKind) -> String {
    match kind {
        AttributeKind::Scalar(scalar) => scalar.type_name().to_string(),
        AttributeKind::Model(schema) => schema.name().to_string(),
        AttributeKind::Array(element) => element_type(element.kind()),
    }
}

/// Convert a snake_case string to CamelCase
///
/// # Example
///
/// ```rust
/// use brrtbind::generator::to_camel_case;
///
/// assert_eq!(to_camel_case("first_name"), "FirstName");
/// ```
pub fn to_camel_case(s: &str) -> String {
    s.split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn lower_initial(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
