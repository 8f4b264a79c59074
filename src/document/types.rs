use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Top level of a schema document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    #[serde(default)]
    pub models: Vec<ModelDeclaration>,
}

/// One model of a schema document.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDeclaration {
    pub name: String,
    /// Name of the parent model, declared in the same document
    pub extends: Option<String>,
    pub description: Option<String>,
    /// Default required flag of instances (default: true)
    pub required: Option<bool>,
    #[serde(default)]
    pub attributes: Vec<AttributeDeclaration>,
}

/// One attribute, or the element template of an array attribute.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeDeclaration {
    /// May be omitted for array element templates
    #[serde(default)]
    pub name: String,
    /// `string`, `integer`, `float`, `boolean`, `date`, `datetime`, `time`, `model` or `array`
    #[serde(rename = "type")]
    pub kind: String,
    /// Referenced model for `type: model`
    pub model: Option<String>,
    /// Element template for `type: array`
    pub element: Option<Box<AttributeDeclaration>>,
    pub required: Option<bool>,
    pub default: Option<JsonValue>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub choices: Option<Vec<JsonValue>>,
    pub format: Option<String>,
    pub description: Option<String>,
}
