//! Attribute descriptors: the static type and constraints of one model field.

use super::value::{DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};
use super::{ModelSchema, Value};
use crate::error::{ModelError, Violation};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;

/// Alternate timestamp form accepted on input.
const DATETIME_ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Leaf value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Time,
}

impl ScalarKind {
    /// Type name exposed to code generation (`String`, `Integer`, ...).
    pub fn type_name(self) -> &'static str {
        match self {
            ScalarKind::String => "String",
            ScalarKind::Integer => "Integer",
            ScalarKind::Float => "Float",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Date => "Date",
            ScalarKind::DateTime => "DateTime",
            ScalarKind::Time => "Time",
        }
    }

    /// Name used in blueprints and schema documents.
    pub fn blueprint_name(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Date => "date",
            ScalarKind::DateTime => "datetime",
            ScalarKind::Time => "time",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "string" => ScalarKind::String,
            "integer" => ScalarKind::Integer,
            "float" => ScalarKind::Float,
            "boolean" => ScalarKind::Boolean,
            "date" => ScalarKind::Date,
            "datetime" => ScalarKind::DateTime,
            "time" => ScalarKind::Time,
            _ => return None,
        };
        Some(kind)
    }

    fn expected(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Date => "date (YYYY-MM-DD)",
            ScalarKind::DateTime => "datetime (YYYY-MM-DD HH:MM:SS)",
            ScalarKind::Time => "time (HH:MM:SS)",
        }
    }

    fn supports_length(self) -> bool {
        matches!(self, ScalarKind::String)
    }

    fn supports_range(self) -> bool {
        matches!(self, ScalarKind::Integer | ScalarKind::Float)
    }

    fn supports_choices(self) -> bool {
        matches!(
            self,
            ScalarKind::String | ScalarKind::Integer | ScalarKind::Float
        )
    }

    fn supports_format(self) -> bool {
        matches!(self, ScalarKind::String)
    }

    /// Coerce untyped wire data into a value of this kind. Constraints are not applied.
    pub fn parse(self, raw: &JsonValue) -> Result<Value, Violation> {
        let type_error = || Violation::Type {
            expected: self.expected(),
        };
        match self {
            ScalarKind::String => raw
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(type_error),
            ScalarKind::Integer => match raw {
                JsonValue::Number(n) => n
                    .as_i64()
                    .or_else(|| {
                        n.as_f64()
                            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                            .map(|f| f as i64)
                    })
                    .map(Value::Integer)
                    .ok_or_else(type_error),
                JsonValue::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|_| type_error()),
                _ => Err(type_error()),
            },
            ScalarKind::Float => match raw {
                JsonValue::Number(n) => n.as_f64().map(Value::Float).ok_or_else(type_error),
                JsonValue::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(Value::Float)
                    .ok_or_else(type_error),
                _ => Err(type_error()),
            },
            ScalarKind::Boolean => raw.as_bool().map(Value::Boolean).ok_or_else(type_error),
            ScalarKind::Date => raw
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
                .map(Value::Date)
                .ok_or_else(type_error),
            ScalarKind::DateTime => raw
                .as_str()
                .and_then(|s| {
                    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                        .or_else(|_| NaiveDateTime::parse_from_str(s, DATETIME_ISO_FORMAT))
                        .ok()
                })
                .map(Value::DateTime)
                .ok_or_else(type_error),
            ScalarKind::Time => raw
                .as_str()
                .and_then(|s| NaiveTime::parse_from_str(s, TIME_FORMAT).ok())
                .map(Value::Time)
                .ok_or_else(type_error),
        }
    }

    /// Accept an already typed value, widening integers for float attributes.
    fn normalize(self, value: Value) -> Result<Value, Violation> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (ScalarKind::Float, Value::Integer(i)) => Ok(Value::Float(i as f64)),
            // NaN and infinities have no JSON form
            (ScalarKind::Float, Value::Float(f)) if !f.is_finite() => Err(Violation::Type {
                expected: self.expected(),
            }),
            (ScalarKind::String, v @ Value::String(_))
            | (ScalarKind::Integer, v @ Value::Integer(_))
            | (ScalarKind::Float, v @ Value::Float(_))
            | (ScalarKind::Boolean, v @ Value::Boolean(_))
            | (ScalarKind::Date, v @ Value::Date(_))
            | (ScalarKind::DateTime, v @ Value::DateTime(_))
            | (ScalarKind::Time, v @ Value::Time(_)) => Ok(v),
            _ => Err(Violation::Type {
                expected: self.expected(),
            }),
        }
    }
}

/// The closed set of attribute shapes.
#[derive(Debug, Clone)]
pub enum AttributeKind {
    Scalar(ScalarKind),
    Model(Arc<ModelSchema>),
    /// Ordered sequence of elements matching the boxed element template.
    Array(Box<AttributeDescriptor>),
}

impl AttributeKind {
    /// Stable textual description, used in schema fingerprints and diagnostics.
    pub fn label(&self) -> String {
        match self {
            AttributeKind::Scalar(kind) => kind.blueprint_name().to_string(),
            AttributeKind::Model(schema) => format!("model:{}", schema.id()),
            AttributeKind::Array(element) => format!("array<{}>", element.kind.label()),
        }
    }
}

/// Validation constraints. Which ones apply depends on the attribute kind; a
/// constraint that does not apply is rejected when the schema is built.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// Minimum string length (characters) or array length
    pub min_length: Option<usize>,
    /// Maximum string length (characters) or array length
    pub max_length: Option<usize>,
    /// Inclusive lower bound for integers and floats
    pub minimum: Option<f64>,
    /// Inclusive upper bound for integers and floats
    pub maximum: Option<f64>,
    /// Allowed values for strings, integers and floats
    pub choices: Option<Vec<Value>>,
    /// Regular expression a string must match in full
    pub format: Option<String>,
}

/// Declaration of one model field.
///
/// Descriptors are assembled with the builder methods below and become immutable
/// once added to a [`ModelSchema`]. Scalar and model attributes are required unless
/// marked otherwise; arrays are optional unless marked required.
///
/// ```rust
/// use brrtbind::model::AttributeDescriptor;
///
/// let age = AttributeDescriptor::integer("age").minimum(0.0).maximum(120.0);
/// let tags = AttributeDescriptor::array("tags", AttributeDescriptor::string("tag")).max_length(8);
/// assert!(age.is_required());
/// assert!(!tags.is_required());
/// ```
#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
    name: String,
    kind: AttributeKind,
    required: bool,
    default: Option<Value>,
    constraints: Constraints,
    description: Option<String>,
    pattern: Option<Regex>,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        let required = match &kind {
            AttributeKind::Array(_) => false,
            AttributeKind::Model(schema) => schema.is_required(),
            AttributeKind::Scalar(_) => true,
        };
        Self {
            name: name.into(),
            kind,
            required,
            default: None,
            constraints: Constraints::default(),
            description: None,
            pattern: None,
        }
    }

    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, AttributeKind::Scalar(kind))
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::Date)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::DateTime)
    }

    pub fn time(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::Time)
    }

    /// A nested model field. Inherits the schema's default required flag and description.
    pub fn model(name: impl Into<String>, schema: &Arc<ModelSchema>) -> Self {
        let mut descriptor = Self::new(name, AttributeKind::Model(Arc::clone(schema)));
        descriptor.description = schema.description().map(str::to_string);
        descriptor
    }

    /// An array field whose elements follow `element`.
    pub fn array(name: impl Into<String>, element: AttributeDescriptor) -> Self {
        Self::new(name, AttributeKind::Array(Box::new(element)))
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn optional(self) -> Self {
        self.required(false)
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default = if value.is_null() { None } else { Some(value) };
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.constraints.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.constraints.max_length = Some(max);
        self
    }

    pub fn minimum(mut self, minimum: f64) -> Self {
        self.constraints.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: f64) -> Self {
        self.constraints.maximum = Some(maximum);
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constraints.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn format(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.format = Some(pattern.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_model(&self) -> bool {
        matches!(self.kind, AttributeKind::Model(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, AttributeKind::Array(_))
    }

    /// Element template of an array attribute.
    pub fn element(&self) -> Option<&AttributeDescriptor> {
        match &self.kind {
            AttributeKind::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Schema an attribute filter must mirror for this attribute: the nested model's
    /// schema, or the element schema of an array of models.
    pub fn nested_schema(&self) -> Option<&Arc<ModelSchema>> {
        match &self.kind {
            AttributeKind::Model(schema) => Some(schema),
            AttributeKind::Array(element) => element.nested_schema(),
            AttributeKind::Scalar(_) => None,
        }
    }

    /// Validate and finish the descriptor when its schema is built.
    pub(crate) fn finalize(&mut self, model: &str) -> Result<(), ModelError> {
        let name = self.name.clone();
        let fail = |reason: String| ModelError::definition(model, name.as_str(), reason);

        if name.trim().is_empty() {
            return Err(fail("attribute name must not be empty".to_string()));
        }

        let (length, range, choices, format, default) = match &self.kind {
            AttributeKind::Scalar(kind) => (
                kind.supports_length(),
                kind.supports_range(),
                kind.supports_choices(),
                kind.supports_format(),
                true,
            ),
            AttributeKind::Array(_) => (true, false, false, false, false),
            AttributeKind::Model(_) => (false, false, false, false, false),
        };
        let label = self.kind.label();
        let c = &self.constraints;
        if !length && (c.min_length.is_some() || c.max_length.is_some()) {
            return Err(fail(format!("length constraints do not apply to {label}")));
        }
        if !range && (c.minimum.is_some() || c.maximum.is_some()) {
            return Err(fail(format!("minimum/maximum do not apply to {label}")));
        }
        if !choices && c.choices.is_some() {
            return Err(fail(format!("choices do not apply to {label}")));
        }
        if !format && c.format.is_some() {
            return Err(fail(format!("format does not apply to {label}")));
        }
        if !default && self.default.is_some() {
            return Err(fail(format!("a default value does not apply to {label}")));
        }
        if let (Some(min), Some(max)) = (c.min_length, c.max_length) {
            if min > max {
                return Err(fail(format!("min_length {min} exceeds max_length {max}")));
            }
        }
        if let (Some(min), Some(max)) = (c.minimum, c.maximum) {
            if min > max {
                return Err(fail(format!("minimum {min} exceeds maximum {max}")));
            }
        }

        if let AttributeKind::Array(element) = &mut self.kind {
            element.finalize(model)?;
        }

        if let Some(pattern) = &self.constraints.format {
            let compiled = Regex::new(&format!("^(?:{pattern})$"))
                .map_err(|e| fail(format!("invalid format pattern: {e}")))?;
            self.pattern = Some(compiled);
        }

        if let AttributeKind::Scalar(kind) = self.kind {
            if let Some(choices) = self.constraints.choices.take() {
                let normalized = choices
                    .into_iter()
                    .map(|choice| kind.normalize(choice))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|v| fail(format!("invalid choice: {v}")))?;
                self.constraints.choices = Some(normalized);
            }
            if let Some(default) = self.default.take() {
                let checked = self
                    .check(default)
                    .map_err(|v| fail(format!("default value is invalid: {v}")))?;
                self.default = Some(checked);
            }
        }
        Ok(())
    }

    /// Coerce a raw wire value for a scalar attribute: fill the default for an absent
    /// or `null` value, convert to the attribute's type and apply its constraints.
    pub fn coerce(&self, raw: Option<&JsonValue>) -> Result<Value, Violation> {
        let AttributeKind::Scalar(kind) = self.kind else {
            return Err(Violation::Type {
                expected: "scalar value",
            });
        };
        let value = match raw {
            None | Some(JsonValue::Null) => self.default.clone().unwrap_or(Value::Null),
            Some(raw) => kind.parse(raw)?,
        };
        self.check(value)
    }

    /// Check an already typed value against a scalar attribute.
    pub fn check(&self, value: Value) -> Result<Value, Violation> {
        let AttributeKind::Scalar(kind) = self.kind else {
            return Err(Violation::Type {
                expected: "scalar value",
            });
        };
        let value = kind.normalize(value)?;
        if value.is_null() {
            return if self.required {
                Err(Violation::Required)
            } else {
                Ok(Value::Null)
            };
        }
        self.check_constraints(&value)?;
        Ok(value)
    }

    fn check_constraints(&self, value: &Value) -> Result<(), Violation> {
        let c = &self.constraints;
        if let Value::String(s) = value {
            if self.required && s.is_empty() {
                return Err(Violation::Required);
            }
            self.check_length(s.chars().count())?;
            if let Some(pattern) = &self.pattern {
                if !pattern.is_match(s) {
                    return Err(Violation::Format {
                        pattern: c.format.clone().unwrap_or_default(),
                    });
                }
            }
        }
        if let Some(actual) = value.as_f64() {
            if let Some(minimum) = c.minimum {
                if actual < minimum {
                    return Err(Violation::Minimum { minimum, actual });
                }
            }
            if let Some(maximum) = c.maximum {
                if actual > maximum {
                    return Err(Violation::Maximum { maximum, actual });
                }
            }
        }
        if let Some(choices) = &c.choices {
            if !choices.contains(value) {
                let shown = value
                    .scalar_to_json()
                    .map(|json| json.to_string())
                    .unwrap_or_default();
                return Err(Violation::Choice { value: shown });
            }
        }
        Ok(())
    }

    /// Length check shared by strings and arrays.
    pub(crate) fn check_length(&self, actual: usize) -> Result<(), Violation> {
        if let Some(min) = self.constraints.min_length {
            if actual < min {
                return Err(Violation::MinLength { min, actual });
            }
        }
        if let Some(max) = self.constraints.max_length {
            if actual > max {
                return Err(Violation::MaxLength { max, actual });
            }
        }
        Ok(())
    }

    /// Descriptive structure of this attribute for documentation and tooling.
    pub fn blueprint(&self) -> JsonValue {
        match &self.kind {
            AttributeKind::Model(schema) => {
                schema.blueprint_with(self.required, self.description.as_deref())
            }
            AttributeKind::Scalar(kind) => {
                let c = &self.constraints;
                let mut constraints = Map::new();
                constraints.insert("required".into(), json!(self.required));
                constraints.insert(
                    "default".into(),
                    self.default
                        .as_ref()
                        .and_then(Value::scalar_to_json)
                        .unwrap_or(JsonValue::Null),
                );
                constraints.insert("description".into(), json!(self.description));
                if kind.supports_length() {
                    constraints.insert("min_length".into(), json!(c.min_length));
                    constraints.insert("max_length".into(), json!(c.max_length));
                }
                if kind.supports_range() {
                    constraints.insert("minimum".into(), json!(c.minimum));
                    constraints.insert("maximum".into(), json!(c.maximum));
                }
                if kind.supports_choices() {
                    let choices = c.choices.as_ref().map(|choices| {
                        choices
                            .iter()
                            .filter_map(Value::scalar_to_json)
                            .collect::<Vec<_>>()
                    });
                    constraints.insert("choices".into(), json!(choices));
                }
                if kind.supports_format() {
                    constraints.insert("format".into(), json!(c.format));
                }
                json!({
                    "type": kind.blueprint_name(),
                    "constraints": constraints,
                })
            }
            AttributeKind::Array(element) => json!({
                "type": "array",
                "constraints": {
                    "required": self.required,
                    "description": self.description,
                    "min_length": self.constraints.min_length,
                    "max_length": self.constraints.max_length,
                    "element_template": element.blueprint(),
                },
            }),
        }
    }
}
