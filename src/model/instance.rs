//! Model instances: owned runtime values conforming to a [`ModelSchema`].

use super::{AttributeDescriptor, AttributeKind, ModelSchema, Value};
use crate::error::{ModelError, Violation};
use crate::filter::{AttributeFilter, FilterEntry};
use crate::serializer::{self, SerializeOptions};
use crate::validator::{self, ValidateOptions};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// A runtime value of a model.
///
/// Values are stored in schema declaration order. Every write goes through the same
/// constraint checks validation applies, so an instance never holds a value its schema
/// would reject.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    schema: Arc<ModelSchema>,
    values: Vec<Value>,
    required: bool,
    description: Option<String>,
}

impl PartialEq for ModelInstance {
    fn eq(&self, other: &Self) -> bool {
        self.schema.id() == other.schema.id() && self.values == other.values
    }
}

impl ModelInstance {
    /// Defaults applied, nested models instantiated, arrays empty.
    pub fn new(schema: &Arc<ModelSchema>) -> Self {
        let values = schema.attributes().iter().map(initial_value).collect();
        Self {
            schema: Arc::clone(schema),
            values,
            required: schema.is_required(),
            description: schema.description().map(str::to_string),
        }
    }

    /// A fresh instance with every attribute `filter` hides set to `null`, recursively.
    pub(crate) fn masked(
        schema: &Arc<ModelSchema>,
        filter: Option<&AttributeFilter>,
    ) -> Result<Self, ModelError> {
        let Some(filter) = filter else {
            return Ok(Self::new(schema));
        };
        filter.ensure_covers(schema)?;
        let mut instance = Self::new(schema);
        for (index, (descriptor, slot)) in schema
            .attributes()
            .iter()
            .zip(instance.values.iter_mut())
            .enumerate()
        {
            match (filter.entry_at(index), descriptor.kind()) {
                (Some(entry), _) if !entry.is_visible() => *slot = Value::Null,
                (Some(FilterEntry::Nested(child)), AttributeKind::Model(nested)) => {
                    let mut masked = Self::masked(nested, Some(child))?;
                    if let Value::Model(current) = &mut *slot {
                        masked.required = current.required;
                        masked.description = current.description.take();
                    }
                    *slot = Value::Model(masked);
                }
                _ => {}
            }
        }
        Ok(instance)
    }

    pub(crate) fn from_parts(
        schema: &Arc<ModelSchema>,
        values: Vec<Value>,
        required: bool,
        description: Option<String>,
    ) -> Self {
        Self {
            schema: Arc::clone(schema),
            values,
            required,
            description,
        }
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// `(descriptor, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeDescriptor, &Value)> {
        self.schema.attributes().iter().zip(self.values.iter())
    }

    pub fn get(&self, name: &str) -> Result<&Value, ModelError> {
        let index = self.index_of(name)?;
        Ok(&self.values[index])
    }

    /// Checked write of one attribute.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let index = self.index_of(name)?;
        let descriptor = &self.schema.attributes()[index];
        let accepted = accept(descriptor, value.into()).map_err(|e| e.nested(name))?;
        self.values[index] = accepted;
        Ok(())
    }

    /// Builder form of [`ModelInstance::set`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, ModelError> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Append an element to an array attribute.
    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let index = self.index_of(name)?;
        let descriptor = &self.schema.attributes()[index];
        let Some(element) = descriptor.element() else {
            return Err(ModelError::violation(
                name,
                Violation::Type { expected: "array" },
            ));
        };
        let len = self.values[index].as_array().map_or(0, <[Value]>::len);
        descriptor
            .check_length(len + 1)
            .or_else(|v| match v {
                // min_length is enforced on whole-array writes and validation only
                Violation::MinLength { .. } => Ok(()),
                other => Err(other),
            })
            .map_err(|v| ModelError::violation(name, v))?;
        let accepted = accept(element, value.into())
            .map_err(|e| e.nested(&format!("[{len}]")).nested(name))?;
        match &mut self.values[index] {
            Value::Array(items) => items.push(accepted),
            slot => *slot = Value::Array(vec![accepted]),
        }
        Ok(())
    }

    /// Elements of an array attribute.
    pub fn elements(&self, name: &str) -> Result<&[Value], ModelError> {
        self.get(name)?
            .as_array()
            .ok_or_else(|| ModelError::violation(name, Violation::Type { expected: "array" }))
    }

    pub fn child(&self, name: &str) -> Result<&ModelInstance, ModelError> {
        self.get(name)?
            .as_model()
            .ok_or_else(|| ModelError::violation(name, Violation::Type { expected: "model" }))
    }

    /// Mutable access to a nested model, instantiating it if it is currently `null`.
    pub fn child_mut(&mut self, name: &str) -> Result<&mut ModelInstance, ModelError> {
        let index = self.index_of(name)?;
        let AttributeKind::Model(schema) = self.schema.attributes()[index].kind() else {
            return Err(ModelError::violation(
                name,
                Violation::Type { expected: "model" },
            ));
        };
        let schema = Arc::clone(schema);
        let slot = &mut self.values[index];
        if slot.is_null() {
            *slot = Value::Model(ModelInstance::new(&schema));
        }
        slot.as_model_mut()
            .ok_or_else(|| ModelError::violation(name, Violation::Type { expected: "model" }))
    }

    pub fn blueprint(&self) -> JsonValue {
        self.schema
            .blueprint_with(self.required, self.description.as_deref())
    }

    pub fn attribute_filter(&self, default: bool) -> AttributeFilter {
        AttributeFilter::from_model(&self.schema, default)
    }

    /// Validate raw data against this instance's schema, honouring its required flag.
    pub fn validate(
        &self,
        raw: Option<&JsonValue>,
        attribute_filter: Option<&AttributeFilter>,
        minified: bool,
    ) -> Result<Option<ModelInstance>, ModelError> {
        let options = ValidateOptions {
            attribute_filter,
            minified,
            required: Some(self.required),
        };
        validator::validate(&self.schema, raw, &options)
    }

    pub fn serialize(&self, options: &SerializeOptions<'_>) -> Result<JsonValue, ModelError> {
        serializer::serialize(self, options)
    }

    fn index_of(&self, name: &str) -> Result<usize, ModelError> {
        self.schema
            .attribute_index(name)
            .ok_or_else(|| ModelError::lookup(self.schema.name(), name))
    }
}

fn initial_value(descriptor: &AttributeDescriptor) -> Value {
    match descriptor.kind() {
        AttributeKind::Scalar(_) => descriptor.default_value().cloned().unwrap_or_default(),
        AttributeKind::Model(schema) => {
            let mut child = ModelInstance::new(schema);
            child.required = descriptor.is_required();
            if let Some(description) = descriptor.description_text() {
                child.description = Some(description.to_string());
            }
            Value::Model(child)
        }
        AttributeKind::Array(_) => Value::Array(Vec::new()),
    }
}

/// Apply a descriptor's checks to a typed value. Errors are relative to the attribute.
fn accept(descriptor: &AttributeDescriptor, value: Value) -> Result<Value, ModelError> {
    let relative = |v: Violation| ModelError::violation("", v);
    match descriptor.kind() {
        AttributeKind::Scalar(_) => descriptor.check(value).map_err(relative),
        AttributeKind::Model(schema) => match value {
            Value::Null if descriptor.is_required() => Err(relative(Violation::Required)),
            // clearing an optional child resets it
            Value::Null => Ok(initial_value(descriptor)),
            Value::Model(mut instance) if instance.schema.id() == schema.id() => {
                instance.required = descriptor.is_required();
                Ok(Value::Model(instance))
            }
            _ => Err(relative(Violation::Type {
                expected: "model",
            })),
        },
        AttributeKind::Array(element) => match value {
            Value::Null if descriptor.is_required() => Err(relative(Violation::Required)),
            Value::Null => Ok(Value::Array(Vec::new())),
            Value::Array(items) => {
                descriptor.check_length(items.len()).map_err(relative)?;
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| accept(element, item).map_err(|e| e.nested(&format!("[{i}]"))))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            _ => Err(relative(Violation::Type { expected: "array" })),
        },
    }
}
