//! # Error Module
//!
//! Error taxonomy for schema definition, validation, serialization and attribute
//! filtering.
//!
//! Every failure aborts the current call; no partially populated instance is ever
//! returned. Errors raised inside a nested model or array element are re-rooted under
//! the parent attribute with [`ModelError::nested`], so the caller always sees the full
//! path of the field that failed (e.g. `children[0].child_b_name`).

use std::fmt;

/// The specific constraint a value failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// The value was absent, `null` or an empty required string.
    Required,
    /// The value could not be coerced to the attribute's type.
    Type {
        /// Human readable name of the expected type
        expected: &'static str,
    },
    /// String or array shorter than `min_length`.
    MinLength { min: usize, actual: usize },
    /// String or array longer than `max_length`.
    MaxLength { max: usize, actual: usize },
    /// Number below `minimum`.
    Minimum { minimum: f64, actual: f64 },
    /// Number above `maximum`.
    Maximum { maximum: f64, actual: f64 },
    /// Value is not one of the declared `choices`.
    Choice { value: String },
    /// String does not match the declared `format` pattern.
    Format { pattern: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Required => write!(f, "value is required"),
            Violation::Type { expected } => write!(f, "expected {expected}"),
            Violation::MinLength { min, actual } => {
                write!(f, "length {actual} is shorter than minimum length {min}")
            }
            Violation::MaxLength { max, actual } => {
                write!(f, "length {actual} is longer than maximum length {max}")
            }
            Violation::Minimum { minimum, actual } => {
                write!(f, "{actual} is less than minimum {minimum}")
            }
            Violation::Maximum { maximum, actual } => {
                write!(f, "{actual} is greater than maximum {maximum}")
            }
            Violation::Choice { value } => write!(f, "{value} is not one of the allowed choices"),
            Violation::Format { pattern } => {
                write!(f, "value does not match format '{pattern}'")
            }
        }
    }
}

/// Errors raised by the binding layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A required model received `null`, nothing, or a value that is not a mapping.
    ///
    /// `path` is empty when the failure is at the root of the call.
    RequiredAttribute { path: String },
    /// A present value failed coercion or a constraint check.
    Validation { path: String, violation: Violation },
    /// An attribute filter or instance access named an attribute the schema does not
    /// declare, or a filter does not cover every attribute of its schema.
    Lookup { model: String, attribute: String },
    /// A model definition contains something that is not a valid attribute descriptor.
    SchemaDefinition {
        model: String,
        attribute: String,
        reason: String,
    },
}

impl ModelError {
    pub fn lookup(model: impl Into<String>, attribute: impl Into<String>) -> Self {
        ModelError::Lookup {
            model: model.into(),
            attribute: attribute.into(),
        }
    }

    pub fn definition(
        model: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ModelError::SchemaDefinition {
            model: model.into(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    pub fn violation(path: impl Into<String>, violation: Violation) -> Self {
        ModelError::Validation {
            path: path.into(),
            violation,
        }
    }

    /// Re-root this error under a parent attribute (or `[index]` element segment).
    ///
    /// A child's required-attribute failure is reported to the parent as a validation
    /// error at the child's path.
    pub fn nested(self, segment: &str) -> Self {
        match self {
            ModelError::RequiredAttribute { path } => ModelError::Validation {
                path: join_path(segment, &path),
                violation: Violation::Required,
            },
            ModelError::Validation { path, violation } => ModelError::Validation {
                path: join_path(segment, &path),
                violation,
            },
            other => other,
        }
    }

    /// Path of the failing attribute, if the error carries one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ModelError::RequiredAttribute { path } | ModelError::Validation { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, ModelError::RequiredAttribute { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ModelError::Validation { .. })
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, ModelError::Lookup { .. })
    }

    pub fn is_schema_definition(&self) -> bool {
        matches!(self, ModelError::SchemaDefinition { .. })
    }
}

fn join_path(segment: &str, path: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else if path.starts_with('[') {
        format!("{segment}{path}")
    } else {
        format!("{segment}.{path}")
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::RequiredAttribute { path } if path.is_empty() => {
                write!(f, "required attribute error: model data is missing or not a mapping")
            }
            ModelError::RequiredAttribute { path } => {
                write!(f, "required attribute error: '{path}' is missing")
            }
            ModelError::Validation { path, violation } => {
                write!(f, "validation error at '{path}': {violation}")
            }
            ModelError::Lookup { model, attribute } => {
                write!(f, "lookup error: model '{model}' has no attribute '{attribute}'")
            }
            ModelError::SchemaDefinition {
                model,
                attribute,
                reason,
            } => write!(
                f,
                "schema definition error in '{model}.{attribute}': {reason}"
            ),
        }
    }
}

impl std::error::Error for ModelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_required_becomes_validation_at_child_path() {
        let err = ModelError::RequiredAttribute {
            path: String::new(),
        }
        .nested("child");
        assert_eq!(err, ModelError::violation("child", Violation::Required));
    }

    #[test]
    fn nested_paths_join_with_dots_and_brackets() {
        let err = ModelError::violation("child_b_name", Violation::Required)
            .nested("[0]")
            .nested("children")
            .nested("[2]")
            .nested("children");
        assert_eq!(err.path(), Some("children[2].children[0].child_b_name"));
    }

    #[test]
    fn nested_leaves_lookup_untouched() {
        let err = ModelError::lookup("Person", "missing").nested("parent");
        assert_eq!(err, ModelError::lookup("Person", "missing"));
        assert!(err.path().is_none());
    }

    #[test]
    fn display_mentions_path_and_reason() {
        let err = ModelError::violation(
            "age",
            Violation::Maximum {
                maximum: 120.0,
                actual: 121.0,
            },
        );
        let text = err.to_string();
        assert!(text.contains("'age'"));
        assert!(text.contains("greater than maximum 120"));
    }
}
