use super::types::{AttributeDeclaration, ModelDeclaration, SchemaDocument};
use super::SchemaRegistry;
use crate::error::ModelError;
use crate::model::{AttributeDescriptor, AttributeKind, ModelSchema, ScalarKind, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Build every model of `document`.
///
/// Models may reference each other in any order. Unknown types, unknown or cyclic model
/// references and duplicate model names are [`ModelError::SchemaDefinition`] errors.
pub fn build_registry(document: &SchemaDocument) -> Result<SchemaRegistry, ModelError> {
    let mut declarations = HashMap::new();
    for model in &document.models {
        if declarations.insert(model.name.as_str(), model).is_some() {
            return Err(ModelError::definition(
                &model.name,
                "",
                "model declared more than once",
            ));
        }
    }

    let mut resolver = Resolver {
        declarations,
        built: HashMap::new(),
        visiting: Vec::new(),
    };
    let mut registry = SchemaRegistry::default();
    for model in &document.models {
        let schema = resolver.resolve(&model.name, &model.name, "")?;
        registry.insert(schema);
    }
    Ok(registry)
}

struct Resolver<'a> {
    declarations: HashMap<&'a str, &'a ModelDeclaration>,
    built: HashMap<String, Arc<ModelSchema>>,
    visiting: Vec<String>,
}

impl<'a> Resolver<'a> {
    /// `referrer` and `attribute` locate the reference in error messages.
    fn resolve(
        &mut self,
        name: &str,
        referrer: &str,
        attribute: &str,
    ) -> Result<Arc<ModelSchema>, ModelError> {
        if let Some(schema) = self.built.get(name) {
            return Ok(Arc::clone(schema));
        }
        let Some(declaration) = self.declarations.get(name).copied() else {
            return Err(ModelError::definition(
                referrer,
                attribute,
                format!("unknown model '{name}'"),
            ));
        };
        if self.visiting.iter().any(|v| v == name) {
            return Err(ModelError::definition(
                referrer,
                attribute,
                format!("cyclic reference to model '{name}'"),
            ));
        }

        self.visiting.push(name.to_string());
        let mut builder = ModelSchema::builder(&declaration.name);
        if let Some(parent) = &declaration.extends {
            let parent = self.resolve(parent, &declaration.name, "extends")?;
            builder = builder.extends(&parent);
        }
        if let Some(description) = &declaration.description {
            builder = builder.description(description);
        }
        if let Some(required) = declaration.required {
            builder = builder.required(required);
        }
        for attribute in &declaration.attributes {
            let descriptor = self.descriptor(&declaration.name, attribute, &attribute.name)?;
            builder = builder.attribute(descriptor);
        }
        let schema = builder.build()?;
        self.visiting.pop();

        self.built.insert(name.to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    fn descriptor(
        &mut self,
        model: &str,
        declaration: &AttributeDeclaration,
        name: &str,
    ) -> Result<AttributeDescriptor, ModelError> {
        let fail = |reason: String| ModelError::definition(model, name, reason);
        let kind = declaration.kind.to_ascii_lowercase();

        if kind != "model" && declaration.model.is_some() {
            return Err(fail(format!("'model' does not apply to type '{kind}'")));
        }
        if kind != "array" && declaration.element.is_some() {
            return Err(fail(format!("'element' does not apply to type '{kind}'")));
        }

        let mut descriptor = match kind.as_str() {
            "model" => {
                let Some(target) = &declaration.model else {
                    return Err(fail("model attribute needs a 'model' reference".to_string()));
                };
                let schema = self.resolve(target, model, name)?;
                AttributeDescriptor::model(name, &schema)
            }
            "array" => {
                let Some(element) = &declaration.element else {
                    return Err(fail("array attribute needs an 'element' template".to_string()));
                };
                let element_name = if element.name.is_empty() {
                    name
                } else {
                    element.name.as_str()
                };
                let element = self.descriptor(model, element, element_name)?;
                AttributeDescriptor::array(name, element)
            }
            other => match ScalarKind::from_name(other) {
                Some(scalar) => AttributeDescriptor::scalar(name, scalar),
                None => return Err(fail(format!("unknown attribute type '{other}'"))),
            },
        };

        if let Some(required) = declaration.required {
            descriptor = descriptor.required(required);
        }
        if let Some(min) = declaration.min_length {
            descriptor = descriptor.min_length(min);
        }
        if let Some(max) = declaration.max_length {
            descriptor = descriptor.max_length(max);
        }
        if let Some(minimum) = declaration.minimum {
            descriptor = descriptor.minimum(minimum);
        }
        if let Some(maximum) = declaration.maximum {
            descriptor = descriptor.maximum(maximum);
        }
        if let Some(format) = &declaration.format {
            descriptor = descriptor.format(format);
        }
        if let Some(description) = &declaration.description {
            descriptor = descriptor.description(description);
        }

        let scalar = match descriptor.kind() {
            AttributeKind::Scalar(scalar) => Some(*scalar),
            _ => None,
        };
        if let Some(choices) = &declaration.choices {
            let Some(scalar) = scalar else {
                return Err(fail(format!("choices do not apply to type '{kind}'")));
            };
            let values = choices
                .iter()
                .map(|choice| scalar.parse(choice))
                .collect::<Result<Vec<Value>, _>>()
                .map_err(|v| fail(format!("invalid choice: {v}")))?;
            descriptor = descriptor.choices(values);
        }
        if let Some(default) = declaration.default.as_ref().filter(|d| !d.is_null()) {
            let Some(scalar) = scalar else {
                return Err(fail(format!("a default value does not apply to type '{kind}'")));
            };
            let value = scalar
                .parse(default)
                .map_err(|v| fail(format!("invalid default: {v}")))?;
            descriptor = descriptor.default(value);
        }
        Ok(descriptor)
    }
}
