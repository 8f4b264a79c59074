//! # Schema Document Module
//!
//! Declares models in a YAML, JSON or TOML document instead of Rust code.
//!
//! ```yaml
//! models:
//!   - name: ChildModel
//!     attributes:
//!       - { name: child_name, type: string, max_length: 40 }
//!   - name: ParentModel
//!     description: A parent
//!     attributes:
//!       - { name: parent_name, type: string }
//!       - { name: child, type: model, model: ChildModel, required: false }
//!       - { name: children, type: array, element: { type: model, model: ChildModel } }
//! ```
//!
//! Attribute order is preserved in every format. Models may appear in any order and
//! are resolved by name; `extends` names a parent model from the same document.
//! Invalid declarations fail with [`crate::error::ModelError::SchemaDefinition`], wrapped
//! with the document path by [`load_schema_document`].

mod build;
mod load;
mod types;

pub use build::build_registry;
pub use load::{load_schema_document, parse_schema_document, DocumentFormat};
pub use types::{AttributeDeclaration, ModelDeclaration, SchemaDocument};

use crate::model::ModelSchema;
use std::sync::Arc;

/// Models built from a document, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<Arc<ModelSchema>>,
}

impl SchemaRegistry {
    pub fn get(&self, name: &str) -> Option<&Arc<ModelSchema>> {
        self.schemas.iter().find(|s| s.name() == name)
    }

    /// Like [`SchemaRegistry::get`], with an error listing the known models.
    pub fn require(&self, name: &str) -> anyhow::Result<&Arc<ModelSchema>> {
        self.get(name).ok_or_else(|| {
            anyhow::anyhow!(
                "model '{}' is not declared (known models: {})",
                name,
                self.names().join(", ")
            )
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModelSchema>> {
        self.schemas.iter()
    }

    /// Add a schema, replacing any schema of the same name. Returns the replaced one.
    pub fn insert(&mut self, schema: Arc<ModelSchema>) -> Option<Arc<ModelSchema>> {
        match self.schemas.iter_mut().find(|s| s.name() == schema.name()) {
            Some(slot) => Some(std::mem::replace(slot, schema)),
            None => {
                self.schemas.push(schema);
                None
            }
        }
    }
}
