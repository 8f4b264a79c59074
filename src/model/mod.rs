//! # Model Module
//!
//! Static model shapes and their runtime values.
//!
//! - [`AttributeDescriptor`] declares one field: its [`AttributeKind`] (scalar, nested
//!   model or array) and its [`Constraints`]
//! - [`ModelSchema`] is the ordered, fully merged set of descriptors of a model,
//!   registered explicitly through [`ModelSchema::builder`]
//! - [`ModelInstance`] holds the [`Value`]s of one model and checks every write
//!
//! Schemas are immutable once built and shared as `Arc<ModelSchema>`, so any number of
//! threads may validate and serialize against the same schema concurrently. Instances
//! are plain owned values.

mod descriptor;
mod instance;
mod schema;
mod value;

pub use descriptor::{AttributeDescriptor, AttributeKind, Constraints, ScalarKind};
pub use instance::ModelInstance;
pub use schema::{ModelSchema, ModelSchemaBuilder, SchemaId};
pub use value::{Value, DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};
