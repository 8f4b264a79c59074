//! # brrtbind
//!
//! **brrtbind** is a schema-driven data-binding layer for request/response services. It
//! turns untyped request bodies into typed, validated model instances and turns model
//! instances back into untyped response bodies, with two optional transformations:
//!
//! - **Attribute filters** hide parts of a model's attribute tree, symmetrically for
//!   validation and serialization
//! - **Key minification** replaces attribute names with short, deterministic tokens
//!
//! ## Architecture
//!
//! - **[`model`]** - Attribute descriptors, model schemas, instances and values
//! - **[`filter`]** - Attribute filters mirroring a schema's attribute tree
//! - **[`minify`]** - Minified key generation and per-schema key tables
//! - **[`key_cache`]** - Process-wide, build-once cache of key tables
//! - **[`validator`]** - Untyped data to model instance
//! - **[`serializer`]** - Model instance to untyped data
//! - **[`generator`]** - Metadata rows for client code generators
//! - **[`document`]** - Schemas declared in YAML, JSON or TOML documents
//! - **[`error`]** - The error taxonomy shared by all of the above
//! - **[`runtime_config`]**, **[`logging`]**, **[`cli`]** - Environment configuration,
//!   tracing setup and the `brrtbind` command-line tool
//!
//! ### Request/Response Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Http as HTTP layer
//!     participant Val as validator::validate
//!     participant Cache as key_cache
//!     participant Model as ModelInstance
//!     participant Ser as serializer::serialize
//!
//!     Http->>Val: body, filter, minified
//!     Val->>Cache: key_table(schema) (minified only)
//!     Cache-->>Val: Arc<KeyTable>
//!     Val->>Val: coerce + check each visible attribute
//!     alt Constraint violated
//!         Val-->>Http: ModelError (with attribute path)
//!     end
//!     Val-->>Http: ModelInstance
//!     Http->>Model: handler logic (checked setters)
//!     Http->>Ser: instance, filter, minified, complete
//!     Ser->>Cache: key_table(schema) (minified only)
//!     Ser-->>Http: serde_json::Value
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtbind::model::{AttributeDescriptor, ModelSchema};
//! use brrtbind::serializer::{serialize, SerializeOptions};
//! use brrtbind::validator::{validate, ValidateOptions};
//! use serde_json::json;
//!
//! let person = ModelSchema::builder("Person")
//!     .attribute(AttributeDescriptor::string("first_name"))
//!     .attribute(AttributeDescriptor::string("last_name").optional())
//!     .attribute(AttributeDescriptor::integer("age").minimum(0.0).optional())
//!     .build()
//!     .unwrap();
//!
//! let body = json!({"first_name": "Ada", "age": 36});
//! let instance = validate(&person, Some(&body), &ValidateOptions::default())
//!     .unwrap()
//!     .unwrap();
//!
//! // Minified output: tokens are assigned to names sorted alphabetically
//! let options = SerializeOptions { minified: true, ..SerializeOptions::default() };
//! let wire = serialize(&instance, &options).unwrap();
//! assert_eq!(wire, json!({"a": 36, "b": "Ada"}));
//! ```
//!
//! ## Concurrency
//!
//! Schemas are immutable and shared as `Arc<ModelSchema>`; validation and serialization
//! against the same schema may run on any number of threads. The only shared mutable
//! state is the key table cache, which builds each table once under a write lock.
//! Instances and filters are plain owned values with no interior mutability.

pub mod cli;
pub mod document;
pub mod error;
pub mod filter;
pub mod generator;
pub mod key_cache;
pub mod logging;
pub mod minify;
pub mod model;
pub mod runtime_config;
pub mod serializer;
pub mod validator;

pub use document::{load_schema_document, SchemaRegistry};
pub use error::{ModelError, Violation};
pub use filter::{AttributeFilter, FilterEntry};
pub use minify::{generate_attribute_key, generate_minified_keys, KeyTable};
pub use model::{AttributeDescriptor, AttributeKind, ModelInstance, ModelSchema, ScalarKind, Value};
pub use serializer::{serialize, SerializeOptions};
pub use validator::{validate, ValidateOptions};
