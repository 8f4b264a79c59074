//! # Generator Module
//!
//! Read-only metadata for client code generators.
//!
//! For every attribute of a schema, [`filter_attributes`] produces a [`FilterAttribute`]
//! row: public name, CamelCase and field identifier forms, model/array flags, element
//! type and constraints. Generators turn the rows into client-side filter classes that
//! serialize to the [`crate::filter::AttributeFilter`] wire form.
//!
//! ```rust
//! use brrtbind::generator::filter_attributes;
//! use brrtbind::model::{AttributeDescriptor, ModelSchema};
//!
//! let schema = ModelSchema::builder("Person")
//!     .attribute(AttributeDescriptor::string("first_name"))
//!     .build()
//!     .unwrap();
//! let rows = filter_attributes(&schema);
//! assert_eq!(rows[0].camel_case, "FirstName");
//! ```

mod attributes;

pub use attributes::{filter_attributes, to_camel_case, FilterAttribute};
