//! # Key Table Cache Module
//!
//! Thread-safe, process-wide cache of minified [`KeyTable`]s.
//!
//! ## Overview
//!
//! Both pipelines translate attribute names to tokens on every minified call. The
//! table for a schema is computed the first time it is needed and then shared as an
//! `Arc<KeyTable>` by every later call.
//!
//! ## Cache Key
//!
//! Tables are keyed by [`SchemaId`] (`"<model name>:<fingerprint>"`), never by object
//! identity. Two separately built but identical schemas share one table.
//!
//! ## Thread Safety
//!
//! The cache is an `Arc<RwLock<HashMap>>`:
//! - Cache hits only take the read lock
//! - A miss takes the write lock, checks again and builds under it, so a table is
//!   built at most once per schema id
//! - A poisoned lock is recovered; the map only ever holds complete tables
//!
//! ## Configuration
//!
//! The process-wide cache can be disabled with `BRRTBIND_KEY_CACHE=off`. Tables are
//! then rebuilt per call, with identical results.

use crate::minify::KeyTable;
use crate::model::{ModelSchema, SchemaId};
use crate::runtime_config::RuntimeConfig;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Cache of key tables keyed by schema id.
///
/// ```rust
/// use brrtbind::key_cache::KeyTableCache;
/// use brrtbind::model::{AttributeDescriptor, ModelSchema};
///
/// let schema = ModelSchema::builder("Person")
///     .attribute(AttributeDescriptor::string("name"))
///     .build()
///     .unwrap();
/// let cache = KeyTableCache::new(true);
/// let table = cache.get_or_build(&schema);
/// assert_eq!(table.token_for("name"), Some("a"));
/// assert_eq!(cache.size(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct KeyTableCache {
    tables: Arc<RwLock<HashMap<SchemaId, Arc<KeyTable>>>>,
    enabled: bool,
}

static GLOBAL: Lazy<KeyTableCache> =
    Lazy::new(|| KeyTableCache::new(RuntimeConfig::from_env().key_cache));

/// The process-wide cache.
pub fn global() -> &'static KeyTableCache {
    &GLOBAL
}

/// Key table for `schema` from the process-wide cache.
pub fn key_table(schema: &ModelSchema) -> Arc<KeyTable> {
    global().get_or_build(schema)
}

impl KeyTableCache {
    pub fn new(enabled: bool) -> Self {
        info!(enabled = enabled, "Initializing minified key table cache");
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cached table for `schema`, building it on first use.
    pub fn get_or_build(&self, schema: &ModelSchema) -> Arc<KeyTable> {
        if !self.enabled {
            return Arc::new(KeyTable::build(schema));
        }

        {
            let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(table) = tables.get(schema.id()) {
                debug!(
                    model = schema.name(),
                    schema_id = %schema.id(),
                    "Key table cache hit"
                );
                return Arc::clone(table);
            }
        }

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have built it while we waited for the write lock
        if let Some(existing) = tables.get(schema.id()) {
            debug!(
                model = schema.name(),
                schema_id = %schema.id(),
                "Key table built by another thread"
            );
            return Arc::clone(existing);
        }

        let table = Arc::new(KeyTable::build(schema));
        tables.insert(schema.id().clone(), Arc::clone(&table));
        info!(
            model = schema.name(),
            schema_id = %schema.id(),
            attributes = table.sorted_names().len(),
            cache_size = tables.len(),
            "Key table built and cached"
        );
        table
    }

    /// Build tables for `schemas` and every model nested inside them. Returns the number
    /// of schemas visited.
    pub fn prebuild<'a, I>(&self, schemas: I) -> usize
    where
        I: IntoIterator<Item = &'a Arc<ModelSchema>>,
    {
        let mut count = 0;
        let mut stack: Vec<&Arc<ModelSchema>> = schemas.into_iter().collect();
        while let Some(schema) = stack.pop() {
            self.get_or_build(schema);
            count += 1;
            stack.extend(schema.attributes().iter().filter_map(|a| a.nested_schema()));
        }
        debug!(count = count, cache_size = self.size(), "Key tables prebuilt");
        count
    }

    pub fn size(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop every cached table. Later calls rebuild them on demand.
    pub fn clear(&self) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = tables.len();
        tables.clear();
        info!(dropped = dropped, "Key table cache cleared");
    }
}
