//! Updater factory: a schema derived once, bound to a reusable merge.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::merge::{self, OutcomeSink, PatchReport, Traced};
use crate::record::{PatchTarget, Record};
use crate::schema::{Schema, SchemaRegistry};
use crate::value::ValuesBag;

/// Applies sparse patches to records of type `T`.
///
/// The schema is derived when the updater is constructed and is never
/// re-derived; each call costs one pass over the schema fields. Cloning is
/// cheap and clones share the schema.
pub struct Updater<T> {
    schema: Arc<Schema>,
    config: PatchConfig,
    _record: PhantomData<fn() -> T>,
}

impl<T: PatchTarget> Updater<T> {
    /// Creates an updater with the default configuration.
    ///
    /// # Arguments
    /// * `sample` - Any instance of `T`, typically `T::default()`
    pub fn new(sample: &T) -> Result<Self> {
        Self::with_config(sample, PatchConfig::default())
    }

    /// Creates an updater deriving its schema with `config`.
    pub fn with_config(sample: &T, config: PatchConfig) -> Result<Self> {
        let schema = Schema::build(sample, &config)?;
        Ok(Self {
            schema: Arc::new(schema),
            config,
            _record: PhantomData,
        })
    }

    /// Creates an updater whose schema comes from `registry`, deriving it on
    /// first use.
    pub fn from_registry(registry: &SchemaRegistry, sample: &T) -> Result<Self> {
        let schema = registry.get_or_register(sample)?;
        Self::from_schema(schema, *registry.config())
    }

    /// Creates an updater from an already derived schema.
    ///
    /// # Returns
    /// `Err(PatchError::SchemaMismatch)` if `schema` was derived for another
    /// record type.
    pub fn from_schema(schema: Arc<Schema>, config: PatchConfig) -> Result<Self> {
        if schema.type_id() != std::any::TypeId::of::<T>() {
            return Err(PatchError::SchemaMismatch {
                schema: schema.type_name(),
                target: std::any::type_name::<T>(),
            });
        }
        Ok(Self {
            schema,
            config,
            _record: PhantomData,
        })
    }

    /// Frozen schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Configuration the updater was built with.
    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    /// Merges `values` over `existing`, returning the updated record.
    ///
    /// # Arguments
    /// * `existing` - Record loaded from storage: a `T`, another record type,
    ///   or a JSON object
    /// * `values` - Incoming patch keyed by external field name
    ///
    /// # Returns
    /// `Err(PatchError::InvalidRecord)` if `existing` is not record-like.
    pub fn apply<S, V>(&self, existing: &S, values: &V) -> Result<T>
    where
        S: Record + ?Sized,
        V: ValuesBag + ?Sized,
    {
        self.run(existing, values, &mut ())
    }

    /// Like [`Updater::apply`], also returning per-field diagnostics.
    pub fn apply_with_report<S, V>(&self, existing: &S, values: &V) -> Result<(T, PatchReport)>
    where
        S: Record + ?Sized,
        V: ValuesBag + ?Sized,
    {
        let mut report = PatchReport::default();
        let updated = self.run(existing, values, &mut report)?;
        report.set_unknown_keys(merge::unknown_keys(&self.schema, values));
        Ok((updated, report))
    }

    /// Converts the updater into a plain callable.
    pub fn into_fn(self) -> impl Fn(&dyn Record, &dyn ValuesBag) -> Result<T> + Clone + Send + Sync {
        move |existing: &dyn Record, values: &dyn ValuesBag| self.apply(existing, values)
    }

    fn run<S, V, K>(&self, existing: &S, values: &V, sink: &mut K) -> Result<T>
    where
        S: Record + ?Sized,
        V: ValuesBag + ?Sized,
        K: OutcomeSink,
    {
        let policy = self.config.coercion;
        if self.config.trace_fallbacks {
            let mut traced = Traced::new(self.schema.type_name(), sink);
            merge::merge_into(&self.schema, values, existing, policy, &mut traced)
        } else {
            merge::merge_into(&self.schema, values, existing, policy, sink)
        }
    }
}

impl<T> Clone for Updater<T> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            config: self.config,
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Updater<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater")
            .field("record", &self.schema.type_name())
            .field("fields", &self.schema.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Builds the schema of `T` once and returns a callable merging patches over
/// existing records.
///
/// # Returns
/// `Err(PatchError::InvalidInstance)` or `Err(PatchError::EmptySchema)` when
/// no schema can be derived from `sample`.
pub fn make_updater<T: PatchTarget>(
    sample: &T,
) -> Result<impl Fn(&dyn Record, &dyn ValuesBag) -> Result<T> + Clone + Send + Sync> {
    Ok(Updater::new(sample)?.into_fn())
}
