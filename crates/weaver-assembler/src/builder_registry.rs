//! Builder registry
//!
//! Couples the config-variant-to-step-type mapping with one builder factory
//! per step type. Registration is checked: a step type must have a factory
//! before a config variant may map to it, and duplicates are rejected, so
//! lookups at assembly time are total.

use crate::contract::{BuilderContext, StepBuilder, StepBuilderError};
use crate::error::{AssemblyError, Result};
use indexmap::IndexMap;
use weaver_core::{CoreError, StepTypeMap};

/// Factory constructing one builder instance for a node
pub type BuilderFactory =
    Box<dyn Fn(BuilderContext) -> std::result::Result<Box<dyn StepBuilder>, StepBuilderError> + Send + Sync>;

/// Registry of builder factories keyed by step type
#[derive(Default)]
pub struct BuilderRegistry {
    step_types: StepTypeMap,
    factories: IndexMap<String, BuilderFactory>,
}

impl BuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder factory for a step type
    pub fn register_builder(
        &mut self,
        step_type: impl Into<String>,
        factory: BuilderFactory,
    ) -> std::result::Result<(), CoreError> {
        let step_type = step_type.into();
        if self.factories.contains_key(&step_type) {
            return Err(CoreError::DuplicateRegistration(step_type));
        }
        self.factories.insert(step_type, factory);
        Ok(())
    }

    /// Map a config variant to a step type that already has a builder
    pub fn map_config(
        &mut self,
        config_type: impl Into<String>,
        step_type: impl Into<String>,
    ) -> std::result::Result<(), CoreError> {
        let step_type = step_type.into();
        if !self.factories.contains_key(&step_type) {
            return Err(CoreError::InvalidConfiguration(format!(
                "no builder registered for step type '{}'",
                step_type
            )));
        }
        self.step_types.register(config_type, step_type)
    }

    /// The step type a config variant resolves to
    pub fn step_type_for(&self, config_type: &str) -> Result<&str> {
        self.step_types
            .step_type_for(config_type)
            .map_err(|_| AssemblyError::UnknownConfigVariant(config_type.to_string()))
    }

    /// Construct a builder for a config variant
    pub fn create_builder(
        &self,
        config_type: &str,
        context: BuilderContext,
    ) -> std::result::Result<Box<dyn StepBuilder>, StepBuilderError> {
        let step_type = self.step_types.step_type_for(config_type).map_err(|e| {
            StepBuilderError::Configuration(e.to_string())
        })?;
        let factory = self
            .factories
            .get(step_type)
            .ok_or_else(|| {
                StepBuilderError::Configuration(format!(
                    "no builder registered for step type '{}'",
                    step_type
                ))
            })?;
        factory(context)
    }

    /// The config-variant mapping, for validation and preview
    pub fn step_types(&self) -> &StepTypeMap {
        &self.step_types
    }

    /// Step types with a registered factory, in registration order
    pub fn supported_step_types(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderRegistry")
            .field("step_types", &self.step_types)
            .field("factories", &self.supported_step_types())
            .finish()
    }
}
