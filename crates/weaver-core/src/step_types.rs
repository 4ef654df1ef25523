//! Config-to-step-type mapping
//!
//! An explicit, injectable total mapping from configuration variant tag to
//! step-type tag. Unknown variants are rejected at lookup and duplicates at
//! registration; step types are never derived from type names at use time.

use crate::error::{CoreError, Result};
use indexmap::IndexMap;

/// Total mapping from config variant tag to step-type tag
#[derive(Debug, Clone, Default)]
pub struct StepTypeMap {
    entries: IndexMap<String, String>,
}

impl StepTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a config variant; duplicate variants are rejected
    pub fn register(
        &mut self,
        config_type: impl Into<String>,
        step_type: impl Into<String>,
    ) -> Result<()> {
        let config_type = config_type.into();
        if self.entries.contains_key(&config_type) {
            return Err(CoreError::DuplicateRegistration(config_type));
        }
        self.entries.insert(config_type, step_type.into());
        Ok(())
    }

    /// Look up the step type for a config variant
    pub fn step_type_for(&self, config_type: &str) -> Result<&str> {
        self.entries
            .get(config_type)
            .map(String::as_str)
            .ok_or_else(|| CoreError::UnknownConfigType(config_type.to_string()))
    }

    pub fn contains(&self, config_type: &str) -> bool {
        self.entries.contains_key(config_type)
    }

    /// Iterate (config variant, step type) entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
