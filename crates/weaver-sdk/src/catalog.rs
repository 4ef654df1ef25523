//! Config catalogs
//!
//! The collaborator surface the compiler consumes configurations through: a
//! mapping from logical config name to validated instance, plus optional run
//! metadata. The YAML loader dispatches each entry through a checked registry
//! of per-variant deserializers, so unknown config types fail at load time
//! rather than deep inside compilation.
//!
//! Expected document shape:
//!
//! ```yaml
//! metadata:
//!   pipeline_name: fraud-model
//!   pipeline_version: "1.2"
//! configs:
//!   train_data_load:
//!     type: DataLoadConfig
//!     job_type: training
//! ```

use crate::error::{PipelineApiError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use weaver_core::StepConfig;

/// Deserializer for one config variant
pub type ConfigDeserializer = Box<
    dyn Fn(serde_yaml::Value) -> std::result::Result<Arc<dyn StepConfig>, serde_yaml::Error>
        + Send
        + Sync,
>;

/// Checked registry of config deserializers keyed by variant tag
#[derive(Default)]
pub struct ConfigTypeRegistry {
    deserializers: IndexMap<String, ConfigDeserializer>,
}

impl ConfigTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a deserializer for a variant tag; duplicates are rejected
    pub fn register(
        &mut self,
        config_type: impl Into<String>,
        deserializer: ConfigDeserializer,
    ) -> Result<()> {
        let config_type = config_type.into();
        if self.deserializers.contains_key(&config_type) {
            return Err(PipelineApiError::Catalog(format!(
                "duplicate config type registration: '{}'",
                config_type
            )));
        }
        self.deserializers.insert(config_type, deserializer);
        Ok(())
    }

    pub fn contains(&self, config_type: &str) -> bool {
        self.deserializers.contains_key(config_type)
    }

    /// Deserialize one entry through its registered variant
    pub fn deserialize(
        &self,
        config_type: &str,
        value: serde_yaml::Value,
    ) -> Result<Arc<dyn StepConfig>> {
        let deserializer = self.deserializers.get(config_type).ok_or_else(|| {
            PipelineApiError::Catalog(format!("unknown config type: '{}'", config_type))
        })?;
        deserializer(value).map_err(|e| {
            PipelineApiError::Catalog(format!("config type '{}': {}", config_type, e))
        })
    }
}

impl std::fmt::Debug for ConfigTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigTypeRegistry")
            .field("config_types", &self.deserializers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Optional run metadata carried next to the configs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Loaded mapping from logical config name to validated instance
#[derive(Default)]
pub struct ConfigCatalog {
    configs: IndexMap<String, Arc<dyn StepConfig>>,
    metadata: Option<CatalogMetadata>,
}

impl ConfigCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a config under its logical name
    pub fn insert(&mut self, name: impl Into<String>, config: Arc<dyn StepConfig>) {
        self.configs.insert(name.into(), config);
    }

    pub fn with_metadata(mut self, metadata: CatalogMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn StepConfig>> {
        self.configs.get(name)
    }

    /// All configs keyed by logical name, in catalog order
    pub fn configs(&self) -> &IndexMap<String, Arc<dyn StepConfig>> {
        &self.configs
    }

    pub fn metadata(&self) -> Option<&CatalogMetadata> {
        self.metadata.as_ref()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Load a catalog from a YAML document
    pub fn from_yaml_str(content: &str, registry: &ConfigTypeRegistry) -> Result<Self> {
        #[derive(Deserialize)]
        struct Document {
            #[serde(default)]
            metadata: Option<CatalogMetadata>,
            configs: IndexMap<String, serde_yaml::Value>,
        }

        let document: Document = serde_yaml::from_str(content)
            .map_err(|e| PipelineApiError::Catalog(format!("invalid catalog document: {}", e)))?;

        let mut catalog = ConfigCatalog {
            configs: IndexMap::with_capacity(document.configs.len()),
            metadata: document.metadata,
        };

        for (name, value) in document.configs {
            let config_type = value
                .get("type")
                .and_then(serde_yaml::Value::as_str)
                .ok_or_else(|| {
                    PipelineApiError::Catalog(format!(
                        "config '{}' is missing a 'type' tag",
                        name
                    ))
                })?
                .to_string();

            let config = registry.deserialize(&config_type, value)?;
            tracing::debug!(config = %name, config_type = %config_type, "loaded config");
            catalog.configs.insert(name, config);
        }

        tracing::info!(configs = catalog.len(), "loaded config catalog");
        Ok(catalog)
    }

    /// Load a catalog from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>, registry: &ConfigTypeRegistry) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content, registry)
    }
}

impl std::fmt::Debug for ConfigCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCatalog")
            .field("configs", &self.configs.keys().collect::<Vec<_>>())
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Debug, Deserialize)]
    struct DemoConfig {
        #[serde(rename = "type")]
        _type: String,
        #[serde(default)]
        job_type: Option<String>,
    }

    impl StepConfig for DemoConfig {
        fn config_type(&self) -> &str {
            "DemoConfig"
        }

        fn job_type(&self) -> Option<&str> {
            self.job_type.as_deref()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn registry() -> ConfigTypeRegistry {
        let mut registry = ConfigTypeRegistry::new();
        registry
            .register(
                "DemoConfig",
                Box::new(|value| {
                    let config: DemoConfig = serde_yaml::from_value(value)?;
                    Ok(Arc::new(config) as Arc<dyn StepConfig>)
                }),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_load_from_yaml() {
        let yaml = r#"
metadata:
  pipeline_name: fraud-model
  pipeline_version: "1.2"
configs:
  train_data_load:
    type: DemoConfig
    job_type: training
  eval_data_load:
    type: DemoConfig
"#;

        let catalog = ConfigCatalog::from_yaml_str(yaml, &registry()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.metadata().unwrap().pipeline_name.as_deref(),
            Some("fraud-model")
        );
        assert_eq!(
            catalog.get("train_data_load").unwrap().job_type(),
            Some("training")
        );
    }

    #[test]
    fn test_unknown_type_tag_fails() {
        let yaml = r#"
configs:
  mystery:
    type: GhostConfig
"#;
        let err = ConfigCatalog::from_yaml_str(yaml, &registry()).unwrap_err();
        assert!(err.to_string().contains("GhostConfig"));
    }

    #[test]
    fn test_missing_type_tag_fails() {
        let yaml = r#"
configs:
  untyped:
    job_type: training
"#;
        let err = ConfigCatalog::from_yaml_str(yaml, &registry()).unwrap_err();
        assert!(err.to_string().contains("missing a 'type' tag"));
    }

    #[test]
    fn test_duplicate_deserializer_rejected() {
        let mut reg = registry();
        let result = reg.register(
            "DemoConfig",
            Box::new(|_| unreachable!("never called")),
        );
        assert!(result.is_err());
    }
}
