//! Configuration contracts
//!
//! Configurations are immutable bags of step parameters, consumed read-only
//! by exactly one step builder. The shared [`BaseConfig`] carries the
//! pipeline-level fields in three tiers: required user inputs, defaulted
//! system inputs, and fields derived eagerly at construction. No lazy
//! initialization, so there is no access-ordering hazard.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Contract every step configuration implements
///
/// The compiler only needs the variant tag plus a few resolution hints;
/// builders downcast through `as_any` to reach their concrete fields.
pub trait StepConfig: fmt::Debug + Send + Sync {
    /// Variant tag used for step-type lookup, e.g. "TabularPreprocessConfig"
    fn config_type(&self) -> &str;

    /// Job-type hint used by config resolution ("training", "calibration", ...)
    fn job_type(&self) -> Option<&str> {
        None
    }

    /// Name of the pipeline context this config belongs to
    fn pipeline_name(&self) -> Option<&str> {
        None
    }

    /// Base location under which generated step outputs are placed
    fn base_location(&self) -> Option<&str> {
        None
    }

    /// Concrete-type escape hatch for builders
    fn as_any(&self) -> &dyn Any;
}

/// Shared pipeline-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseConfig {
    // Tier 1: required user inputs
    pub author: String,
    pub bucket: String,
    pub role: String,
    pub service_name: String,

    // Tier 2: system inputs with defaults
    pub region: String,
    pub pipeline_version: String,
    pub framework_version: String,

    // Tier 3: derived at construction
    pub pipeline_name: String,
    pub pipeline_location: String,
}

impl BaseConfig {
    /// Start building a config from the required tier-1 fields
    pub fn builder(
        author: impl Into<String>,
        bucket: impl Into<String>,
        role: impl Into<String>,
        service_name: impl Into<String>,
    ) -> BaseConfigBuilder {
        BaseConfigBuilder {
            author: author.into(),
            bucket: bucket.into(),
            role: role.into(),
            service_name: service_name.into(),
            region: None,
            pipeline_version: None,
            framework_version: None,
        }
    }
}

/// Builder for [`BaseConfig`]
pub struct BaseConfigBuilder {
    author: String,
    bucket: String,
    role: String,
    service_name: String,
    region: Option<String>,
    pipeline_version: Option<String>,
    framework_version: Option<String>,
}

impl BaseConfigBuilder {
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn pipeline_version(mut self, version: impl Into<String>) -> Self {
        self.pipeline_version = Some(version.into());
        self
    }

    pub fn framework_version(mut self, version: impl Into<String>) -> Self {
        self.framework_version = Some(version.into());
        self
    }

    /// Validate tier-1 fields, apply tier-2 defaults and derive tier-3 fields
    pub fn build(self) -> Result<BaseConfig> {
        for (field, value) in [
            ("author", &self.author),
            ("bucket", &self.bucket),
            ("role", &self.role),
            ("service_name", &self.service_name),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidConfiguration(format!(
                    "required field '{}' must not be empty",
                    field
                )));
            }
        }

        let region = self.region.unwrap_or_else(|| "us-east-1".to_string());
        let pipeline_version = self.pipeline_version.unwrap_or_else(|| "1.0".to_string());
        let framework_version = self.framework_version.unwrap_or_else(|| "1.7".to_string());

        let pipeline_name = format!("{}-{}-{}", self.author, self.service_name, region);
        let pipeline_location = format!(
            "s3://{}/weaver/{}_{}",
            self.bucket, pipeline_name, pipeline_version
        );

        Ok(BaseConfig {
            author: self.author,
            bucket: self.bucket,
            role: self.role,
            service_name: self.service_name,
            region,
            pipeline_version,
            framework_version,
            pipeline_name,
            pipeline_location,
        })
    }
}
