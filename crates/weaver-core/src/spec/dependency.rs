//! Dependency (input slot) specifications

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of the data flowing between steps
///
/// Used both for declared outputs and for requested dependencies; the
/// semantic matcher scores pairs of these for compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Trained model artifacts (e.g. a model tarball)
    ModelArtifacts,
    /// Output of a processing step
    ProcessingOutput,
    /// Output of a training step
    TrainingOutput,
    /// Hyperparameter set
    Hyperparameters,
    /// Request/response payload samples
    Payload,
    /// Arbitrary property exposed by a producer
    CustomProperty,
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            DependencyType::ModelArtifacts => "model_artifacts",
            DependencyType::ProcessingOutput => "processing_output",
            DependencyType::TrainingOutput => "training_output",
            DependencyType::Hyperparameters => "hyperparameters",
            DependencyType::Payload => "payload",
            DependencyType::CustomProperty => "custom_property",
        };
        f.write_str(tag)
    }
}

/// A declared input slot of a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Stable semantic identifier for this input slot
    pub logical_name: String,

    /// Expected classification of the upstream output
    pub dependency_type: DependencyType,

    /// Whether resolution may leave this input absent
    pub required: bool,

    /// Producer step types allowed to satisfy this input (empty = any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compatible_sources: Vec<String>,

    /// Keywords the fuzzy matcher looks for in candidate outputs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub semantic_keywords: Vec<String>,

    /// Data type tag, e.g. "S3Uri"
    pub data_type: String,

    /// Human-readable description, never matched on
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl DependencySpec {
    /// Create a required dependency with the default "S3Uri" data type
    pub fn new(logical_name: impl Into<String>, dependency_type: DependencyType) -> Self {
        Self {
            logical_name: logical_name.into(),
            dependency_type,
            required: true,
            compatible_sources: Vec::new(),
            semantic_keywords: Vec::new(),
            data_type: "S3Uri".to_string(),
            description: String::new(),
        }
    }

    /// Mark this dependency as optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Restrict the producer step types that may satisfy this input
    pub fn with_compatible_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compatible_sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Set the keywords used for fuzzy matching
    pub fn with_semantic_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.semantic_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Override the data type tag
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    /// Attach a human-readable description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
