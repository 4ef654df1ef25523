//! Output slot specifications

use super::DependencyType;
use crate::property::PropertyPath;
use serde::{Deserialize, Serialize};

/// A declared output slot of a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Stable semantic identifier for this output slot
    pub logical_name: String,

    /// Alternate logical names resolvable to the same output
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Classification of the produced data
    pub output_type: DependencyType,

    /// Accessor expression addressing the runtime value on the produced step
    pub property_path: PropertyPath,

    /// Data type tag, e.g. "S3Uri"
    pub data_type: String,

    /// Human-readable description, never matched on
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl OutputSpec {
    /// Create an output with the default "S3Uri" data type
    pub fn new(
        logical_name: impl Into<String>,
        output_type: DependencyType,
        property_path: PropertyPath,
    ) -> Self {
        Self {
            logical_name: logical_name.into(),
            aliases: Vec::new(),
            output_type,
            property_path,
            data_type: "S3Uri".to_string(),
            description: String::new(),
        }
    }

    /// Add alternate logical names for this output
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
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

    /// Whether `name` is this output's logical name or one of its aliases
    pub fn answers_to(&self, name: &str) -> bool {
        self.logical_name == name || self.aliases.iter().any(|a| a == name)
    }
}
