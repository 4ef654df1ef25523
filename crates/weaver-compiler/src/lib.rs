//! Weaver Compiler - node-to-config resolution and compilation reporting
//!
//! This crate matches DAG node names to configuration instances, produces the
//! structured validation/preview/report types the façade exposes, and
//! generates pipeline names.

pub mod config_resolver;
pub mod error;
pub mod name_generator;
pub mod validation;

// Re-export main types
pub use config_resolver::{
    ConfigCandidate, ConfigResolver, MatchMethod, AMBIGUITY_MARGIN, MIN_CONFIG_CONFIDENCE,
};
pub use error::{ConfigResolutionError, Result};
pub use name_generator::{
    generate_pipeline_name, generate_random_word, sanitize_pipeline_name, validate_pipeline_name,
};
pub use validation::{
    ConversionReport, ResolutionDetail, ResolutionPreview, ValidationEngine, ValidationResult,
};
