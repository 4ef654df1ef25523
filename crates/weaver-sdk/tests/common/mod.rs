//! Shared fixtures for SDK integration tests

use serde_json::{json, Value};
use std::any::Any;
use std::sync::{Arc, Mutex};
use weaver_sdk::{
    BuilderRegistry, ConfigCatalog, DependencySpec, DependencyType, NodeType, OutputSpec,
    PipelineDag, PropertyPath, SessionContext, StepBuilder, StepBuilderError, StepConfig,
    StepHandle, StepRequirements, StepSpecification,
};
use weaver_core::PropertyBag;

/// Journal of every create_step call, keyed by step name
pub type Journal = Arc<Mutex<Vec<(String, StepRequirements)>>>;

#[derive(Debug)]
pub struct MockConfig {
    pub step_name: String,
    pub config_type: &'static str,
    pub job_type: Option<&'static str>,
}

impl StepConfig for MockConfig {
    fn config_type(&self) -> &str {
        self.config_type
    }

    fn job_type(&self) -> Option<&str> {
        self.job_type
    }

    fn pipeline_name(&self) -> Option<&str> {
        Some("fraud-model")
    }

    fn base_location(&self) -> Option<&str> {
        Some("s3://test-bucket/fraud")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct MockStep {
    name: String,
    properties: Option<Value>,
}

impl PropertyBag for MockStep {
    fn property_root(&self) -> Option<Value> {
        self.properties.clone()
    }
}

impl StepHandle for MockStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_dependency(&mut self, _upstream: &str) {}
}

pub struct MockBuilder {
    step_name: String,
    spec: StepSpecification,
    journal: Journal,
}

impl StepBuilder for MockBuilder {
    fn step_type(&self) -> &str {
        &self.spec.step_type
    }

    fn specification(&self) -> Option<&StepSpecification> {
        Some(&self.spec)
    }

    fn validate_configuration(&self) -> Result<(), StepBuilderError> {
        Ok(())
    }

    fn create_step(
        &mut self,
        requirements: StepRequirements,
    ) -> Result<Box<dyn StepHandle>, StepBuilderError> {
        self.journal
            .lock()
            .unwrap()
            .push((self.step_name.clone(), requirements.clone()));

        let outputs: serde_json::Map<String, Value> = requirements
            .outputs
            .iter()
            .map(|(name, location)| (name.clone(), json!({ "S3Uri": location })))
            .collect();

        Ok(Box::new(MockStep {
            name: self.step_name.clone(),
            properties: Some(json!({ "properties": { "Outputs": outputs } })),
        }))
    }
}

/// Source spec: a data-load step exposing "model_input_data"
pub fn load_spec() -> StepSpecification {
    StepSpecification::new(
        "DataLoad",
        NodeType::Source,
        vec![],
        vec![OutputSpec::new(
            "model_input_data",
            DependencyType::ProcessingOutput,
            PropertyPath::parse("properties.Outputs['model_input_data'].S3Uri").unwrap(),
        )
        .with_description("Input data prepared for model training")],
    )
    .unwrap()
}

/// Sink spec: a training step wanting "training_data" from the given sources
pub fn train_spec(compatible_source: &str) -> StepSpecification {
    StepSpecification::new(
        "Training",
        NodeType::Sink,
        vec![DependencySpec::new("training_data", DependencyType::ProcessingOutput)
            .with_compatible_sources([compatible_source])
            .with_semantic_keywords(["training", "data"])],
        vec![],
    )
    .unwrap()
}

/// Builder registry producing journaling mock builders
pub fn demo_registry(journal: &Journal, train_source: &str) -> Arc<BuilderRegistry> {
    let mut registry = BuilderRegistry::new();

    for (config_type, spec) in [
        ("DataLoadConfig", load_spec()),
        ("TrainingConfig", train_spec(train_source)),
    ] {
        let journal = journal.clone();
        let step_type = spec.step_type.clone();
        registry
            .register_builder(
                step_type.clone(),
                Box::new(move |ctx| {
                    let config = ctx
                        .config
                        .as_any()
                        .downcast_ref::<MockConfig>()
                        .ok_or_else(|| {
                            StepBuilderError::Configuration("expected mock config".to_string())
                        })?;
                    Ok(Box::new(MockBuilder {
                        step_name: config.step_name.clone(),
                        spec: spec.clone(),
                        journal: journal.clone(),
                    }))
                }),
            )
            .unwrap();
        registry.map_config(config_type, step_type).unwrap();
    }

    Arc::new(registry)
}

/// Catalog whose logical names match the demo DAG's node names
pub fn demo_catalog() -> ConfigCatalog {
    let mut catalog = ConfigCatalog::new();
    catalog.insert(
        "load",
        Arc::new(MockConfig {
            step_name: "load".to_string(),
            config_type: "DataLoadConfig",
            job_type: None,
        }),
    );
    catalog.insert(
        "train",
        Arc::new(MockConfig {
            step_name: "train".to_string(),
            config_type: "TrainingConfig",
            job_type: Some("training"),
        }),
    );
    catalog
}

/// The two-node demo DAG: load -> train
pub fn demo_dag() -> PipelineDag {
    let mut dag = PipelineDag::new();
    dag.add_node("load");
    dag.add_node("train");
    dag.add_edge("load", "train").unwrap();
    dag
}

pub fn session() -> SessionContext {
    SessionContext::new("test-session").with_setting("region", "us-east-1")
}
