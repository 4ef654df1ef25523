//! Integration tests for the DAG compiler façade
//!
//! Exercises compilation, validation and preview end-to-end with mock
//! builders standing in for the orchestration SDK.

mod common;

use common::{demo_catalog, demo_dag, demo_registry, session, Journal};
use std::sync::{Arc, Mutex};
use weaver_sdk::{
    compile_dag_to_pipeline, DagCompiler, PipelineApiError, PipelineDag, StepInput,
};

fn compiler_with(train_source: &str) -> (DagCompiler, Journal) {
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));
    let registry = demo_registry(&journal, train_source);
    let compiler = DagCompiler::new(demo_catalog(), registry, session()).with_role("test-role");
    (compiler, journal)
}

#[test]
fn test_compile_wires_semantic_match() {
    let (compiler, journal) = compiler_with("DataLoad");

    let output = compiler.compile(&demo_dag(), Some("fraud-pipeline")).unwrap();
    assert_eq!(output.pipeline.name(), "fraud-pipeline");
    assert_eq!(output.pipeline.step_names(), vec!["load", "train"]);

    // train's "training_data" input was satisfied by load's
    // "model_input_data" output through the semantic match
    let journal = journal.lock().unwrap();
    let (_, train_reqs) = journal.iter().find(|(name, _)| name == "train").unwrap();
    match &train_reqs.inputs["training_data"] {
        StepInput::Reference { source_step, value } => {
            assert_eq!(source_step, "load");
            assert_eq!(
                value,
                &serde_json::json!("s3://test-bucket/fraud/dataload/model_input_data")
            );
        }
        other => panic!("expected property reference, got {:?}", other),
    }
}

#[test]
fn test_incompatible_source_aborts_compilation() {
    // train only accepts producers of step type "OtherType"
    let (compiler, journal) = compiler_with("OtherType");

    let err = compiler.compile(&demo_dag(), None).unwrap_err();
    match err {
        PipelineApiError::CompilationFailed { source } => {
            assert!(source.to_string().contains("train.training_data"));
        }
        other => panic!("expected compilation failure, got {:?}", other),
    }
    // Nothing was instantiated
    assert!(journal.lock().unwrap().is_empty());
}

#[test]
fn test_missing_config_surfaces_in_validation_and_fails_compile() {
    let (compiler, _journal) = compiler_with("DataLoad");
    let mut dag = demo_dag();
    dag.add_node("ghost_step");
    dag.add_edge("train", "ghost_step").unwrap();

    let result = compiler.validate_dag_compatibility(&dag);
    assert!(!result.is_valid);
    assert_eq!(result.missing_configs, vec!["ghost_step"]);

    assert!(compiler.compile(&dag, None).is_err());
}

#[test]
fn test_validation_passes_on_compatible_dag() {
    let (compiler, _journal) = compiler_with("DataLoad");

    let result = compiler.validate_dag_compatibility(&demo_dag());
    assert!(result.is_valid, "unexpected failures: {}", result.summary());
    assert!(result.dependency_issues.is_empty());
}

#[test]
fn test_validation_reports_dependency_issues_without_throwing() {
    let (compiler, _journal) = compiler_with("OtherType");

    let result = compiler.validate_dag_compatibility(&demo_dag());
    assert!(!result.is_valid);
    assert_eq!(result.dependency_issues, vec!["train.training_data"]);
}

#[test]
fn test_validation_of_empty_dag_never_throws() {
    let (compiler, _journal) = compiler_with("DataLoad");

    let result = compiler.validate_dag_compatibility(&PipelineDag::new());
    assert!(!result.is_valid);
    assert!(result.config_errors.contains_key("template"));
}

#[test]
fn test_generated_names_vary_only_in_suffix() {
    let (compiler, journal) = compiler_with("DataLoad");

    let first = compiler.compile(&demo_dag(), None).unwrap();
    let journal_len_after_first = journal.lock().unwrap().len();
    let second = compiler.compile(&demo_dag(), None).unwrap();

    // Base name comes from the configs' pipeline context and the default
    // version; only the random suffix may differ
    let first_name = first.pipeline.name();
    let second_name = second.pipeline.name();
    assert!(first_name.starts_with("fraud-model-1-0-"), "got {}", first_name);
    assert_eq!(
        first_name[..first_name.len() - 4],
        second_name[..second_name.len() - 4]
    );

    // Identical wiring across the two compilations
    let journal = journal.lock().unwrap();
    let (first_run, second_run) = journal.split_at(journal_len_after_first);
    assert_eq!(first_run, second_run);
}

#[test]
fn test_preview_resolution() {
    let (compiler, _journal) = compiler_with("DataLoad");
    let mut dag = demo_dag();
    dag.add_node("unmatched_step");

    let preview = compiler.preview_resolution(&dag);

    assert_eq!(preview.node_config_map["load"], "DataLoadConfig");
    assert_eq!(preview.resolution_confidence["load"], 1.0);
    assert_eq!(preview.config_builder_map["DataLoadConfig"], "DataLoad");

    assert_eq!(preview.node_config_map["unmatched_step"], "UNRESOLVED");
    assert!(preview
        .recommendations
        .iter()
        .any(|r| r.contains("unmatched_step")));
}

#[test]
fn test_compile_with_report() {
    let (compiler, _journal) = compiler_with("DataLoad");

    let (output, report) = compiler.compile_with_report(&demo_dag(), Some("reported")).unwrap();
    assert_eq!(report.pipeline_name, output.pipeline.name());
    assert_eq!(report.steps, vec!["load", "train"]);
    assert_eq!(report.resolution_details["load"].builder_type, "DataLoad");
    assert!((report.avg_confidence - 1.0).abs() < 1e-9);
    assert_eq!(report.metadata["dag_nodes"], serde_json::json!(2));
    assert!(report.summary().contains("reported"));
}

#[test]
fn test_validate_catalog() {
    let (compiler, _journal) = compiler_with("DataLoad");

    let catalog = compiler.validate_catalog();
    assert!(catalog.valid);
    assert_eq!(catalog.config_count, 2);
    assert_eq!(catalog.config_names, vec!["load", "train"]);
    assert!(catalog.config_types.contains(&"DataLoadConfig".to_string()));
}

#[test]
fn test_supported_step_types() {
    let (compiler, _journal) = compiler_with("DataLoad");
    assert_eq!(compiler.supported_step_types(), vec!["DataLoad", "Training"]);
}

#[test]
fn test_one_call_entry_point() {
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));
    let registry = demo_registry(&journal, "DataLoad");

    let output = compile_dag_to_pipeline(
        &demo_dag(),
        demo_catalog(),
        registry,
        session(),
        Some("test-role".to_string()),
        Some("one-call"),
    )
    .unwrap();

    assert_eq!(output.pipeline.name(), "one-call");
    assert_eq!(journal.lock().unwrap().len(), 2);
}
