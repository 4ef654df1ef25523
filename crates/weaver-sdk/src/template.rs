//! Dynamic pipeline template
//!
//! A template wires one DAG to the catalog, the config resolver and the
//! builder registry without paying for assembly. It can be inspected (config
//! map, builder coverage) before a pipeline is generated from it; compilation
//! entry points create one per call.

use crate::catalog::CatalogMetadata;
use crate::error::Result;
use indexmap::IndexMap;
use std::sync::Arc;
use weaver_assembler::{AssemblyOutput, BuilderRegistry, PipelineAssembler, SessionContext};
use weaver_compiler::ConfigResolver;
use weaver_core::{PipelineDag, StepConfig};

/// Default base used when no metadata or config names the pipeline
const DEFAULT_BASE_NAME: &str = "weaver";
const DEFAULT_VERSION: &str = "1.0";

/// One DAG wired to config resolution and builder lookup
pub struct PipelineTemplate {
    dag: PipelineDag,
    configs: IndexMap<String, Arc<dyn StepConfig>>,
    metadata: Option<CatalogMetadata>,
    config_resolver: ConfigResolver,
    builder_registry: Arc<BuilderRegistry>,
    session: Arc<SessionContext>,
    role: Option<String>,
}

impl PipelineTemplate {
    pub(crate) fn new(
        dag: PipelineDag,
        configs: IndexMap<String, Arc<dyn StepConfig>>,
        metadata: Option<CatalogMetadata>,
        config_resolver: ConfigResolver,
        builder_registry: Arc<BuilderRegistry>,
        session: Arc<SessionContext>,
        role: Option<String>,
    ) -> Self {
        Self {
            dag,
            configs,
            metadata,
            config_resolver,
            builder_registry,
            session,
            role,
        }
    }

    pub fn dag(&self) -> &PipelineDag {
        &self.dag
    }

    /// The catalog entries this template resolves against
    pub fn configs(&self) -> &IndexMap<String, Arc<dyn StepConfig>> {
        &self.configs
    }

    /// Resolve every DAG node to its best-matching config
    pub fn resolve_config_map(
        &self,
    ) -> std::result::Result<
        IndexMap<String, Arc<dyn StepConfig>>,
        weaver_compiler::ConfigResolutionError,
    > {
        let nodes: Vec<String> = self.dag.nodes().map(str::to_string).collect();
        self.config_resolver.resolve_config_map(&nodes, &self.configs)
    }

    /// Config variants in the resolved map whose step type has no builder
    pub fn unresolvable_builders(
        &self,
        config_map: &IndexMap<String, Arc<dyn StepConfig>>,
    ) -> Vec<String> {
        let mut unresolvable = Vec::new();
        for config in config_map.values() {
            if self
                .builder_registry
                .step_type_for(config.config_type())
                .is_err()
                && !unresolvable.contains(&config.config_type().to_string())
            {
                unresolvable.push(config.config_type().to_string());
            }
        }
        unresolvable
    }

    /// Base name used for generated pipeline names
    pub fn base_name(&self) -> String {
        self.metadata
            .as_ref()
            .and_then(|m| m.pipeline_name.clone())
            .or_else(|| {
                self.configs
                    .values()
                    .find_map(|c| c.pipeline_name().map(str::to_string))
            })
            .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string())
    }

    /// Version used for generated pipeline names
    pub fn version(&self) -> String {
        self.metadata
            .as_ref()
            .and_then(|m| m.pipeline_version.clone())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string())
    }

    /// Resolve configs, assemble and generate the pipeline
    pub fn generate_pipeline(&self, pipeline_name: &str) -> Result<AssemblyOutput> {
        let config_map = self.resolve_config_map()?;
        let mut assembler = PipelineAssembler::new(
            self.dag.clone(),
            config_map,
            self.builder_registry.clone(),
            self.session.clone(),
            self.role.clone(),
            None,
            None,
        )?;
        Ok(assembler.generate_pipeline(pipeline_name)?)
    }
}

impl std::fmt::Debug for PipelineTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineTemplate")
            .field("nodes", &self.dag.node_count())
            .field("configs", &self.configs.keys().collect::<Vec<_>>())
            .finish()
    }
}
