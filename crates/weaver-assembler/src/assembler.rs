//! Pipeline assembler
//!
//! Assembles pipeline steps from a DAG, resolved configs and step builders,
//! using specification-based dependency resolution:
//! 1. Initialize one step builder per DAG node
//! 2. Propagate messages between steps along DAG edges (wiring)
//! 3. Instantiate steps in topological order, resolving lazy property
//!    references into producers
//! 4. Construct the pipeline from the ordered step list
//!
//! Construction-time validation is fatal; the only soft-fail in the whole
//! flow is a property reference that cannot be resolved, which degrades to a
//! placeholder location.

use crate::builder_registry::BuilderRegistry;
use crate::contract::{
    BuilderContext, ExecutablePipeline, SessionContext, StepBuilder, StepHandle, StepInput,
    StepRequirements,
};
use crate::error::{AssemblyError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use weaver_core::{PipelineDag, StepConfig, StepSpecification};
use weaver_resolver::registry::DEFAULT_CONTEXT;
use weaver_resolver::{
    DependencyResolver, PropertyReference, RegistryManager, SpecificationRegistry,
    ACCEPTANCE_THRESHOLD,
};

/// Base location used when a config declares none
const DEFAULT_BASE_LOCATION: &str = "s3://default-bucket/pipeline";

/// Prefix of the placeholder locations produced by the degradation path
const PLACEHOLDER_PREFIX: &str = "s3://pipeline-reference";

/// Assembly phases, entered strictly in order within one generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssemblyState {
    Initialized,
    BuildersReady,
    MessagesPropagated,
    StepsInstantiated,
    PipelineBuilt,
}

/// Best producer match recorded for one (consumer, dependency) slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageMatch {
    pub source_step: String,
    pub source_output: String,
    pub compatibility: f64,
}

/// Result of one pipeline generation call
///
/// Besides the pipeline itself this carries the auxiliary payloads builders
/// expose (e.g. external-service request documents), keyed by step name and
/// owned by the caller.
#[derive(Debug)]
pub struct AssemblyOutput {
    pub pipeline: ExecutablePipeline,
    pub step_payloads: IndexMap<String, Value>,
}

/// Assembles pipeline steps using a DAG and step builders
pub struct PipelineAssembler {
    dag: PipelineDag,
    config_map: IndexMap<String, Arc<dyn StepConfig>>,
    builder_registry: Arc<BuilderRegistry>,
    session: Arc<SessionContext>,
    role: Option<String>,
    registry_manager: Arc<RegistryManager>,
    registry: Arc<SpecificationRegistry>,
    resolver: Arc<DependencyResolver>,
    builders: IndexMap<String, Box<dyn StepBuilder>>,
    spec_map: IndexMap<String, StepSpecification>,
    instances: IndexMap<String, Box<dyn StepHandle>>,
    messages: IndexMap<String, IndexMap<String, MessageMatch>>,
    state: AssemblyState,
}

impl PipelineAssembler {
    /// Create an assembler and initialize its step builders
    ///
    /// Fails immediately when a DAG node lacks a config, a config variant
    /// lacks a registered builder, an edge references a missing node, or a
    /// builder cannot be constructed.
    pub fn new(
        dag: PipelineDag,
        config_map: IndexMap<String, Arc<dyn StepConfig>>,
        builder_registry: Arc<BuilderRegistry>,
        session: Arc<SessionContext>,
        role: Option<String>,
        registry_manager: Option<Arc<RegistryManager>>,
        resolver: Option<Arc<DependencyResolver>>,
    ) -> Result<Self> {
        dag.validate().map_err(|e| match e {
            weaver_core::CoreError::NodeNotFound(node) => AssemblyError::DanglingEdge(node),
            other => AssemblyError::BuildOrder { source: other },
        })?;

        let missing: Vec<String> = dag
            .nodes()
            .filter(|node| !config_map.contains_key(*node))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(AssemblyError::MissingConfigs(missing));
        }

        for config in config_map.values() {
            builder_registry.step_type_for(config.config_type())?;
        }

        // The registry context is the pipeline the configs belong to
        let context_name = config_map
            .values()
            .find_map(|config| config.pipeline_name().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_CONTEXT.to_string());

        let registry_manager = registry_manager.unwrap_or_else(|| Arc::new(RegistryManager::new()));
        let registry = registry_manager.registry(&context_name);
        let resolver =
            resolver.unwrap_or_else(|| Arc::new(DependencyResolver::new(registry.clone())));

        tracing::info!(context = %context_name, nodes = dag.node_count(), "input validation successful");

        let mut assembler = Self {
            dag,
            config_map,
            builder_registry,
            session,
            role,
            registry_manager,
            registry,
            resolver,
            builders: IndexMap::new(),
            spec_map: IndexMap::new(),
            instances: IndexMap::new(),
            messages: IndexMap::new(),
            state: AssemblyState::Initialized,
        };
        assembler.initialize_step_builders()?;
        assembler.state = AssemblyState::BuildersReady;
        Ok(assembler)
    }

    /// Create an assembler with freshly managed dependency components
    pub fn with_components(
        dag: PipelineDag,
        config_map: IndexMap<String, Arc<dyn StepConfig>>,
        builder_registry: Arc<BuilderRegistry>,
        session: Arc<SessionContext>,
        role: Option<String>,
        context_name: Option<&str>,
    ) -> Result<Self> {
        let components = weaver_resolver::PipelineComponents::for_context(context_name);
        Self::new(
            dag,
            config_map,
            builder_registry,
            session,
            role,
            Some(components.registry_manager),
            Some(components.resolver),
        )
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    /// The match table built by the last propagation pass
    pub fn messages(&self) -> &IndexMap<String, IndexMap<String, MessageMatch>> {
        &self.messages
    }

    pub fn registry_manager(&self) -> &Arc<RegistryManager> {
        &self.registry_manager
    }

    pub fn resolver(&self) -> &Arc<DependencyResolver> {
        &self.resolver
    }

    /// Propagate messages and report required dependencies with no producer,
    /// without instantiating any step
    pub fn check_wiring(&mut self) -> Vec<String> {
        self.propagate_messages();
        self.state = AssemblyState::MessagesPropagated;
        self.unresolved_required()
    }

    /// Build and return the executable pipeline
    ///
    /// A repeated call clears the step-instance map but keeps builder
    /// instances, so regeneration reuses the wiring-relevant state.
    pub fn generate_pipeline(&mut self, pipeline_name: &str) -> Result<AssemblyOutput> {
        tracing::info!(pipeline = pipeline_name, "generating pipeline");

        if !self.instances.is_empty() {
            tracing::info!("clearing existing step instances for pipeline regeneration");
            self.instances.clear();
            self.state = AssemblyState::BuildersReady;
        }

        self.propagate_messages();
        self.state = AssemblyState::MessagesPropagated;

        let unresolved = self.unresolved_required();
        if !unresolved.is_empty() {
            return Err(AssemblyError::UnresolvedDependencies(unresolved));
        }

        let build_order = self.dag.topological_sort()?;
        tracing::debug!(order = ?build_order, "build order determined");

        for step_name in &build_order {
            let step = self.instantiate_step(step_name)?;
            self.instances.insert(step_name.clone(), step);
        }
        self.state = AssemblyState::StepsInstantiated;

        let mut steps = Vec::with_capacity(build_order.len());
        for step_name in &build_order {
            steps.push(self.instances.shift_remove(step_name).expect("instantiated above"));
        }

        let step_payloads: IndexMap<String, Value> = self
            .builders
            .iter()
            .filter_map(|(name, builder)| {
                builder.execution_payload().map(|payload| (name.clone(), payload))
            })
            .collect();

        let pipeline = ExecutablePipeline::new(pipeline_name, steps);
        self.state = AssemblyState::PipelineBuilt;
        tracing::info!(
            pipeline = pipeline_name,
            steps = pipeline.steps().len(),
            "generated pipeline"
        );

        Ok(AssemblyOutput {
            pipeline,
            step_payloads,
        })
    }

    /// Instantiate one builder per DAG node
    fn initialize_step_builders(&mut self) -> Result<()> {
        tracing::info!("initializing step builders");

        for node in self.dag.nodes() {
            let config = self.config_map.get(node).expect("validated above").clone();
            let context = BuilderContext {
                config: config.clone(),
                session: self.session.clone(),
                role: self.role.clone(),
                registry: self.registry.clone(),
                resolver: self.resolver.clone(),
            };

            let builder = self
                .builder_registry
                .create_builder(config.config_type(), context)
                .and_then(|builder| {
                    builder.validate_configuration()?;
                    Ok(builder)
                })
                .map_err(|source| AssemblyError::BuilderInit {
                    step_name: node.to_string(),
                    source,
                })?;

            if let Some(spec) = builder.specification() {
                self.spec_map.insert(node.to_string(), spec.clone());
                self.registry.register(node, spec.clone());
            }
            tracing::info!(step = node, step_type = builder.step_type(), "initialized builder");
            self.builders.insert(node.to_string(), builder);
        }

        Ok(())
    }

    /// Wire steps along DAG edges using specification matching
    ///
    /// The match table is a monotonically-improving map: edges are processed
    /// in DAG edge order and an entry is replaced only by a strictly higher
    /// score, so a dependency satisfiable by several producers keeps the
    /// single best one.
    fn propagate_messages(&mut self) {
        tracing::info!("initializing step connections using specifications");

        for (src_step, dst_step) in self.dag.edges() {
            let (Some(src_spec), Some(dst_spec)) =
                (self.spec_map.get(src_step), self.spec_map.get(dst_step))
            else {
                continue;
            };

            for dependency in dst_spec.dependencies.values() {
                let mut best: Option<(&str, f64)> = None;
                for output in src_spec.outputs.values() {
                    let score =
                        self.resolver
                            .compatibility(dependency, output, &src_spec.step_type);
                    if score > ACCEPTANCE_THRESHOLD
                        && best.map_or(true, |(_, existing)| score > existing)
                    {
                        best = Some((output.logical_name.as_str(), score));
                    }
                }

                let Some((output_name, score)) = best else {
                    continue;
                };

                let entry = self.messages.entry(dst_step.clone()).or_default();
                let should_update = entry
                    .get(&dependency.logical_name)
                    .map_or(true, |existing| score > existing.compatibility);
                if should_update {
                    tracing::info!(
                        consumer = %dst_step,
                        dependency = %dependency.logical_name,
                        producer = %src_step,
                        output = %output_name,
                        score,
                        "matched dependency"
                    );
                    entry.insert(
                        dependency.logical_name.clone(),
                        MessageMatch {
                            source_step: src_step.clone(),
                            source_output: output_name.to_string(),
                            compatibility: score,
                        },
                    );
                }
            }
        }
    }

    /// Required dependencies with no recorded match, as "step.name" pairs
    fn unresolved_required(&self) -> Vec<String> {
        let mut unresolved = Vec::new();
        for node in self.dag.nodes() {
            let Some(spec) = self.spec_map.get(node) else {
                continue;
            };
            for dependency in spec.required_dependencies() {
                let matched = self
                    .messages
                    .get(node)
                    .is_some_and(|m| m.contains_key(&dependency.logical_name));
                if !matched {
                    unresolved.push(format!("{}.{}", node, dependency.logical_name));
                }
            }
        }
        unresolved
    }

    /// Deterministic output location per declared output:
    /// `{base_location}/{step_type}/{logical_name}`
    fn generate_outputs(&self, step_name: &str) -> IndexMap<String, String> {
        let Some(spec) = self.spec_map.get(step_name) else {
            tracing::warn!(step = step_name, "step has no specification, returning empty outputs");
            return IndexMap::new();
        };

        let base_location = self
            .config_map
            .get(step_name)
            .and_then(|config| config.base_location().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_BASE_LOCATION.to_string());
        let step_type = spec.step_type.to_lowercase();

        spec.outputs
            .keys()
            .map(|logical_name| {
                let location = format!("{}/{}/{}", base_location, step_type, logical_name);
                (logical_name.clone(), location)
            })
            .collect()
    }

    /// Create one step with inputs resolved from the match table
    fn instantiate_step(&mut self, step_name: &str) -> Result<Box<dyn StepHandle>> {
        let dependencies: Vec<String> = self
            .dag
            .dependencies(step_name)
            .into_iter()
            .filter(|upstream| self.instances.contains_key(*upstream))
            .map(str::to_string)
            .collect();

        let mut inputs = IndexMap::new();
        if let Some(matches) = self.messages.get(step_name) {
            for (input_name, message) in matches {
                let Some(instance) = self.instances.get(&message.source_step) else {
                    continue;
                };

                let output_spec = self
                    .spec_map
                    .get(&message.source_step)
                    .and_then(|spec| spec.output_by_name_or_alias(&message.source_output));

                let input = match output_spec {
                    Some(output_spec) => {
                        let reference =
                            PropertyReference::new(&message.source_step, output_spec.clone());
                        match reference.resolve(instance.as_ref()) {
                            Ok(value) => StepInput::Reference {
                                source_step: message.source_step.clone(),
                                value,
                            },
                            Err(error) => {
                                // The documented soft-fail: degrade to a
                                // placeholder, never abort the build
                                let placeholder = placeholder_location(
                                    &message.source_step,
                                    &message.source_output,
                                );
                                tracing::warn!(
                                    step = step_name,
                                    input = %input_name,
                                    %error,
                                    fallback = %placeholder,
                                    "property reference failed, using placeholder location"
                                );
                                StepInput::Location(placeholder)
                            }
                        }
                    }
                    None => {
                        let placeholder =
                            placeholder_location(&message.source_step, &message.source_output);
                        tracing::warn!(
                            step = step_name,
                            input = %input_name,
                            fallback = %placeholder,
                            "no output spec for matched output, using placeholder location"
                        );
                        StepInput::Location(placeholder)
                    }
                };
                inputs.insert(input_name.clone(), input);
            }
        }

        let requirements = StepRequirements {
            inputs,
            outputs: self.generate_outputs(step_name),
            dependencies: dependencies.clone(),
            enable_caching: true,
        };

        let builder = self.builders.get_mut(step_name).expect("validated at construction");
        let mut step = builder.create_step(requirements).map_err(|source| {
            tracing::error!(step = step_name, %source, "error building step");
            AssemblyError::StepBuild {
                step_name: step_name.to_string(),
                source,
            }
        })?;

        for upstream in &dependencies {
            step.add_dependency(upstream);
        }
        tracing::info!(step = step_name, "built step");
        Ok(step)
    }
}

fn placeholder_location(source_step: &str, source_output: &str) -> String {
    format!("{}/{}/{}", PLACEHOLDER_PREFIX, source_step, source_output)
}
