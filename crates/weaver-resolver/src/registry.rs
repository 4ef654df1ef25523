//! Specification registries
//!
//! A [`SpecificationRegistry`] maps step names to their declared
//! specifications for one named context. Contexts are fully isolated: a
//! registry for context "A" never sees specifications registered under "B".
//! Every write bumps a generation counter; resolver caches key off that
//! counter and discard themselves wholesale when it moves, coarse but
//! correct.

use crate::resolver::DependencyResolver;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use weaver_core::StepSpecification;

/// Default context used when no pipeline name is available
pub const DEFAULT_CONTEXT: &str = "default";

/// Per-context store of step specifications
#[derive(Debug)]
pub struct SpecificationRegistry {
    context_name: String,
    specs: RwLock<IndexMap<String, StepSpecification>>,
    generation: AtomicU64,
}

impl SpecificationRegistry {
    /// Create an empty registry for a named context
    pub fn new(context_name: impl Into<String>) -> Self {
        Self {
            context_name: context_name.into(),
            specs: RwLock::new(IndexMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn context_name(&self) -> &str {
        &self.context_name
    }

    /// Register (or replace) the specification for a step name
    pub fn register(&self, step_name: impl Into<String>, spec: StepSpecification) {
        let step_name = step_name.into();
        tracing::debug!(
            context = %self.context_name,
            step = %step_name,
            step_type = %spec.step_type,
            "registering specification"
        );
        self.specs.write().expect("registry lock").insert(step_name, spec);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Remove a registered specification; returns true if one was present
    pub fn unregister(&self, step_name: &str) -> bool {
        let removed = self
            .specs
            .write()
            .expect("registry lock")
            .shift_remove(step_name)
            .is_some();
        if removed {
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        removed
    }

    /// Clone out the specification registered under a step name
    pub fn specification(&self, step_name: &str) -> Option<StepSpecification> {
        self.specs.read().expect("registry lock").get(step_name).cloned()
    }

    /// Registered step names in registration order
    pub fn step_names(&self) -> Vec<String> {
        self.specs.read().expect("registry lock").keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.specs.read().expect("registry lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Monotonic write counter; moves on every register/unregister
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Factory and directory for named registry contexts
#[derive(Debug, Default)]
pub struct RegistryManager {
    contexts: RwLock<IndexMap<String, Arc<SpecificationRegistry>>>,
}

impl RegistryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the registry for a context, creating it on first use
    pub fn registry(&self, context_name: &str) -> Arc<SpecificationRegistry> {
        let mut contexts = self.contexts.write().expect("manager lock");
        contexts
            .entry(context_name.to_string())
            .or_insert_with(|| Arc::new(SpecificationRegistry::new(context_name)))
            .clone()
    }

    /// Names of all known contexts
    pub fn list_contexts(&self) -> Vec<String> {
        self.contexts.read().expect("manager lock").keys().cloned().collect()
    }

    /// Drop a context; returns true if it existed
    pub fn clear_context(&self, context_name: &str) -> bool {
        self.contexts
            .write()
            .expect("manager lock")
            .shift_remove(context_name)
            .is_some()
    }

    /// Registered-spec counts per context
    pub fn context_stats(&self) -> IndexMap<String, usize> {
        self.contexts
            .read()
            .expect("manager lock")
            .iter()
            .map(|(name, registry)| (name.clone(), registry.len()))
            .collect()
    }
}

/// Bundled dependency components for one pipeline context
///
/// The assembler and tests want a manager, its registry and a resolver that
/// all agree on the context; this factory keeps that wiring in one place.
pub struct PipelineComponents {
    pub registry_manager: Arc<RegistryManager>,
    pub registry: Arc<SpecificationRegistry>,
    pub resolver: Arc<DependencyResolver>,
}

impl PipelineComponents {
    /// Create components for the given context (or the default one)
    pub fn for_context(context_name: Option<&str>) -> Self {
        let registry_manager = Arc::new(RegistryManager::new());
        let registry = registry_manager.registry(context_name.unwrap_or(DEFAULT_CONTEXT));
        let resolver = Arc::new(DependencyResolver::new(registry.clone()));
        Self {
            registry_manager,
            registry,
            resolver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weaver_core::{NodeType, OutputSpec, PropertyPath, DependencyType, StepSpecification};

    fn make_source_spec(step_type: &str) -> StepSpecification {
        StepSpecification::new(
            step_type,
            NodeType::Source,
            vec![],
            vec![OutputSpec::new(
                "data",
                DependencyType::ProcessingOutput,
                PropertyPath::parse("properties.S3Uri").unwrap(),
            )],
        )
        .unwrap()
    }

    #[test]
    fn test_register_and_fetch() {
        let registry = SpecificationRegistry::new("test");
        registry.register("load", make_source_spec("DataLoad"));

        let spec = registry.specification("load").unwrap();
        assert_eq!(spec.step_type, "DataLoad");
        assert!(registry.specification("missing").is_none());
    }

    #[test]
    fn test_generation_bumps_on_writes() {
        let registry = SpecificationRegistry::new("test");
        let start = registry.generation();

        registry.register("load", make_source_spec("DataLoad"));
        assert!(registry.generation() > start);

        let after_register = registry.generation();
        assert!(registry.unregister("load"));
        assert!(registry.generation() > after_register);

        // Removing a missing entry is not a write
        let after_unregister = registry.generation();
        assert!(!registry.unregister("load"));
        assert_eq!(registry.generation(), after_unregister);
    }

    #[test]
    fn test_contexts_are_isolated() {
        let manager = RegistryManager::new();
        let a = manager.registry("pipeline_a");
        let b = manager.registry("pipeline_b");

        a.register("load", make_source_spec("DataLoad"));

        assert!(a.specification("load").is_some());
        assert!(b.specification("load").is_none());
    }

    #[test]
    fn test_registry_is_shared_per_context() {
        let manager = RegistryManager::new();
        manager.registry("ctx").register("load", make_source_spec("DataLoad"));
        assert_eq!(manager.registry("ctx").len(), 1);
    }

    #[test]
    fn test_context_stats_and_clear() {
        let manager = RegistryManager::new();
        manager.registry("a").register("load", make_source_spec("DataLoad"));
        manager.registry("b");

        let stats = manager.context_stats();
        assert_eq!(stats.get("a"), Some(&1));
        assert_eq!(stats.get("b"), Some(&0));

        assert!(manager.clear_context("a"));
        assert!(!manager.clear_context("a"));
        assert_eq!(manager.list_contexts(), vec!["b"]);
    }

    #[test]
    fn test_components_factory() {
        let components = PipelineComponents::for_context(Some("fraud"));
        assert_eq!(components.registry.context_name(), "fraud");
        assert_eq!(components.registry_manager.list_contexts(), vec!["fraud"]);
    }
}
