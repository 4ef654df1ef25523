//! Dependency resolution
//!
//! For each consumer dependency, scores every output of every candidate
//! producer and keeps the best match above the acceptance threshold. Results
//! are memoized per (consumer step type, dependency, producer set); the memo
//! is tied to the registry generation and dropped entirely whenever the
//! registry changes.

use crate::matcher::SemanticMatcher;
use crate::registry::SpecificationRegistry;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use weaver_core::{DependencySpec, OutputSpec, StepSpecification};

/// Matches at or below this score are not considered connections
pub const ACCEPTANCE_THRESHOLD: f64 = 0.5;

/// A scored producer-output match for one dependency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMatch {
    /// Step name of the producing node
    pub producer_step: String,
    /// Canonical logical name of the matched output
    pub output_name: String,
    /// Compatibility score that won the selection
    pub score: f64,
}

/// Outcome of resolving one consumer's declared dependencies
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Best match per dependency logical name
    pub matches: IndexMap<String, ResolvedMatch>,
    /// Required dependencies with no surviving candidate
    pub unresolved_required: Vec<String>,
    /// Optional dependencies that resolved to absent
    pub unresolved_optional: Vec<String>,
}

impl Resolution {
    /// True when every required dependency found a producer
    pub fn is_complete(&self) -> bool {
        self.unresolved_required.is_empty()
    }
}

type CacheKey = (String, String, Vec<String>);

#[derive(Debug, Default)]
struct ResolverCache {
    generation: u64,
    entries: HashMap<CacheKey, Option<ResolvedMatch>>,
}

/// Finds the best-compatible producer output for each consumer dependency
#[derive(Debug)]
pub struct DependencyResolver {
    registry: Arc<SpecificationRegistry>,
    matcher: SemanticMatcher,
    cache: RwLock<ResolverCache>,
}

impl DependencyResolver {
    pub fn new(registry: Arc<SpecificationRegistry>) -> Self {
        Self {
            registry,
            matcher: SemanticMatcher::new(),
            cache: RwLock::new(ResolverCache::default()),
        }
    }

    pub fn registry(&self) -> &Arc<SpecificationRegistry> {
        &self.registry
    }

    /// Score one (dependency, output) pair against a producer step type
    pub fn compatibility(
        &self,
        dependency: &DependencySpec,
        output: &OutputSpec,
        producer_step_type: &str,
    ) -> f64 {
        self.matcher.score(dependency, output, producer_step_type)
    }

    /// Find the best-compatible producer output for one dependency
    ///
    /// Candidates are scanned in declaration order; only scores strictly
    /// above [`ACCEPTANCE_THRESHOLD`] survive, and ties keep the first-seen
    /// producer.
    pub fn resolve_dependency(
        &self,
        consumer_step: &str,
        consumer_step_type: &str,
        dependency: &DependencySpec,
        candidates: &[(String, StepSpecification)],
    ) -> Option<ResolvedMatch> {
        let key = cache_key(consumer_step_type, dependency, candidates);
        if let Some(cached) = self.cache_lookup(&key) {
            return cached;
        }

        let mut best: Option<ResolvedMatch> = None;
        for (producer_step, producer_spec) in candidates {
            for output in producer_spec.outputs.values() {
                let score = self
                    .matcher
                    .score(dependency, output, &producer_spec.step_type);
                if score <= ACCEPTANCE_THRESHOLD {
                    continue;
                }
                let better = best.as_ref().map_or(true, |b| score > b.score);
                if better {
                    best = Some(ResolvedMatch {
                        producer_step: producer_step.clone(),
                        output_name: output.logical_name.clone(),
                        score,
                    });
                }
            }
        }

        match &best {
            Some(m) => tracing::debug!(
                consumer = consumer_step,
                dependency = %dependency.logical_name,
                producer = %m.producer_step,
                output = %m.output_name,
                score = m.score,
                "resolved dependency"
            ),
            None => tracing::debug!(
                consumer = consumer_step,
                dependency = %dependency.logical_name,
                "no candidate above threshold"
            ),
        }

        self.cache_store(key, best.clone());
        best
    }

    /// Resolve every declared dependency of a consumer
    ///
    /// Unresolved names are collected into the returned [`Resolution`], not
    /// raised: a missing required dependency fails the node, a missing
    /// optional one resolves to absent.
    pub fn resolve_all(
        &self,
        consumer_step: &str,
        consumer_spec: &StepSpecification,
        candidates: &[(String, StepSpecification)],
    ) -> Resolution {
        let mut resolution = Resolution::default();

        for dependency in consumer_spec.dependencies.values() {
            match self.resolve_dependency(
                consumer_step,
                &consumer_spec.step_type,
                dependency,
                candidates,
            ) {
                Some(found) => {
                    resolution
                        .matches
                        .insert(dependency.logical_name.clone(), found);
                }
                None if dependency.required => {
                    resolution
                        .unresolved_required
                        .push(dependency.logical_name.clone());
                }
                None => {
                    resolution
                        .unresolved_optional
                        .push(dependency.logical_name.clone());
                }
            }
        }

        if !resolution.unresolved_required.is_empty() {
            tracing::warn!(
                consumer = consumer_step,
                unresolved = ?resolution.unresolved_required,
                "required dependencies left unresolved"
            );
        }

        resolution
    }

    fn cache_lookup(&self, key: &CacheKey) -> Option<Option<ResolvedMatch>> {
        let cache = self.cache.read().expect("resolver cache lock");
        if cache.generation != self.registry.generation() {
            return None;
        }
        cache.entries.get(key).cloned()
    }

    fn cache_store(&self, key: CacheKey, value: Option<ResolvedMatch>) {
        let mut cache = self.cache.write().expect("resolver cache lock");
        let generation = self.registry.generation();
        if cache.generation != generation {
            // Registry moved since the last store: the whole memo is stale
            cache.entries.clear();
            cache.generation = generation;
        }
        cache.entries.insert(key, value);
    }
}

fn cache_key(
    consumer_step_type: &str,
    dependency: &DependencySpec,
    candidates: &[(String, StepSpecification)],
) -> CacheKey {
    let mut producer_types: Vec<String> = candidates
        .iter()
        .map(|(_, spec)| spec.step_type.clone())
        .collect();
    producer_types.sort();
    producer_types.dedup();
    (
        consumer_step_type.to_string(),
        dependency.logical_name.clone(),
        producer_types,
    )
}
