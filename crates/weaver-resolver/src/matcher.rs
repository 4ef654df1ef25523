//! Semantic compatibility scoring
//!
//! Scores how well a candidate output satisfies a dependency request as a
//! weighted sum of independent sub-scores, each in [0,1]. The weights are
//! fixed so that type and source mismatches dominate: a source-gated or
//! type-unrelated pair scores 0 no matter how similar the names are, and no
//! single sub-score can lift an incompatible pair past the acceptance
//! threshold on its own.

use std::collections::HashSet;
use weaver_core::{DependencySpec, DependencyType, OutputSpec};

/// Weight of dependency/output type compatibility
pub const TYPE_COMPATIBILITY_WEIGHT: f64 = 0.40;
/// Weight of logical-name similarity
pub const NAME_SIMILARITY_WEIGHT: f64 = 0.25;
/// Weight of data-type equality
pub const DATA_TYPE_WEIGHT: f64 = 0.20;
/// Weight of semantic-keyword overlap
pub const KEYWORD_WEIGHT: f64 = 0.10;
/// Weight of explicit source compatibility
pub const SOURCE_WEIGHT: f64 = 0.05;

/// Scores name/type/source similarity between a dependency and an output
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticMatcher;

impl SemanticMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Compatibility score in [0,1] for `output` of a `producer_step_type`
    /// step satisfying `dependency`
    pub fn score(
        &self,
        dependency: &DependencySpec,
        output: &OutputSpec,
        producer_step_type: &str,
    ) -> f64 {
        // Hard gate: an explicit source list excludes this producer
        if !dependency.compatible_sources.is_empty()
            && !dependency
                .compatible_sources
                .iter()
                .any(|s| s == producer_step_type)
        {
            return 0.0;
        }

        // Hard gate: the types share no compatibility relation
        let type_score =
            match type_compatibility(dependency.dependency_type, output.output_type) {
                Some(score) => score,
                None => return 0.0,
            };

        let name_score = name_similarity(&dependency.logical_name, output);
        let data_type_score = if dependency.data_type == output.data_type {
            1.0
        } else {
            0.0
        };
        let keyword_score = keyword_overlap(&dependency.semantic_keywords, output);

        TYPE_COMPATIBILITY_WEIGHT * type_score
            + NAME_SIMILARITY_WEIGHT * name_score
            + DATA_TYPE_WEIGHT * data_type_score
            + KEYWORD_WEIGHT * keyword_score
            + SOURCE_WEIGHT
    }
}

/// Type pairs accepted with a partial score when not identical
fn type_compatibility(dependency: DependencyType, output: DependencyType) -> Option<f64> {
    use DependencyType::*;

    if dependency == output {
        return Some(1.0);
    }
    let partial = matches!(
        (dependency, output),
        (TrainingOutput, ProcessingOutput)
            | (ProcessingOutput, TrainingOutput)
            | (ModelArtifacts, TrainingOutput)
            | (Hyperparameters, ProcessingOutput)
            | (CustomProperty, ProcessingOutput)
    );
    partial.then_some(0.5)
}

/// Similarity of the dependency's logical name against the output's logical
/// name and aliases, taking the best candidate
fn name_similarity(dependency_name: &str, output: &OutputSpec) -> f64 {
    std::iter::once(output.logical_name.as_str())
        .chain(output.aliases.iter().map(String::as_str))
        .map(|candidate| single_name_similarity(dependency_name, candidate))
        .fold(0.0, f64::max)
}

fn single_name_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if normalize(a) == normalize(b) {
        return 0.9;
    }

    let tokens_a = tokens(a);
    let tokens_b = tokens(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    0.8 * intersection as f64 / union as f64
}

/// Fraction of the dependency's keywords found in the output's name, aliases
/// or description
fn keyword_overlap(keywords: &[String], output: &OutputSpec) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }

    let mut haystack = output.logical_name.to_lowercase();
    for alias in &output.aliases {
        haystack.push(' ');
        haystack.push_str(&alias.to_lowercase());
    }
    haystack.push(' ');
    haystack.push_str(&output.description.to_lowercase());

    let found = keywords
        .iter()
        .filter(|kw| haystack.contains(&kw.to_lowercase()))
        .count();
    found as f64 / keywords.len() as f64
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn tokens(name: &str) -> HashSet<String> {
    name.to_lowercase()
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
