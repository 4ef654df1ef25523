//! Node-to-config resolution
//!
//! Matches DAG node names to configuration instances by combining several
//! signals: direct name equality, fuzzy token overlap, job-type alignment
//! encoded in the node name, and config-variant-to-step-type consistency.
//! Every candidate carries a confidence so callers can preview the mapping
//! before committing to a build.

use crate::error::{ConfigResolutionError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use weaver_core::{StepConfig, StepTypeMap};

/// Candidates below this confidence are not proposed at all
pub const MIN_CONFIG_CONFIDENCE: f64 = 0.5;

/// Top-two candidates closer than this margin flag an ambiguous node
pub const AMBIGUITY_MARGIN: f64 = 0.1;

/// Signal that produced a candidate's confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Node name equals the config's logical name
    DirectName,
    /// Token overlap between node name and config name
    FuzzyName,
    /// Node name encodes the config's job type
    JobType,
    /// Node tokens match the config's mapped step type
    StepTypeRegistry,
}

/// A confidence-scored (node, config) pairing
#[derive(Debug, Clone, Serialize)]
pub struct ConfigCandidate {
    /// Logical config name in the catalog
    pub config_name: String,
    /// Config variant tag
    pub config_type: String,
    /// Confidence in [0,1]
    pub confidence: f64,
    /// Which signal produced this confidence
    pub method: MatchMethod,
}

/// Matches DAG node names to configuration instances
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    step_types: Option<StepTypeMap>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the step-type consistency signal
    pub fn with_step_types(step_types: StepTypeMap) -> Self {
        Self {
            step_types: Some(step_types),
        }
    }

    /// Ranked candidates per node, best first
    ///
    /// Nodes with no candidate above [`MIN_CONFIG_CONFIDENCE`] map to an
    /// empty list, surfaced rather than dropped.
    pub fn preview_resolution(
        &self,
        dag_nodes: &[String],
        configs: &IndexMap<String, Arc<dyn StepConfig>>,
    ) -> IndexMap<String, Vec<ConfigCandidate>> {
        dag_nodes
            .iter()
            .map(|node| (node.clone(), self.candidates_for(node, configs)))
            .collect()
    }

    /// Resolve every node to its best candidate's config
    ///
    /// Ambiguity is logged and resolved by taking the top-ranked candidate;
    /// nodes with no candidate fail the resolution as a batch.
    pub fn resolve_config_map(
        &self,
        dag_nodes: &[String],
        configs: &IndexMap<String, Arc<dyn StepConfig>>,
    ) -> Result<IndexMap<String, Arc<dyn StepConfig>>> {
        let mut resolved = IndexMap::with_capacity(dag_nodes.len());
        let mut unresolved = Vec::new();

        for node in dag_nodes {
            let candidates = self.candidates_for(node, configs);
            match candidates.first() {
                Some(best) => {
                    if let Some(runner_up) = candidates.get(1) {
                        if (best.confidence - runner_up.confidence).abs() < AMBIGUITY_MARGIN {
                            tracing::warn!(
                                node = %node,
                                best = %best.config_name,
                                runner_up = %runner_up.config_name,
                                "ambiguous config resolution, taking top candidate"
                            );
                        }
                    }
                    let config = configs.get(&best.config_name).expect("candidate from catalog");
                    tracing::info!(
                        node = %node,
                        config = %best.config_name,
                        confidence = best.confidence,
                        "resolved node to config"
                    );
                    resolved.insert(node.clone(), config.clone());
                }
                None => unresolved.push(node.clone()),
            }
        }

        if !unresolved.is_empty() {
            return Err(ConfigResolutionError::UnresolvedNodes(unresolved));
        }
        Ok(resolved)
    }

    /// Score every catalog entry against one node name
    fn candidates_for(
        &self,
        node: &str,
        configs: &IndexMap<String, Arc<dyn StepConfig>>,
    ) -> Vec<ConfigCandidate> {
        let mut candidates = Vec::new();

        for (config_name, config) in configs {
            // Direct name equality wins outright
            if config_name == node {
                candidates.push(ConfigCandidate {
                    config_name: config_name.clone(),
                    config_type: config.config_type().to_string(),
                    confidence: 1.0,
                    method: MatchMethod::DirectName,
                });
                continue;
            }

            let mut best: Option<(f64, MatchMethod)> = None;
            let mut consider = |confidence: f64, method: MatchMethod| {
                if confidence > best.map_or(0.0, |(c, _)| c) {
                    best = Some((confidence, method));
                }
            };

            let name_overlap = token_overlap(node, config_name);
            consider(0.8 * name_overlap, MatchMethod::FuzzyName);

            if let (Some(node_job), Some(config_job)) =
                (job_type_from_node(node), config.job_type())
            {
                if node_job == config_job {
                    let bonus = if name_overlap > 0.0 { 0.1 } else { 0.0 };
                    consider(0.7 + bonus, MatchMethod::JobType);
                }
            }

            if let Some(step_types) = &self.step_types {
                if let Ok(step_type) = step_types.step_type_for(config.config_type()) {
                    if step_type_matches_node(node, step_type) {
                        consider(0.6, MatchMethod::StepTypeRegistry);
                    }
                }
            }

            if let Some((confidence, method)) = best {
                if confidence >= MIN_CONFIG_CONFIDENCE {
                    candidates.push(ConfigCandidate {
                        config_name: config_name.clone(),
                        config_type: config.config_type().to_string(),
                        confidence,
                        method,
                    });
                }
            }
        }

        // Descending confidence, stable over catalog order
        candidates.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).expect("finite"));
        candidates
    }
}

/// Job type encoded in a node name, if any (first matching token wins)
fn job_type_from_node(node: &str) -> Option<&'static str> {
    let lowered = node.to_lowercase();
    for token in lowered.split(|c: char| c == '_' || c == '-' || c.is_whitespace()) {
        match token {
            "train" | "training" => return Some("training"),
            "calib" | "calibration" => return Some("calibration"),
            "eval" | "evaluation" => return Some("evaluation"),
            "test" | "testing" => return Some("testing"),
            _ => {}
        }
    }
    None
}

/// Whether the step type's camel-case words appear among the node's tokens
fn step_type_matches_node(node: &str, step_type: &str) -> bool {
    let node_tokens = tokens(node);
    let type_words = split_camel_case(step_type);
    !type_words.is_empty() && type_words.iter().all(|w| node_tokens.contains(w))
}

fn token_overlap(a: &str, b: &str) -> f64 {
    let tokens_a = tokens(a);
    let tokens_b = tokens(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    intersection as f64 / union as f64
}

fn tokens(name: &str) -> HashSet<String> {
    name.to_lowercase()
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_camel_case(name: &str) -> HashSet<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in name.chars() {
        if c.is_uppercase() && !current.is_empty() {
            words.push(current.to_lowercase());
            current = String::new();
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current.to_lowercase());
    }
    words.into_iter().collect()
}
