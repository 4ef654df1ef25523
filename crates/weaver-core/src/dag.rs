//! Pipeline DAG
//!
//! The graph of named step placeholders the compiler resolves against.
//! Nodes are plain strings; edges are directed (producer, consumer) pairs.
//! Iteration order is insertion order everywhere so that resolution and
//! message propagation stay deterministic.

use crate::error::{CoreError, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A directed acyclic graph of named pipeline steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDag {
    nodes: IndexSet<String>,
    edges: Vec<(String, String)>,
}

impl PipelineDag {
    /// Create an empty DAG
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a DAG from node and edge lists
    pub fn from_nodes_and_edges<N, S>(nodes: N, edges: Vec<(String, String)>) -> Result<Self>
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dag = Self::new();
        for node in nodes {
            dag.add_node(node);
        }
        for (src, dst) in edges {
            dag.add_edge(src, dst)?;
        }
        Ok(dag)
    }

    /// Add a node; returns false if it was already present
    pub fn add_node(&mut self, name: impl Into<String>) -> bool {
        self.nodes.insert(name.into())
    }

    /// Add a directed edge; both endpoints must already exist
    pub fn add_edge(&mut self, src: impl Into<String>, dst: impl Into<String>) -> Result<()> {
        let (src, dst) = (src.into(), dst.into());
        if !self.nodes.contains(&src) {
            return Err(CoreError::NodeNotFound(src));
        }
        if !self.nodes.contains(&dst) {
            return Err(CoreError::NodeNotFound(dst));
        }
        self.edges.push((src, dst));
        Ok(())
    }

    /// Node names in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Directed edges in insertion order
    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.nodes.contains(name)
    }

    /// Direct predecessors of `node` (the steps it depends on)
    pub fn dependencies(&self, node: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, dst)| dst == node)
            .map(|(src, _)| src.as_str())
            .collect()
    }

    /// Direct successors of `node` (the steps depending on it)
    pub fn dependents(&self, node: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(src, _)| src == node)
            .map(|(_, dst)| dst.as_str())
            .collect()
    }

    /// Check that every edge references an existing node
    ///
    /// Useful for graphs built through deserialization, which bypasses
    /// `add_edge`.
    pub fn validate(&self) -> Result<()> {
        for (src, dst) in &self.edges {
            if !self.nodes.contains(src) {
                return Err(CoreError::NodeNotFound(src.clone()));
            }
            if !self.nodes.contains(dst) {
                return Err(CoreError::NodeNotFound(dst.clone()));
            }
        }
        Ok(())
    }

    /// Order nodes so every edge's source precedes its destination
    ///
    /// Kahn's algorithm over insertion order, so the result is deterministic.
    /// Fails with the still-unordered nodes when the graph contains a cycle.
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        self.validate()?;

        let mut in_degree: Vec<usize> = vec![0; self.nodes.len()];
        for (_, dst) in &self.edges {
            let idx = self.nodes.get_index_of(dst.as_str()).expect("validated");
            in_degree[idx] += 1;
        }

        let mut queue: VecDeque<usize> = (0..self.nodes.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut sorted = Vec::with_capacity(self.nodes.len());

        while let Some(idx) = queue.pop_front() {
            let node = &self.nodes[idx];
            sorted.push(node.clone());

            for (src, dst) in &self.edges {
                if src == node {
                    let dst_idx = self.nodes.get_index_of(dst.as_str()).expect("validated");
                    in_degree[dst_idx] -= 1;
                    if in_degree[dst_idx] == 0 {
                        queue.push_back(dst_idx);
                    }
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            let remaining = self
                .nodes
                .iter()
                .filter(|n| !sorted.contains(*n))
                .cloned()
                .collect();
            return Err(CoreError::CycleDetected(remaining));
        }

        Ok(sorted)
    }
}
