//! Co-occurrence graph model and builder.
//!
//! Nodes are normalized ingredient names; an undirected edge between two
//! ingredients carries the number of times they were paired inside a recipe.
//! The graph is built once with [`CooccurrenceGraph::build`] and never mutated
//! afterwards, so it can be shared by reference across threads and passed to
//! the queries in `crate::query`.
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::parser::Recipe;

type Neighbors = BTreeMap<String, u64>;

#[derive(Debug, Clone, Default)]
pub struct CooccurrenceGraph {
    // Symmetric adjacency: adjacency[a][b] == adjacency[b][a]. Sorted maps give
    // every traversal a stable, name-ascending order.
    adjacency: BTreeMap<String, Neighbors>,
    edge_count: usize,
}

/// Size figures for a built graph.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GraphSummary {
    pub recipes: usize,
    pub nodes: usize,
    pub edges: usize,
    pub isolated_nodes: usize,
    pub total_weight: u64,
}

impl CooccurrenceGraph {
    /// Build the graph from a recipe list.
    ///
    /// Every normalized ingredient becomes a node, including ingredients that
    /// never pair with anything. Pairs are enumerated over list positions, so an
    /// ingredient listed twice in one recipe pairs twice with each other
    /// ingredient of that recipe; the two copies never pair with each other.
    #[must_use]
    pub fn build(recipes: &[Recipe]) -> Self {
        let normalized: Vec<Vec<String>> =
            recipes.par_iter().map(Recipe::normalized_ingredients).collect();

        let mut graph = Self::default();
        for names in &normalized {
            for name in names {
                if !graph.adjacency.contains_key(name) {
                    graph.adjacency.insert(name.clone(), Neighbors::new());
                }
            }
            for (i, a) in names.iter().enumerate() {
                for b in &names[i + 1..] {
                    if a != b {
                        graph.add_cooccurrence(a, b);
                    }
                }
            }
        }
        tracing::debug!(
            recipes = recipes.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built co-occurrence graph"
        );
        graph
    }

    fn add_cooccurrence(&mut self, a: &str, b: &str) {
        let forward = self.adjacency.entry(a.to_string()).or_default();
        let w = forward.entry(b.to_string()).or_insert(0);
        if *w == 0 {
            self.edge_count += 1;
        }
        *w += 1;
        *self.adjacency.entry(b.to_string()).or_default().entry(a.to_string()).or_insert(0) += 1;
    }

    /// Whether `name` (already normalized) is a node.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.adjacency.contains_key(name)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// All node names in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.adjacency.keys().map(String::as_str)
    }

    /// Edge weight between two normalized names, `None` when no edge exists.
    #[must_use]
    pub fn weight(&self, a: &str, b: &str) -> Option<u64> {
        self.adjacency.get(a).and_then(|n| n.get(b)).copied()
    }

    /// Neighbours of `name` with edge weights, in ascending name order.
    /// Empty for unknown or isolated nodes.
    pub fn neighbors<'a>(&'a self, name: &str) -> impl Iterator<Item = (&'a str, u64)> + 'a {
        self.adjacency
            .get(name)
            .into_iter()
            .flat_map(|n| n.iter().map(|(k, &w)| (k.as_str(), w)))
    }

    #[must_use]
    pub fn degree(&self, name: &str) -> usize {
        self.adjacency.get(name).map_or(0, BTreeMap::len)
    }

    /// Summarize the graph; `recipes` is the corpus size it was built from.
    #[must_use]
    pub fn summary(&self, recipes: usize) -> GraphSummary {
        let isolated_nodes = self.adjacency.values().filter(|n| n.is_empty()).count();
        // Each edge is stored twice.
        let total_weight = self.adjacency.values().flat_map(BTreeMap::values).sum::<u64>() / 2;
        GraphSummary {
            recipes,
            nodes: self.node_count(),
            edges: self.edge_count,
            isolated_nodes,
            total_weight,
        }
    }
}
