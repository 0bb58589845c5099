//! Whole-graph summary statistics

use itertools::Itertools;
use rayon::prelude::*;
use statrs::statistics::Statistics;

use crate::graph::CollaborationGraph;

/// Mean degree over all nodes (2m / n); 0.0 for an empty graph.
pub fn average_degree(graph: &CollaborationGraph) -> f64 {
    if graph.node_count == 0 {
        return 0.0;
    }

    (0..graph.node_count)
        .map(|node| graph.degree(node) as f64)
        .mean()
}

/// Average clustering coefficient.
///
/// Mean over all nodes of the local coefficient (fraction of a node's
/// neighbor pairs that are themselves connected); nodes with degree < 2
/// contribute 0. Defined on disconnected graphs.
pub fn clustering_coefficient(graph: &CollaborationGraph) -> f64 {
    let n = graph.node_count;
    if n == 0 {
        return 0.0;
    }

    let total: f64 = (0..n)
        .into_par_iter()
        .map(|node| local_clustering(graph, node))
        .sum();

    total / n as f64
}

fn local_clustering(graph: &CollaborationGraph, node: usize) -> f64 {
    let neighbors = graph.neighbors(node);
    let k = neighbors.len();
    if k < 2 {
        return 0.0;
    }

    let mut links = 0usize;
    for (&a, &b) in neighbors.iter().tuple_combinations() {
        if graph.has_edge(a as usize, b as usize) {
            links += 1;
        }
    }

    (2 * links) as f64 / (k * (k - 1)) as f64
}
