//! Shortest-path metrics: diameter, average path length, closeness

use std::collections::VecDeque;

use rayon::prelude::*;

use crate::error::{AnalysisError, Result};
use crate::graph::CollaborationGraph;

/// BFS distances from `source`; unreached nodes stay at `u32::MAX`.
fn bfs_distances(graph: &CollaborationGraph, source: usize) -> Vec<u32> {
    let mut dist = vec![u32::MAX; graph.node_count];
    let mut queue = VecDeque::new();

    dist[source] = 0;
    queue.push_back(source);

    while let Some(node) = queue.pop_front() {
        let next = dist[node] + 1;
        for &target in graph.neighbors(node) {
            let target = target as usize;
            if dist[target] == u32::MAX {
                dist[target] = next;
                queue.push_back(target);
            }
        }
    }

    dist
}

/// Maximum shortest-path distance over all node pairs.
///
/// Only defined on a connected graph; a disconnected graph is an error, not
/// a substituted value. A single-node graph has diameter 0.
pub fn diameter(graph: &CollaborationGraph) -> Result<usize> {
    let n = graph.node_count;
    if n == 0 {
        return Err(AnalysisError::EmptyGraph);
    }
    if n == 1 {
        return Ok(0);
    }

    let eccentricities: Result<Vec<u32>> = (0..n)
        .into_par_iter()
        .map(|source| {
            let dist = bfs_distances(graph, source);
            let mut ecc = 0u32;
            for &d in &dist {
                if d == u32::MAX {
                    return Err(AnalysisError::Disconnected { metric: "diameter" });
                }
                ecc = ecc.max(d);
            }
            Ok(ecc)
        })
        .collect();

    Ok(eccentricities?.into_iter().max().unwrap_or(0) as usize)
}

/// Mean shortest-path distance over all ordered node pairs.
///
/// Shares the connectivity precondition with [`diameter`]. A single-node
/// graph has average path length 0.
pub fn average_path_length(graph: &CollaborationGraph) -> Result<f64> {
    let n = graph.node_count;
    if n == 0 {
        return Err(AnalysisError::EmptyGraph);
    }
    if n == 1 {
        return Ok(0.0);
    }

    let per_source: Result<Vec<u64>> = (0..n)
        .into_par_iter()
        .map(|source| {
            let dist = bfs_distances(graph, source);
            let mut total = 0u64;
            for &d in &dist {
                if d == u32::MAX {
                    return Err(AnalysisError::Disconnected {
                        metric: "average_path_length",
                    });
                }
                total += d as u64;
            }
            Ok(total)
        })
        .collect();

    let total: u64 = per_source?.into_iter().sum();
    Ok(total as f64 / (n as f64 * (n - 1) as f64))
}

/// Closeness centrality per node, in node-index order.
///
/// Uses the reachable-fraction scaling ((r-1)/(n-1)) * ((r-1)/Σd), so the
/// metric stays defined on disconnected graphs; isolated nodes score 0.
pub fn closeness_centrality(graph: &CollaborationGraph) -> Vec<f64> {
    let n = graph.node_count;
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![0.0];
    }

    (0..n)
        .into_par_iter()
        .map(|source| {
            let dist = bfs_distances(graph, source);
            let mut reachable = 0u64;
            let mut total = 0u64;
            for &d in &dist {
                if d != u32::MAX {
                    reachable += 1;
                    total += d as u64;
                }
            }

            if total == 0 {
                return 0.0;
            }

            let others = (reachable - 1) as f64;
            (others / total as f64) * (others / (n - 1) as f64)
        })
        .collect()
}
