//! Modularity-maximizing community detection (Louvain).
//!
//! Multi-level greedy optimization: repeatedly move nodes to the neighboring
//! community with the highest modularity gain, then collapse communities
//! into a weighted meta-graph and repeat until modularity stops improving.
//!
//! The node visit order is shuffled from a caller-supplied seed and every
//! interior map is ordered, so a fixed seed reproduces the exact same label
//! assignment run after run.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{AnalysisError, Result};
use crate::graph::CollaborationGraph;

/// Louvain community detection over a [`CollaborationGraph`].
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Resolution parameter (gamma).
    resolution: f64,
    /// Maximum iterations per level.
    max_iter: usize,
    /// Maximum levels of aggregation.
    max_levels: usize,
    /// Minimum modularity improvement to continue.
    min_modularity_gain: f64,
    /// Seed for the node visit order.
    seed: u64,
}

impl Louvain {
    /// Create a new Louvain detector with default settings.
    pub fn new() -> Self {
        Self {
            resolution: 1.0,
            max_iter: 100,
            max_levels: 10,
            min_modularity_gain: 1e-7,
            seed: 42,
        }
    }

    /// Set resolution parameter.
    ///
    /// Higher values produce smaller communities.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set maximum iterations per level.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set maximum aggregation levels.
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels;
        self
    }

    /// Set the seed controlling the node visit order.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Detect communities; returns one label per node index.
    pub fn detect(&self, graph: &CollaborationGraph) -> Result<Vec<usize>> {
        let n = graph.node_count;
        if n == 0 {
            return Err(AnalysisError::EmptyGraph);
        }

        if graph.edge_count() == 0 {
            // No edges: each node is its own community.
            return Ok((0..n).collect());
        }

        // Unit-weight edge list, one entry per undirected edge.
        let mut edges: Vec<(usize, usize, f64)> = Vec::with_capacity(graph.edge_count());
        for node in 0..n {
            for &target in graph.neighbors(node) {
                if (node as u32) < target {
                    edges.push((node, target as usize, 1.0));
                }
            }
        }
        let self_loops = vec![0.0; n];

        let mut rng = StdRng::seed_from_u64(self.seed);

        // Multi-level optimization
        let mut current_n = n;
        let mut current_edges = edges;
        let mut current_self_loops = self_loops;

        // Stack of node mappings for expanding the final partition
        let mut mapping_stack: Vec<Vec<Vec<usize>>> = Vec::new();

        let mut prev_modularity = f64::NEG_INFINITY;

        for _level in 0..self.max_levels {
            // Phase 1: Local moving
            let (partition, improved) =
                self.local_moving(current_n, &current_edges, &current_self_loops, &mut rng);

            if !improved {
                break;
            }

            // Check modularity improvement
            let mod_now = self.modularity_weighted(
                current_n,
                &current_edges,
                &current_self_loops,
                &partition,
            );

            if mod_now - prev_modularity < self.min_modularity_gain {
                break;
            }
            prev_modularity = mod_now;

            // Phase 2: Aggregate
            let (new_edges, new_self_loops, node_mapping) =
                self.aggregate(&current_edges, &current_self_loops, &partition);

            // If no aggregation happened, stop
            if node_mapping.len() == current_n {
                break;
            }

            current_n = node_mapping.len();
            mapping_stack.push(node_mapping);
            current_edges = new_edges;
            current_self_loops = new_self_loops;
        }

        // Expand the partition back to original nodes, starting from the
        // identity partition at the coarsest level.
        let mut result: Vec<usize> = (0..current_n).collect();
        while let Some(mapping) = mapping_stack.pop() {
            result = Self::expand_partition(&result, &mapping);
        }

        if result.len() < n {
            result.resize(n, 0);
        }
        result.truncate(n);

        // Renumber labels in first-appearance order.
        let mut relabel: BTreeMap<usize, usize> = BTreeMap::new();
        let labels = result
            .iter()
            .map(|&c| {
                let next = relabel.len();
                *relabel.entry(c).or_insert(next)
            })
            .collect();

        Ok(labels)
    }

    /// Compute modularity of a weighted graph partition.
    fn modularity_weighted(
        &self,
        n: usize,
        edges: &[(usize, usize, f64)],
        self_loops: &[f64],
        communities: &[usize],
    ) -> f64 {
        // Total edge weight (counting each edge once, plus self-loops)
        let m: f64 = edges.iter().map(|(_, _, w)| w).sum::<f64>() + self_loops.iter().sum::<f64>();
        if m == 0.0 {
            return 0.0;
        }

        // Weighted degrees
        let mut degrees = vec![0.0; n];
        for &(i, j, w) in edges {
            degrees[i] += w;
            degrees[j] += w;
        }
        for (i, &sl) in self_loops.iter().enumerate() {
            degrees[i] += 2.0 * sl; // self-loops counted twice for degree
        }

        let mut q = 0.0;

        // Intra-community edges
        for &(i, j, w) in edges {
            if communities[i] == communities[j] {
                let expected = degrees[i] * degrees[j] / (2.0 * m);
                q += w - self.resolution * expected;
            }
        }

        // Self-loops (always within community)
        for (i, &sl) in self_loops.iter().enumerate() {
            if sl > 0.0 {
                let expected = degrees[i] * degrees[i] / (2.0 * m);
                q += sl - self.resolution * expected / 2.0;
            }
        }

        q / m
    }

    /// Phase 1: Local moving on the weighted graph.
    /// Returns (communities, improved).
    fn local_moving(
        &self,
        n: usize,
        edges: &[(usize, usize, f64)],
        self_loops: &[f64],
        rng: &mut StdRng,
    ) -> (Vec<usize>, bool) {
        // Weighted adjacency; ordered maps keep every fold deterministic.
        let mut adj: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        for &(i, j, w) in edges {
            *adj[i].entry(j).or_insert(0.0) += w;
            *adj[j].entry(i).or_insert(0.0) += w;
        }

        let m: f64 = edges.iter().map(|(_, _, w)| w).sum::<f64>() + self_loops.iter().sum::<f64>();
        if m == 0.0 {
            return ((0..n).collect(), false);
        }

        // Weighted degrees
        let mut degrees = vec![0.0; n];
        for &(i, j, w) in edges {
            degrees[i] += w;
            degrees[j] += w;
        }
        for (i, &sl) in self_loops.iter().enumerate() {
            degrees[i] += 2.0 * sl;
        }

        // Initialize communities, one per node
        let mut communities: Vec<usize> = (0..n).collect();
        let mut community_degrees = degrees.clone();
        let mut any_improved = false;

        // The seed determines the visit order, and with it which of several
        // equal-quality partitions the greedy pass settles on.
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        for _iter in 0..self.max_iter {
            let mut improved = false;

            for &node in &order {
                let current_community = communities[node];
                let ki = degrees[node];

                // Temporarily remove node from its community
                community_degrees[current_community] -= ki;

                // Edge weight from node into each neighboring community
                let mut community_weights: BTreeMap<usize, f64> = BTreeMap::new();
                for (&neighbor, &w) in &adj[node] {
                    let nc = communities[neighbor];
                    *community_weights.entry(nc).or_insert(0.0) += w;
                }

                // Best community; strict improvement required, so equal gains
                // keep the smallest community id (BTreeMap order).
                let mut best_community = current_community;
                let mut best_gain = 0.0;

                for (&target_comm, &ki_in) in &community_weights {
                    let sigma_tot = community_degrees[target_comm];
                    let gain =
                        ki_in / m - self.resolution * sigma_tot * ki / (2.0 * m * m);
                    if gain > best_gain {
                        best_gain = gain;
                        best_community = target_comm;
                    }
                }

                if best_community != current_community {
                    communities[node] = best_community;
                    community_degrees[best_community] += ki;
                    improved = true;
                    any_improved = true;
                } else {
                    community_degrees[current_community] += ki;
                }
            }

            if !improved {
                break;
            }
        }

        (communities, any_improved)
    }

    /// Phase 2: Aggregate the graph, one meta-node per community.
    /// Returns (new_edges, new_self_loops, meta-node to original-nodes mapping).
    fn aggregate(
        &self,
        edges: &[(usize, usize, f64)],
        self_loops: &[f64],
        communities: &[usize],
    ) -> (Vec<(usize, usize, f64)>, Vec<f64>, Vec<Vec<usize>>) {
        let mut unique_comms: Vec<usize> = communities.to_vec();
        unique_comms.sort_unstable();
        unique_comms.dedup();
        let n_new = unique_comms.len();

        let comm_to_new: BTreeMap<usize, usize> = unique_comms
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i))
            .collect();

        // Track which original nodes map to each meta-node
        let mut new_to_old: Vec<Vec<usize>> = vec![Vec::new(); n_new];
        for (node, &comm) in communities.iter().enumerate() {
            new_to_old[comm_to_new[&comm]].push(node);
        }

        // Aggregate inter-community edges; BTreeMap keeps the output sorted.
        let mut new_edge_weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for &(i, j, w) in edges {
            let ci = comm_to_new[&communities[i]];
            let cj = comm_to_new[&communities[j]];
            if ci == cj {
                // Becomes a self-loop below
                continue;
            }
            let key = if ci < cj { (ci, cj) } else { (cj, ci) };
            *new_edge_weights.entry(key).or_insert(0.0) += w;
        }

        let new_edges: Vec<(usize, usize, f64)> = new_edge_weights
            .into_iter()
            .map(|((i, j), w)| (i, j, w))
            .collect();

        // Aggregate self-loops, including edges folded inside communities
        let mut new_self_loops = vec![0.0; n_new];
        for (i, &sl) in self_loops.iter().enumerate() {
            let ci = comm_to_new[&communities[i]];
            new_self_loops[ci] += sl;
        }
        for &(i, j, w) in edges {
            let ci = comm_to_new[&communities[i]];
            let cj = comm_to_new[&communities[j]];
            if ci == cj {
                new_self_loops[ci] += w;
            }
        }

        (new_edges, new_self_loops, new_to_old)
    }

    /// Expand a partition from the aggregated level to the original nodes.
    fn expand_partition(partition: &[usize], node_mapping: &[Vec<usize>]) -> Vec<usize> {
        let max_node = node_mapping.iter().flatten().copied().max().unwrap_or(0);
        let mut result = vec![0; max_node + 1];

        for (agg_node, original_nodes) in node_mapping.iter().enumerate() {
            let comm = partition[agg_node];
            for &orig in original_nodes {
                result[orig] = comm;
            }
        }
        result
    }
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}
