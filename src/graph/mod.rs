//! Graph representation and construction module

pub mod builder;
pub mod connectivity;

pub use builder::{construct_graph, GraphBuilder};

/// Undirected simple co-editorship graph in compressed sparse form.
///
/// Each undirected edge is stored in both endpoints' adjacency ranges, so the
/// edge array holds twice the edge count. Adjacency ranges are kept sorted,
/// which makes membership tests a binary search.
#[derive(Debug, Clone)]
pub struct CollaborationGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Offset array: offsets[i] to offsets[i+1] defines node i's neighbor range
    offsets: Vec<u32>,

    /// Concatenated sorted neighbor lists
    edges: Vec<u32>,

    /// Editor identifier for each node index
    node_ids: Vec<String>,
}

impl CollaborationGraph {
    /// Get the neighbors of a node
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Get the degree of a node
    pub fn degree(&self, node: usize) -> usize {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        end - start
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Check whether an edge between two nodes exists
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).binary_search(&(b as u32)).is_ok()
    }

    /// Editor identifier of a node
    pub fn node_id(&self, node: usize) -> &str {
        &self.node_ids[node]
    }

    /// Editor identifiers in node-index order
    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    /// Node index of an editor identifier, if present
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_ids.iter().position(|n| n == id)
    }

    /// Extract the subgraph induced by a set of nodes.
    ///
    /// Keeps an edge only when both endpoints are in the set; editor ids are
    /// carried over. Used to restrict analysis to a connected component.
    pub fn induced_subgraph(&self, members: &[u32]) -> CollaborationGraph {
        let mut keep: Vec<u32> = members.to_vec();
        keep.sort_unstable();
        keep.dedup();

        // Map original indices into the subgraph; u32::MAX marks dropped nodes.
        let mut orig_to_sub = vec![u32::MAX; self.node_count];
        for (sub, &orig) in keep.iter().enumerate() {
            orig_to_sub[orig as usize] = sub as u32;
        }

        let mut offsets = Vec::with_capacity(keep.len() + 1);
        offsets.push(0);
        let mut edges = Vec::new();
        let mut offset = 0u32;

        for &orig in &keep {
            for &target in self.neighbors(orig as usize) {
                let mapped = orig_to_sub[target as usize];
                if mapped != u32::MAX {
                    edges.push(mapped);
                    offset += 1;
                }
            }
            offsets.push(offset);
        }

        let node_ids = keep
            .iter()
            .map(|&orig| self.node_ids[orig as usize].clone())
            .collect();

        CollaborationGraph {
            node_count: keep.len(),
            offsets,
            edges,
            node_ids,
        }
    }
}
