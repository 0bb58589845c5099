//! Connected-component analysis

use std::collections::HashMap;

use crate::graph::CollaborationGraph;

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Rank/size of each set (for union by rank)
    rank: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        let mut parent = Vec::with_capacity(size);
        let mut rank = Vec::with_capacity(size);

        // Initialize each node as its own set
        for i in 0..size {
            parent.push(i as u32);
            rank.push(1);
        }

        Self { parent, rank }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let px = self.parent[x as usize];
        if px != x {
            // Path compression: set parent to root
            self.parent[x as usize] = self.find(px);
        }
        self.parent[x as usize]
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return; // Already in the same set
        }

        // Union by rank: attach smaller tree under root of larger tree
        let rank_x = self.rank[root_x as usize];
        let rank_y = self.rank[root_y as usize];

        if rank_x > rank_y {
            self.parent[root_y as usize] = root_x;
            self.rank[root_x as usize] += self.rank[root_y as usize];
        } else {
            self.parent[root_x as usize] = root_y;
            self.rank[root_y as usize] += self.rank[root_x as usize];
        }
    }

    /// Get the size of the set containing x
    pub fn size(&mut self, x: u32) -> u32 {
        let root = self.find(x);
        self.rank[root as usize]
    }
}

/// Group the graph's nodes into connected components.
///
/// Components are sorted largest first, ties broken by smallest member, and
/// members within each component are sorted ascending.
pub fn components(graph: &CollaborationGraph) -> Vec<Vec<u32>> {
    let node_count = graph.node_count;
    let mut sets = DisjointSets::new(node_count);

    for node in 0..node_count {
        for &target in graph.neighbors(node) {
            sets.union(node as u32, target);
        }
    }

    let mut by_root: HashMap<u32, Vec<u32>> = HashMap::new();
    for node in 0..node_count {
        let root = sets.find(node as u32);
        by_root.entry(root).or_default().push(node as u32);
    }

    let mut components: Vec<Vec<u32>> = by_root.into_values().collect();
    for members in &mut components {
        members.sort_unstable();
    }
    components.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));

    components
}

/// Check whether the graph is connected (trivially true below two nodes)
pub fn is_connected(graph: &CollaborationGraph) -> bool {
    graph.node_count <= 1 || components(graph).len() == 1
}

/// Nodes of the largest connected component
pub fn largest_component(graph: &CollaborationGraph) -> Vec<u32> {
    components(graph).into_iter().next().unwrap_or_default()
}
