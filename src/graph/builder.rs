//! Graph construction: projecting the edit log onto a co-editorship graph

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::data::EditRecord;
use crate::graph::CollaborationGraph;

/// Builder for incrementally constructing a [`CollaborationGraph`].
pub struct GraphBuilder {
    /// Mapping from editor ids to node indices
    id_to_index: HashMap<String, u32>,

    /// Editor id for each node index
    node_ids: Vec<String>,

    /// Undirected edges, normalized to (smaller index, larger index)
    edges: HashSet<(u32, u32)>,
}

impl GraphBuilder {
    /// Create an empty graph builder
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a graph builder with the given node capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            edges: HashSet::new(),
        }
    }

    /// Get or create a node index for the given editor id
    pub fn get_or_create_node(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());
        idx
    }

    /// Record that two editors worked on a common item.
    ///
    /// Self-pairings are ignored and repeated pairings collapse onto the
    /// single existing edge (simple-graph semantics).
    pub fn add_collaboration(&mut self, a: &str, b: &str) {
        let a_idx = self.get_or_create_node(a);
        let b_idx = self.get_or_create_node(b);

        if a_idx == b_idx {
            return;
        }

        let key = if a_idx < b_idx {
            (a_idx, b_idx)
        } else {
            (b_idx, a_idx)
        };
        self.edges.insert(key);
    }

    /// Build the compressed graph
    pub fn build(self) -> CollaborationGraph {
        let node_count = self.node_ids.len();

        let mut adjacency_lists: Vec<Vec<u32>> = vec![Vec::new(); node_count];
        for &(a, b) in &self.edges {
            adjacency_lists[a as usize].push(b);
            adjacency_lists[b as usize].push(a);
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);
        let mut edges = Vec::with_capacity(self.edges.len() * 2);

        let mut offset = 0u32;
        for list in &mut adjacency_lists {
            // Sort for binary search efficiency
            list.sort_unstable();
            offset += list.len() as u32;
            offsets.push(offset);
            edges.extend_from_slice(list);
        }

        CollaborationGraph {
            node_count,
            offsets,
            edges,
            node_ids: self.node_ids,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Project the edit log onto the co-editorship graph.
///
/// Every distinct editor becomes a node, and two editors are connected when
/// they both edited at least one common item. The per-item pair expansion is
/// quadratic in that item's distinct editor count, which is acceptable for
/// edit histories but worth knowing about for items with thousands of editors.
///
/// Records missing an editor or item id are skipped, never fatal. The node
/// and edge sets depend only on the multiset of (item, editor) pairs, not on
/// record order.
pub fn construct_graph(records: &[EditRecord]) -> CollaborationGraph {
    let mut builder = GraphBuilder::with_capacity(records.len());
    let mut editors_by_item: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut skipped = 0usize;

    for record in records {
        if record.item.is_empty() || record.editor.is_empty() {
            skipped += 1;
            continue;
        }

        // Register the editor up front so editors with no co-editor still
        // appear as isolated nodes.
        builder.get_or_create_node(&record.editor);
        editors_by_item
            .entry(record.item.as_str())
            .or_default()
            .insert(record.editor.as_str());
    }

    if skipped > 0 {
        log::warn!("Skipped {} records with a missing item or editor id", skipped);
    }

    for editors in editors_by_item.values() {
        for (&a, &b) in editors.iter().tuple_combinations() {
            builder.add_collaboration(a, b);
        }
    }

    builder.build()
}
