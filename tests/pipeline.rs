//! End-to-end pipeline tests: edit log -> graph -> bundle.
//!
//! # Test Strategy
//!
//! 1. Build graphs from small, hand-checked edit logs.
//! 2. Assert the projection invariants (symmetry, no self-loops, node
//!    completeness, order independence).
//! 3. Run the full analysis and assert the hand-computed scalar values.
//! 4. Exercise the failure policies: strict vs partial on a disconnected
//!    graph, fail-fast cluster-count validation.
//! 5. Re-run seeded steps and assert bit-identical partitions.

use std::collections::BTreeSet;

use coedit_network_analyzer::analysis::{analyze, community::Louvain};
use coedit_network_analyzer::config::AnalysisConfig;
use coedit_network_analyzer::data::EditRecord;
use coedit_network_analyzer::error::AnalysisError;
use coedit_network_analyzer::graph::{construct_graph, CollaborationGraph};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn record(item: &str, editor: &str) -> EditRecord {
    EditRecord {
        item: item.to_string(),
        editor: editor.to_string(),
        timestamp: None,
    }
}

/// The reference edit log: I1 edited by A, B, C and I2 edited by B, D.
fn reference_log() -> Vec<EditRecord> {
    vec![
        record("I1", "A"),
        record("I1", "B"),
        record("I1", "C"),
        record("I2", "B"),
        record("I2", "D"),
    ]
}

fn edge(graph: &CollaborationGraph, a: &str, b: &str) -> bool {
    graph.has_edge(
        graph.index_of(a).unwrap(),
        graph.index_of(b).unwrap(),
    )
}

// ---------------------------------------------------------------------------
// Graph construction
// ---------------------------------------------------------------------------

#[test]
fn reference_log_builds_the_expected_graph() {
    let graph = construct_graph(&reference_log());

    assert_eq!(graph.node_count, 4);
    assert_eq!(graph.edge_count(), 4);

    for (a, b) in [("A", "B"), ("A", "C"), ("B", "C"), ("B", "D")] {
        assert!(edge(&graph, a, b), "missing edge {}-{}", a, b);
        assert!(edge(&graph, b, a), "edge {}-{} not symmetric", a, b);
    }
    assert!(!edge(&graph, "A", "D"));
    assert!(!edge(&graph, "C", "D"));
}

#[test]
fn permuted_log_builds_an_isomorphic_graph() {
    let mut shuffled = reference_log();
    shuffled.swap(0, 4);
    shuffled.swap(1, 3);

    let original = construct_graph(&reference_log());
    let permuted = construct_graph(&shuffled);

    let ids = |g: &CollaborationGraph| -> BTreeSet<String> {
        g.node_ids().iter().cloned().collect()
    };
    assert_eq!(ids(&original), ids(&permuted));

    for a in ["A", "B", "C", "D"] {
        for b in ["A", "B", "C", "D"] {
            if a != b {
                assert_eq!(edge(&original, a, b), edge(&permuted, a, b));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Full analysis
// ---------------------------------------------------------------------------

#[test]
fn bundle_matches_hand_computed_values() {
    let graph = construct_graph(&reference_log());
    let bundle = analyze(&graph, &AnalysisConfig::default()).unwrap();

    assert_eq!(bundle.number_of_nodes, 4);
    assert_eq!(bundle.number_of_edges, 4);
    assert!((bundle.average_degree - 2.0).abs() < 1e-12);
    assert_eq!(bundle.diameter, Some(2));

    // Degree centrality: B touches everyone, so 3/3; A and C 2/3; D 1/3.
    assert!((bundle.degree_centrality["B"] - 1.0).abs() < 1e-12);
    assert!((bundle.degree_centrality["A"] - 2.0 / 3.0).abs() < 1e-12);
    assert!((bundle.degree_centrality["D"] - 1.0 / 3.0).abs() < 1e-12);

    // B sits on every shortest path to D.
    let b_betweenness = bundle.betweenness_centrality["B"];
    for id in ["A", "C", "D"] {
        assert!(b_betweenness > bundle.betweenness_centrality[id]);
    }
}

#[test]
fn centrality_and_partition_maps_cover_exactly_the_node_set() {
    let mut log = reference_log();
    log.push(record("I3", "E"));
    let graph = construct_graph(&log);

    let config = AnalysisConfig {
        allow_partial: true,
        ..AnalysisConfig::default()
    };
    let bundle = analyze(&graph, &config).unwrap();

    let nodes: BTreeSet<String> = graph.node_ids().iter().cloned().collect();
    let keys = |m: &std::collections::BTreeMap<String, usize>| -> BTreeSet<String> {
        m.keys().cloned().collect()
    };

    assert_eq!(keys(&bundle.modularity_communities), nodes);
    assert_eq!(keys(bundle.spectral_communities.as_ref().unwrap()), nodes);

    // Every label is used by at least one node.
    for partition in [
        &bundle.modularity_communities,
        bundle.spectral_communities.as_ref().unwrap(),
    ] {
        let max_label = *partition.values().max().unwrap();
        let used: BTreeSet<usize> = partition.values().copied().collect();
        assert_eq!(used.len(), max_label + 1);
    }
}

#[test]
fn isolated_editor_makes_distance_metrics_fail() {
    let mut log = reference_log();
    log.push(record("I3", "E"));
    let graph = construct_graph(&log);

    let e = graph.index_of("E").unwrap();
    assert_eq!(graph.degree(e), 0);

    // Strict mode aborts.
    assert!(matches!(
        analyze(&graph, &AnalysisConfig::default()),
        Err(AnalysisError::Disconnected { .. })
    ));

    // Partial mode records the failures and keeps everything else.
    let config = AnalysisConfig {
        allow_partial: true,
        ..AnalysisConfig::default()
    };
    let bundle = analyze(&graph, &config).unwrap();

    assert_eq!(bundle.diameter, None);
    assert_eq!(bundle.avg_path_length, None);
    assert_eq!(bundle.degree_centrality["E"], 0.0);

    let failed: BTreeSet<&str> = bundle
        .failed_metrics
        .iter()
        .map(|f| f.metric.as_str())
        .collect();
    assert_eq!(
        failed,
        BTreeSet::from(["diameter", "avg_path_length"])
    );
}

#[test]
fn spectral_cluster_count_is_validated_before_any_work() {
    let graph = construct_graph(&reference_log());

    let config = AnalysisConfig {
        spectral_clusters: Some(5),
        allow_partial: true,
        ..AnalysisConfig::default()
    };

    assert_eq!(
        analyze(&graph, &config).unwrap_err(),
        AnalysisError::InvalidClusterCount {
            requested: 5,
            node_count: 4
        }
    );
}

// ---------------------------------------------------------------------------
// Reproducibility
// ---------------------------------------------------------------------------

#[test]
fn seeded_runs_are_reproducible() {
    let graph = construct_graph(&reference_log());

    for seed in [0u64, 7, 42] {
        let config = AnalysisConfig {
            seed,
            ..AnalysisConfig::default()
        };

        let first = analyze(&graph, &config).unwrap();
        let second = analyze(&graph, &config).unwrap();

        assert_eq!(first.modularity_communities, second.modularity_communities);
        assert_eq!(first.spectral_communities, second.spectral_communities);
    }
}

#[test]
fn louvain_groups_dense_cliques_together() {
    // Two co-editing circles around separate item pools, one bridge pair.
    let graph = construct_graph(&[
        record("I1", "A0"),
        record("I1", "A1"),
        record("I1", "A2"),
        record("I2", "B0"),
        record("I2", "B1"),
        record("I2", "B2"),
        record("I3", "A0"),
        record("I3", "B0"),
    ]);

    let labels = Louvain::new().with_seed(1).detect(&graph).unwrap();
    let label_of = |id: &str| labels[graph.index_of(id).unwrap()];

    assert_eq!(label_of("A0"), label_of("A1"));
    assert_eq!(label_of("A1"), label_of("A2"));
    assert_eq!(label_of("B0"), label_of("B1"));
    assert_eq!(label_of("B1"), label_of("B2"));
    assert_ne!(label_of("A0"), label_of("B0"));
}
