//! Network analysis: metric computation and result aggregation

pub mod centrality;
pub mod community;
pub mod kmeans;
pub mod paths;
pub mod spectral;
pub mod stats;

use std::collections::BTreeMap;

use serde::Serialize;
use statrs::statistics::Statistics;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::graph::CollaborationGraph;
use community::Louvain;
use spectral::SpectralPartition;

/// A metric that failed in a tolerated (partial) run.
#[derive(Debug, Clone, Serialize)]
pub struct MetricFailure {
    /// Name of the failed metric
    pub metric: String,

    /// Why it failed
    pub reason: String,
}

/// Aggregated statistics of one analysis run; immutable once assembled.
///
/// Optional fields are only absent in partial mode, with the failure
/// recorded in `failed_metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct ResultBundle {
    pub number_of_nodes: usize,
    pub number_of_edges: usize,
    pub average_degree: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_path_length: Option<f64>,
    pub clustering_coeff: f64,
    pub degree_centrality: BTreeMap<String, f64>,
    pub betweenness_centrality: BTreeMap<String, f64>,
    pub closeness_centrality: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eigenvector_centrality: Option<BTreeMap<String, f64>>,
    pub modularity_communities: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectral_communities: Option<BTreeMap<String, usize>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_metrics: Vec<MetricFailure>,
}

/// Run every metric over a read-only view of the graph and assemble the
/// bundle.
///
/// In strict mode (the default) the first metric failure aborts the run; with
/// `allow_partial` the connectivity- and convergence-bound metrics may drop
/// out individually while everything else is still computed and reported. An
/// out-of-range spectral cluster count fails fast in either mode.
pub fn analyze(graph: &CollaborationGraph, config: &AnalysisConfig) -> Result<ResultBundle> {
    let n = graph.node_count;
    if n == 0 {
        return Err(AnalysisError::EmptyGraph);
    }

    if let Some(k) = config.spectral_clusters {
        if k == 0 || k > n {
            return Err(AnalysisError::InvalidClusterCount {
                requested: k,
                node_count: n,
            });
        }
    }

    let mut failures = Vec::new();

    let degrees: Vec<f64> = (0..n).map(|node| graph.degree(node) as f64).collect();
    log::debug!(
        "Degree summary: mean={:.2} min={:.0} max={:.0}",
        (&degrees).mean(),
        (&degrees).min(),
        (&degrees).max()
    );

    let average_degree = stats::average_degree(graph);

    log::info!("Computing distance metrics");
    let diameter = tolerate(
        paths::diameter(graph),
        "diameter",
        config.allow_partial,
        &mut failures,
    )?;
    let avg_path_length = tolerate(
        paths::average_path_length(graph),
        "avg_path_length",
        config.allow_partial,
        &mut failures,
    )?;

    log::info!("Computing clustering coefficient");
    let clustering_coeff = stats::clustering_coefficient(graph);

    log::info!("Computing centrality rankings");
    let degree_centrality = score_map(graph, centrality::degree_centrality(graph));
    let betweenness_centrality = score_map(graph, centrality::betweenness_centrality(graph));
    let closeness_centrality = score_map(graph, paths::closeness_centrality(graph));
    let eigenvector_centrality = tolerate(
        centrality::eigenvector_centrality(graph),
        "eigenvector_centrality",
        config.allow_partial,
        &mut failures,
    )?
    .map(|scores| score_map(graph, scores));

    log::info!("Detecting communities by modularity optimization");
    let modularity_communities = label_map(
        graph,
        Louvain::new().with_seed(config.seed).detect(graph)?,
    );

    let spectral_communities = match config.spectral_clusters {
        Some(k) => {
            log::info!("Computing spectral partition into {} clusters", k);
            let labels = SpectralPartition::new(k)
                .with_seed(config.seed)
                .detect(graph)?;
            Some(label_map(graph, labels))
        }
        None => None,
    };

    Ok(ResultBundle {
        number_of_nodes: n,
        number_of_edges: graph.edge_count(),
        average_degree,
        diameter,
        avg_path_length,
        clustering_coeff,
        degree_centrality,
        betweenness_centrality,
        closeness_centrality,
        eigenvector_centrality,
        modularity_communities,
        spectral_communities,
        failed_metrics: failures,
    })
}

/// Either propagate a metric failure or record it, per the run's policy.
fn tolerate<T>(
    result: Result<T>,
    metric: &'static str,
    allow_partial: bool,
    failures: &mut Vec<MetricFailure>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if allow_partial => {
            log::warn!("Metric {} failed: {}", metric, err);
            failures.push(MetricFailure {
                metric: metric.to_string(),
                reason: err.to_string(),
            });
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn score_map(graph: &CollaborationGraph, scores: Vec<f64>) -> BTreeMap<String, f64> {
    scores
        .into_iter()
        .enumerate()
        .map(|(node, score)| (graph.node_id(node).to_string(), score))
        .collect()
}

fn label_map(graph: &CollaborationGraph, labels: Vec<usize>) -> BTreeMap<String, usize> {
    labels
        .into_iter()
        .enumerate()
        .map(|(node, label)| (graph.node_id(node).to_string(), label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EditRecord;
    use crate::graph::construct_graph;

    fn record(item: &str, editor: &str) -> EditRecord {
        EditRecord {
            item: item.to_string(),
            editor: editor.to_string(),
            timestamp: None,
        }
    }

    /// Triangle A-B-C plus pendant B-D; connected.
    fn connected_log() -> Vec<EditRecord> {
        vec![
            record("I1", "A"),
            record("I1", "B"),
            record("I1", "C"),
            record("I2", "B"),
            record("I2", "D"),
        ]
    }

    #[test]
    fn full_bundle_on_a_connected_graph() {
        let graph = construct_graph(&connected_log());
        let bundle = analyze(&graph, &AnalysisConfig::default()).unwrap();

        assert_eq!(bundle.number_of_nodes, 4);
        assert_eq!(bundle.number_of_edges, 4);
        assert!((bundle.average_degree - 2.0).abs() < 1e-12);
        assert_eq!(bundle.diameter, Some(2));
        assert!((bundle.avg_path_length.unwrap() - 16.0 / 12.0).abs() < 1e-12);
        assert!((bundle.clustering_coeff - 7.0 / 12.0).abs() < 1e-12);

        for map_len in [
            bundle.degree_centrality.len(),
            bundle.betweenness_centrality.len(),
            bundle.closeness_centrality.len(),
            bundle.eigenvector_centrality.as_ref().unwrap().len(),
            bundle.modularity_communities.len(),
            bundle.spectral_communities.as_ref().unwrap().len(),
        ] {
            assert_eq!(map_len, 4);
        }
        assert!(bundle.failed_metrics.is_empty());
    }

    #[test]
    fn disconnected_graph_fails_strict_mode() {
        let mut log = connected_log();
        log.push(record("I3", "E"));
        let graph = construct_graph(&log);

        let result = analyze(&graph, &AnalysisConfig::default());
        assert!(matches!(
            result,
            Err(AnalysisError::Disconnected { metric: "diameter" })
        ));
    }

    #[test]
    fn partial_mode_reports_and_continues() {
        let mut log = connected_log();
        log.push(record("I3", "E"));
        let graph = construct_graph(&log);

        let config = AnalysisConfig {
            allow_partial: true,
            ..AnalysisConfig::default()
        };
        let bundle = analyze(&graph, &config).unwrap();

        assert_eq!(bundle.diameter, None);
        assert_eq!(bundle.avg_path_length, None);
        assert_eq!(bundle.failed_metrics.len(), 2);

        // Everything else still lands, including the isolated editor.
        assert_eq!(bundle.degree_centrality["E"], 0.0);
        assert_eq!(bundle.modularity_communities.len(), 5);
    }

    #[test]
    fn invalid_cluster_count_fails_fast_even_in_partial_mode() {
        let graph = construct_graph(&connected_log());

        let config = AnalysisConfig {
            spectral_clusters: Some(10),
            allow_partial: true,
            ..AnalysisConfig::default()
        };

        assert_eq!(
            analyze(&graph, &config).unwrap_err(),
            AnalysisError::InvalidClusterCount {
                requested: 10,
                node_count: 4
            }
        );
    }

    #[test]
    fn spectral_partition_can_be_skipped() {
        let graph = construct_graph(&connected_log());

        let config = AnalysisConfig {
            spectral_clusters: None,
            ..AnalysisConfig::default()
        };
        let bundle = analyze(&graph, &config).unwrap();

        assert!(bundle.spectral_communities.is_none());

        let value = serde_json::to_value(&bundle).unwrap();
        assert!(value.get("spectral_communities").is_none());
        assert!(value.get("failed_metrics").is_none());
        assert!(value.get("diameter").is_some());
    }

    #[test]
    fn fixed_seed_reproduces_partitions() {
        let graph = construct_graph(&connected_log());
        let config = AnalysisConfig::default();

        let first = analyze(&graph, &config).unwrap();
        let second = analyze(&graph, &config).unwrap();

        assert_eq!(first.modularity_communities, second.modularity_communities);
        assert_eq!(first.spectral_communities, second.spectral_communities);
    }

    #[test]
    fn empty_graph_is_rejected() {
        let graph = construct_graph(&[]);
        assert_eq!(
            analyze(&graph, &AnalysisConfig::default()).unwrap_err(),
            AnalysisError::EmptyGraph
        );
    }
}
