//! Results persistence module

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, to_string_pretty};

use crate::analysis::ResultBundle;

/// Save the analysis results to the specified directory
pub fn save_results(bundle: &ResultBundle, output_dir: &str) -> Result<()> {
    log::info!("Saving results to {}", output_dir);

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    save_bundle(bundle, output_dir)?;
    save_summary(bundle, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Save the full result bundle
fn save_bundle(bundle: &ResultBundle, output_dir: &str) -> Result<()> {
    let path = Path::new(output_dir).join("results.json");
    let mut file = File::create(path)?;

    file.write_all(to_string_pretty(bundle)?.as_bytes())?;

    Ok(())
}

/// Save a scalar-only summary
fn save_summary(bundle: &ResultBundle, output_dir: &str) -> Result<()> {
    log::info!("Saving summary information");

    let path = Path::new(output_dir).join("summary.json");
    let mut file = File::create(path)?;

    let community_count = bundle
        .modularity_communities
        .values()
        .collect::<BTreeSet<_>>()
        .len();

    let summary = json!({
        "number_of_nodes": bundle.number_of_nodes,
        "number_of_edges": bundle.number_of_edges,
        "average_degree": bundle.average_degree,
        "diameter": bundle.diameter,
        "avg_path_length": bundle.avg_path_length,
        "clustering_coeff": bundle.clustering_coeff,
        "modularity_community_count": community_count,
        "failed_metrics": bundle.failed_metrics.iter()
            .map(|f| f.metric.clone())
            .collect::<Vec<_>>(),
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}
