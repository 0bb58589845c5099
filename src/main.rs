use anyhow::Result;
use clap::Parser;

use coedit_network_analyzer::analysis;
use coedit_network_analyzer::config::AnalysisConfig;
use coedit_network_analyzer::data;
use coedit_network_analyzer::graph::{self, connectivity};
use coedit_network_analyzer::storage;

#[derive(Parser, Debug)]
#[clap(
    name = "coedit-network-analyzer",
    about = "Co-editorship network analysis of collaborative media edit logs"
)]
struct Cli {
    /// Path to the CSV edit log (item, editor and optional timestamp columns)
    #[clap(long)]
    input: String,

    /// Output directory for results
    #[clap(long, default_value = "network_results")]
    output_dir: String,

    /// Number of spectral clusters
    #[clap(long, default_value = "2")]
    spectral_clusters: usize,

    /// Skip the spectral partition
    #[clap(long)]
    skip_spectral: bool,

    /// Limit ingestion to the first N distinct items
    #[clap(long)]
    sample_items: Option<usize>,

    /// Seed for randomized steps (community detection, k-means)
    #[clap(long, default_value = "42")]
    seed: u64,

    /// Restrict analysis to the largest connected component
    #[clap(long)]
    largest_component: bool,

    /// Record per-metric failures in the bundle instead of aborting the run
    #[clap(long)]
    allow_partial: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        // If threads = 0, use all available cores
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Starting co-editorship network analysis");
    log::info!("Input: {}", args.input);
    log::info!("Output: {}", args.output_dir);

    // Create output directory
    std::fs::create_dir_all(&args.output_dir)?;

    // 1. Load the edit log
    let records = data::load_edit_log(&args.input, args.sample_items)?;

    // 2. Project the bipartite editor-item relation onto a co-editorship graph
    let mut graph = graph::construct_graph(&records);

    log::info!(
        "Built graph with {} nodes and {} edges",
        graph.node_count,
        graph.edge_count()
    );

    // 3. Optionally restrict to the largest connected component
    if args.largest_component {
        let members = connectivity::largest_component(&graph);
        if members.len() < graph.node_count {
            log::info!(
                "Restricting to largest component: {} of {} nodes",
                members.len(),
                graph.node_count
            );
            graph = graph.induced_subgraph(&members);
        }
    }

    // 4. Compute metrics and partitions
    let config = AnalysisConfig::new(
        if args.skip_spectral {
            None
        } else {
            Some(args.spectral_clusters)
        },
        args.seed,
        args.allow_partial,
    );
    let bundle = analysis::analyze(&graph, &config)?;

    // 5. Save results
    storage::save_results(&bundle, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
