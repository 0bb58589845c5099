//! Configuration for the network analysis run

/// Knobs controlling a single analysis run.
pub struct AnalysisConfig {
    /// Number of spectral clusters, or None to skip the spectral partition
    pub spectral_clusters: Option<usize>,

    /// Seed for every randomized step (Louvain visit order, k-means init)
    pub seed: u64,

    /// Tolerate per-metric failures instead of aborting the whole bundle
    pub allow_partial: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            spectral_clusters: Some(2),
            seed: 42,
            allow_partial: false,
        }
    }
}

impl AnalysisConfig {
    /// Create a configuration with custom values
    pub fn new(spectral_clusters: Option<usize>, seed: u64, allow_partial: bool) -> Self {
        Self {
            spectral_clusters,
            seed,
            allow_partial,
        }
    }
}
