//! Spectral partition: Laplacian eigenvector embedding + k-means.
//!
//! Embeds nodes with the top-k eigenvectors of the shifted symmetric-normalized
//! adjacency D^{-1/2} A D^{-1/2} + I (equivalent ordering to the smallest
//! eigenvectors of the normalized Laplacian, but positive semidefinite so plain
//! orthogonal iteration finds them), row-normalizes the embedding and runs
//! seeded k-means on the rows.

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::analysis::kmeans::Kmeans;
use crate::error::{AnalysisError, Result};
use crate::graph::CollaborationGraph;

/// Spectral partition of a graph into a fixed number of clusters.
#[derive(Debug, Clone)]
pub struct SpectralPartition {
    /// Number of clusters.
    k: usize,
    /// Iteration bound for the orthogonal-iteration eigensolver.
    embed_iter: usize,
    /// Iteration bound for the k-means step.
    kmeans_iter: usize,
    /// Seed for the start basis and the k-means initialization.
    seed: u64,
}

impl SpectralPartition {
    /// Create a spectral partitioner producing k clusters.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            embed_iter: 300,
            kmeans_iter: 100,
            seed: 42,
        }
    }

    /// Set the eigensolver iteration bound.
    pub fn with_embed_iter(mut self, iterations: usize) -> Self {
        self.embed_iter = iterations;
        self
    }

    /// Set the seed for every randomized step.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Partition the graph's nodes into exactly k clusters.
    ///
    /// `k` is validated against the node count before any computation.
    pub fn detect(&self, graph: &CollaborationGraph) -> Result<Vec<usize>> {
        let n = graph.node_count;
        if n == 0 {
            return Err(AnalysisError::EmptyGraph);
        }
        if self.k == 0 || self.k > n {
            return Err(AnalysisError::InvalidClusterCount {
                requested: self.k,
                node_count: n,
            });
        }

        let embedding = self.embed(graph);

        Kmeans::new(self.k)
            .with_max_iter(self.kmeans_iter)
            .with_seed(self.seed)
            .fit_predict(&embedding)
    }

    /// Top-k eigenvector embedding of the shifted normalized adjacency,
    /// row-normalized in the Ng-Jordan-Weiss manner.
    fn embed(&self, graph: &CollaborationGraph) -> Array2<f64> {
        let n = graph.node_count;
        let k = self.k;

        // Isolated nodes get a zero row in the normalized adjacency; the
        // identity shift still keeps them represented in the spectrum.
        let inv_sqrt_deg: Vec<f64> = (0..n)
            .map(|node| {
                let d = graph.degree(node);
                if d == 0 {
                    0.0
                } else {
                    1.0 / (d as f64).sqrt()
                }
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut basis = Array2::from_shape_fn((n, k), |_| rng.gen::<f64>() - 0.5);
        orthonormalize(&mut basis, &mut rng);

        for _iter in 0..self.embed_iter {
            let mut next = Array2::zeros((n, k));
            for j in 0..k {
                let col = basis.column(j);
                let mut image = normalized_matvec(graph, &inv_sqrt_deg, &col);
                image += &col; // the +I shift
                next.column_mut(j).assign(&image);
            }
            orthonormalize(&mut next, &mut rng);

            // Columns stop rotating once the subspace has settled.
            let aligned = (0..k)
                .all(|j| 1.0 - next.column(j).dot(&basis.column(j)).abs() < 1e-10);
            basis = next;
            if aligned {
                break;
            }
        }

        for mut row in basis.rows_mut() {
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|v| v / norm);
            }
        }

        basis
    }
}

/// y = D^{-1/2} A D^{-1/2} x over the CSR adjacency.
fn normalized_matvec(
    graph: &CollaborationGraph,
    inv_sqrt_deg: &[f64],
    x: &ArrayView1<'_, f64>,
) -> Array1<f64> {
    let n = graph.node_count;
    let mut y = Array1::zeros(n);

    for node in 0..n {
        let mut acc = 0.0;
        for &target in graph.neighbors(node) {
            let target = target as usize;
            acc += inv_sqrt_deg[target] * x[target];
        }
        y[node] = inv_sqrt_deg[node] * acc;
    }

    y
}

/// Modified Gram-Schmidt over the columns; a column that collapses to zero
/// is reseeded from the generator and orthogonalized again.
fn orthonormalize(matrix: &mut Array2<f64>, rng: &mut StdRng) {
    let (n, k) = matrix.dim();

    for j in 0..k {
        for attempt in 0..2 {
            for i in 0..j {
                let basis = matrix.column(i).to_owned();
                let proj = matrix.column(j).dot(&basis);
                matrix.column_mut(j).scaled_add(-proj, &basis);
            }

            let norm = matrix.column(j).dot(&matrix.column(j)).sqrt();
            if norm > 1e-12 {
                matrix.column_mut(j).mapv_inplace(|v| v / norm);
                break;
            }

            if attempt == 0 {
                for i in 0..n {
                    matrix[[i, j]] = rng.gen::<f64>() - 0.5;
                }
            }
        }
    }
}
