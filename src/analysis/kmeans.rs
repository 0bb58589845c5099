//! Seeded k-means used as the final step of the spectral partition.
//!
//! Lloyd's algorithm with k-means++ initialization. Every random choice goes
//! through a caller-seeded generator, so a fixed seed reproduces the labels.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{AnalysisError, Result};

/// K-means clustering over the rows of a matrix.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum iterations.
    max_iter: usize,
    /// Convergence tolerance on total centroid shift.
    tol: f64,
    /// Seed for initialization.
    seed: u64,
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            tol: 1e-4,
            seed: 42,
        }
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the seed for centroid initialization.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Assign each row of `data` to one of k clusters.
    pub fn fit_predict(&self, data: &Array2<f64>) -> Result<Vec<usize>> {
        let n = data.nrows();
        let d = data.ncols();

        if n == 0 {
            return Err(AnalysisError::EmptyGraph);
        }
        if self.k == 0 || self.k > n {
            return Err(AnalysisError::InvalidClusterCount {
                requested: self.k,
                node_count: n,
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = self.init_centroids(data, &mut rng);
        let mut labels = vec![0usize; n];

        for _iter in 0..self.max_iter {
            // Assignment step
            for (i, label) in labels.iter_mut().enumerate() {
                let point = data.row(i);
                let mut best_cluster = 0;
                let mut best_dist = f64::MAX;

                for k in 0..self.k {
                    let dist = Self::squared_distance(&point, &centroids.row(k));
                    if dist < best_dist {
                        best_dist = dist;
                        best_cluster = k;
                    }
                }
                *label = best_cluster;
            }

            // Update step
            let mut new_centroids = Array2::zeros((self.k, d));
            let mut counts = vec![0usize; self.k];

            for i in 0..n {
                let k = labels[i];
                for j in 0..d {
                    new_centroids[[k, j]] += data[[i, j]];
                }
                counts[k] += 1;
            }

            for k in 0..self.k {
                if counts[k] > 0 {
                    for j in 0..d {
                        new_centroids[[k, j]] /= counts[k] as f64;
                    }
                } else {
                    // Empty cluster: reinitialize from a random point
                    let idx = rng.gen_range(0..n);
                    new_centroids.row_mut(k).assign(&data.row(idx));
                }
            }

            // Check convergence
            let shift: f64 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();

            centroids = new_centroids;

            if shift < self.tol {
                break;
            }
        }

        Ok(labels)
    }

    /// Initialize centroids with k-means++ (D² sampling).
    fn init_centroids(&self, data: &Array2<f64>, rng: &mut StdRng) -> Array2<f64> {
        let n = data.nrows();
        let d = data.ncols();
        let mut centroids = Array2::zeros((self.k, d));

        // First centroid: random point
        let first = rng.gen_range(0..n);
        centroids.row_mut(0).assign(&data.row(first));

        for i in 1..self.k {
            let mut distances: Vec<f64> = Vec::with_capacity(n);

            for j in 0..n {
                let point = data.row(j);
                let min_dist = (0..i)
                    .map(|c| Self::squared_distance(&point, &centroids.row(c)))
                    .fold(f64::MAX, f64::min);
                distances.push(min_dist);
            }

            // Sample proportional to squared distance
            let total: f64 = distances.iter().sum();
            if total == 0.0 {
                let idx = rng.gen_range(0..n);
                centroids.row_mut(i).assign(&data.row(idx));
                continue;
            }

            let threshold = rng.gen::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = 0;

            for (j, &dist) in distances.iter().enumerate() {
                cumsum += dist;
                if cumsum >= threshold {
                    selected = j;
                    break;
                }
            }

            centroids.row_mut(i).assign(&data.row(selected));
        }

        centroids
    }

    fn squared_distance(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
    }
}
