//! Cluster-count estimation with DBSCAN.
//!
//! Density clustering needs no a-priori identity count and tolerates noise,
//! but leaves sparse points unlabeled. Its output only estimates how many
//! identities exist and where they sit; the hard assignment pass resolves
//! every point afterwards.

use crate::detection::domain::embedding_distance::EmbeddingDistance;
use crate::shared::embedding::FaceEmbedding;

/// Outcome of the density pass, positionally aligned with the input.
#[derive(Clone, Debug, PartialEq)]
pub struct EstimatorResult {
    /// Density cluster per embedding; `None` marks unassigned (noise) points.
    pub labels: Vec<Option<usize>>,
    /// Number of distinct density clusters.
    pub cluster_count: usize,
    /// First-encountered member of each cluster, in record order.
    pub seeds: Vec<FaceEmbedding>,
}

impl EstimatorResult {
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_none()).count()
    }
}

pub struct DensityEstimator<'a> {
    radius: f64,
    min_points: usize,
    distance: &'a dyn EmbeddingDistance,
}

impl<'a> DensityEstimator<'a> {
    /// `radius` is the neighborhood radius (ε) and `min_points` the minimum
    /// neighborhood size, counting the point itself, for a core point.
    pub fn new(radius: f64, min_points: usize, distance: &'a dyn EmbeddingDistance) -> Self {
        Self {
            radius,
            min_points,
            distance,
        }
    }

    pub fn estimate(&self, embeddings: &[&FaceEmbedding]) -> EstimatorResult {
        let labels = self.dbscan(embeddings);
        let (cluster_count, seeds) = first_seen_seeds(embeddings, &labels);
        EstimatorResult {
            labels,
            cluster_count,
            seeds,
        }
    }

    /// Clusters are numbered in discovery order while scanning by index;
    /// border points keep the first cluster that reaches them.
    fn dbscan(&self, embeddings: &[&FaceEmbedding]) -> Vec<Option<usize>> {
        let neighborhoods: Vec<Vec<usize>> = (0..embeddings.len())
            .map(|i| self.neighbors(embeddings, i))
            .collect();
        let is_core: Vec<bool> = neighborhoods
            .iter()
            .map(|n| n.len() >= self.min_points)
            .collect();

        let mut labels: Vec<Option<usize>> = vec![None; embeddings.len()];
        let mut next_label = 0;

        for start in 0..embeddings.len() {
            if labels[start].is_some() || !is_core[start] {
                continue;
            }
            labels[start] = Some(next_label);
            let mut stack = vec![start];
            while let Some(p) = stack.pop() {
                for &q in &neighborhoods[p] {
                    if labels[q].is_none() {
                        labels[q] = Some(next_label);
                        if is_core[q] {
                            stack.push(q);
                        }
                    }
                }
            }
            next_label += 1;
        }

        labels
    }

    fn neighbors(&self, embeddings: &[&FaceEmbedding], idx: usize) -> Vec<usize> {
        let point = embeddings[idx];
        embeddings
            .iter()
            .enumerate()
            .filter(|(_, other)| self.distance.distance(point, other) <= self.radius)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Picks one seed per density cluster: the first record carrying each label.
fn first_seen_seeds(
    embeddings: &[&FaceEmbedding],
    labels: &[Option<usize>],
) -> (usize, Vec<FaceEmbedding>) {
    let mut seen: Vec<usize> = Vec::new();
    let mut seeds = Vec::new();
    for (embedding, label) in embeddings.iter().zip(labels) {
        let Some(label) = label else {
            continue;
        };
        if seen.contains(label) {
            continue;
        }
        seen.push(*label);
        seeds.push((*embedding).clone());
    }
    (seen.len(), seeds)
}
