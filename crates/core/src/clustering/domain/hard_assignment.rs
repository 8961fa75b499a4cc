//! Seeded k-means: every embedding gets exactly one identity label.
//!
//! Initialisation comes from the density pass seeds rather than random
//! restarts, so identical input always yields identical labels.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::clustering::domain::clustering_error::ClusteringError;
use crate::shared::embedding::FaceEmbedding;

/// Total coverage result: one label in `[0, centroids.len())` per embedding.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub labels: Vec<usize>,
    /// Mean of the members carrying each label.
    pub centroids: Vec<FaceEmbedding>,
    pub iterations: usize,
}

impl Assignment {
    pub fn cluster_count(&self) -> usize {
        self.centroids.len()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HardAssignment {
    max_iterations: usize,
    tolerance: f64,
}

impl HardAssignment {
    /// Lloyd iterations stop when labels are stable, after `max_iterations`,
    /// or when the summed squared centroid shift drops to `tolerance` times
    /// the mean per-feature variance of the input.
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
            tolerance,
        }
    }

    pub fn assign(
        &self,
        embeddings: &[&FaceEmbedding],
        cluster_count: usize,
        seeds: &[FaceEmbedding],
    ) -> Result<Assignment, ClusteringError> {
        if cluster_count == 0 {
            return Err(ClusteringError::NoClusters {
                face_count: embeddings.len(),
            });
        }
        if seeds.len() != cluster_count {
            return Err(ClusteringError::SeedCountMismatch {
                expected: cluster_count,
                found: seeds.len(),
            });
        }
        if cluster_count > embeddings.len() {
            return Err(ClusteringError::TooManyClusters {
                clusters: cluster_count,
                points: embeddings.len(),
            });
        }

        let data = to_matrix(embeddings.iter().copied());
        let mut centroids = to_matrix(seeds.iter());

        let threshold = self.tolerance * mean_feature_variance(&data);

        let mut labels = nearest_centroids(&data, &centroids);
        let mut iterations = 0;
        while iterations < self.max_iterations {
            iterations += 1;
            let updated = recompute_centroids(&data, &labels, &centroids);
            let shift = (&updated - &centroids).mapv(|v| v * v).sum();
            centroids = updated;

            let relabeled = nearest_centroids(&data, &centroids);
            let stable = relabeled == labels;
            labels = relabeled;
            if stable || shift <= threshold {
                break;
            }
        }
        // Labels were taken against the last centroids; report their means.
        let centroids = recompute_centroids(&data, &labels, &centroids);
        log::debug!("k-means converged after {iterations} iterations");

        Ok(Assignment {
            labels,
            centroids: centroids
                .rows()
                .into_iter()
                .map(|row| FaceEmbedding::new(row.iter().map(|&v| v as f32).collect()))
                .collect(),
            iterations,
        })
    }
}

fn to_matrix<'a, I>(embeddings: I) -> Array2<f64>
where
    I: Iterator<Item = &'a FaceEmbedding>,
{
    let rows: Vec<&FaceEmbedding> = embeddings.collect();
    let dim = rows.first().map(|e| e.dimension()).unwrap_or(0);
    Array2::from_shape_fn((rows.len(), dim), |(i, j)| rows[i].as_slice()[j] as f64)
}

fn mean_feature_variance(data: &Array2<f64>) -> f64 {
    data.var_axis(Axis(0), 0.0).mean().unwrap_or(0.0)
}

/// Index of the nearest centroid per row; ties go to the lowest index.
fn nearest_centroids(data: &Array2<f64>, centroids: &Array2<f64>) -> Vec<usize> {
    data.rows()
        .into_iter()
        .map(|point| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (label, centroid) in centroids.rows().into_iter().enumerate() {
                let dist = squared_distance(point, centroid);
                if dist < best_dist {
                    best = label;
                    best_dist = dist;
                }
            }
            best
        })
        .collect()
}

/// Member means; a cluster left without members keeps its previous centroid.
fn recompute_centroids(
    data: &Array2<f64>,
    labels: &[usize],
    previous: &Array2<f64>,
) -> Array2<f64> {
    let mut sums = Array2::<f64>::zeros(previous.raw_dim());
    let mut counts = vec![0usize; previous.nrows()];
    for (point, &label) in data.rows().into_iter().zip(labels) {
        let mut row = sums.row_mut(label);
        row += &point;
        counts[label] += 1;
    }

    for (label, mut row) in sums.axis_iter_mut(Axis(0)).enumerate() {
        if counts[label] == 0 {
            log::debug!("k-means cluster {label} is empty, keeping its centroid");
            row.assign(&previous.row(label));
        } else {
            row /= counts[label] as f64;
        }
    }
    sums
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let diff: Array1<f64> = &a - &b;
    diff.dot(&diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn points(coords: &[(f32, f32)]) -> Vec<FaceEmbedding> {
        coords
            .iter()
            .map(|&(x, y)| FaceEmbedding::new(vec![x, y]))
            .collect()
    }

    fn engine() -> HardAssignment {
        HardAssignment::new(300, 1e-4)
    }

    #[test]
    fn test_assigns_every_point_including_noise() {
        let owned = points(&[(0.0, 0.0), (0.2, 0.0), (5.0, 5.0), (5.2, 5.0), (1.5, 0.5)]);
        let refs: Vec<&FaceEmbedding> = owned.iter().collect();
        let seeds = vec![owned[0].clone(), owned[2].clone()];

        let result = engine().assign(&refs, 2, &seeds).unwrap();
        assert_eq!(result.labels.len(), refs.len());
        assert_eq!(result.labels, vec![0, 0, 1, 1, 0]);
        assert!(result.labels.iter().all(|&l| l < 2));
    }

    #[test]
    fn test_centroids_are_member_means() {
        let owned = points(&[(0.0, 0.0), (2.0, 0.0), (10.0, 10.0), (12.0, 10.0)]);
        let refs: Vec<&FaceEmbedding> = owned.iter().collect();
        let seeds = vec![owned[0].clone(), owned[2].clone()];

        let result = engine().assign(&refs, 2, &seeds).unwrap();
        assert_relative_eq!(result.centroids[0].as_slice()[0], 1.0);
        assert_relative_eq!(result.centroids[0].as_slice()[1], 0.0);
        assert_relative_eq!(result.centroids[1].as_slice()[0], 11.0);
        assert_relative_eq!(result.centroids[1].as_slice()[1], 10.0);
    }

    #[test]
    fn test_labels_follow_seed_order() {
        let owned = points(&[(0.0, 0.0), (10.0, 0.0)]);
        let refs: Vec<&FaceEmbedding> = owned.iter().collect();
        let seeds = vec![owned[1].clone(), owned[0].clone()];

        let result = engine().assign(&refs, 2, &seeds).unwrap();
        assert_eq!(result.labels, vec![1, 0]);
    }

    #[test]
    fn test_single_cluster_takes_everything() {
        let owned = points(&[(0.0, 0.0), (3.0, 0.0), (-7.0, 2.0)]);
        let refs: Vec<&FaceEmbedding> = owned.iter().collect();

        let result = engine().assign(&refs, 1, &owned[..1]).unwrap();
        assert_eq!(result.labels, vec![0, 0, 0]);
        assert_relative_eq!(result.centroids[0].as_slice()[0], -4.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_cluster_keeps_seed() {
        // Both seeds on the same side; the far seed never wins a point.
        let owned = points(&[(0.0, 0.0), (0.1, 0.0)]);
        let refs: Vec<&FaceEmbedding> = owned.iter().collect();
        let seeds = points(&[(0.05, 0.0), (100.0, 100.0)]);

        let result = engine().assign(&refs, 2, &seeds).unwrap();
        assert_eq!(result.labels, vec![0, 0]);
        assert_relative_eq!(result.centroids[1].as_slice()[0], 100.0);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let owned = points(&[(0.0, 0.0), (0.9, 0.1), (3.0, 3.0), (2.1, 2.4), (1.5, 1.5)]);
        let refs: Vec<&FaceEmbedding> = owned.iter().collect();
        let seeds = vec![owned[0].clone(), owned[2].clone()];
        assert_eq!(
            engine().assign(&refs, 2, &seeds).unwrap(),
            engine().assign(&refs, 2, &seeds).unwrap()
        );
    }

    #[test]
    fn test_zero_clusters_is_rejected() {
        let owned = points(&[(0.0, 0.0)]);
        let refs: Vec<&FaceEmbedding> = owned.iter().collect();
        assert_eq!(
            engine().assign(&refs, 0, &[]),
            Err(ClusteringError::NoClusters { face_count: 1 })
        );
    }

    #[test]
    fn test_seed_count_must_match() {
        let owned = points(&[(0.0, 0.0), (1.0, 0.0)]);
        let refs: Vec<&FaceEmbedding> = owned.iter().collect();
        assert_eq!(
            engine().assign(&refs, 2, &owned[..1]),
            Err(ClusteringError::SeedCountMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_more_clusters_than_points_is_rejected() {
        let owned = points(&[(0.0, 0.0)]);
        let refs: Vec<&FaceEmbedding> = owned.iter().collect();
        let seeds = points(&[(0.0, 0.0), (1.0, 1.0)]);
        assert!(matches!(
            engine().assign(&refs, 2, &seeds),
            Err(ClusteringError::TooManyClusters { .. })
        ));
    }

    #[test]
    fn test_small_scale_centroids_are_final_member_means() {
        let owned: Vec<FaceEmbedding> = [0.0, 0.001, 0.009, 0.010]
            .iter()
            .map(|&x| FaceEmbedding::new(vec![x]))
            .collect();
        let refs: Vec<&FaceEmbedding> = owned.iter().collect();
        let seeds = vec![owned[0].clone(), owned[1].clone()];

        let result = engine().assign(&refs, 2, &seeds).unwrap();
        assert_eq!(result.labels, vec![0, 0, 1, 1]);
        assert_relative_eq!(result.centroids[0].as_slice()[0], 0.0005, epsilon = 1e-7);
        assert_relative_eq!(result.centroids[1].as_slice()[0], 0.0095, epsilon = 1e-7);
    }

    #[test]
    fn test_early_stop_still_reports_member_means() {
        let owned = points(&[(0.0, 0.0), (1.0, 0.0), (4.0, 0.0), (5.0, 0.0)]);
        let refs: Vec<&FaceEmbedding> = owned.iter().collect();
        let seeds = vec![owned[0].clone(), owned[1].clone()];

        // Loose enough that the first shift already counts as converged.
        let result = HardAssignment::new(300, 10.0).assign(&refs, 2, &seeds).unwrap();
        assert_eq!(result.iterations, 1);
        for (label, centroid) in result.centroids.iter().enumerate() {
            let members: Vec<&FaceEmbedding> = owned
                .iter()
                .zip(&result.labels)
                .filter(|&(_, &l)| l == label)
                .map(|(e, _)| e)
                .collect();
            for dim in 0..2 {
                let mean = members.iter().map(|e| e.as_slice()[dim]).sum::<f32>()
                    / members.len() as f32;
                assert_relative_eq!(centroid.as_slice()[dim], mean, epsilon = 1e-6);
            }
        }
    }
}
