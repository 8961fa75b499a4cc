use crate::clustering::domain::hard_assignment::Assignment;
use crate::detection::domain::embedding_distance::EmbeddingDistance;
use crate::shared::embedding::FaceEmbedding;

/// A record whose embedding lies too far from its cluster centroid.
///
/// Its label still stands; only the summary output treats it separately.
#[derive(Clone, Debug, PartialEq)]
pub struct Outlier {
    pub record_index: usize,
    pub label: usize,
    /// Run-wide outlier counter in record order, starting at 0.
    pub sequence: usize,
    pub distance: f64,
}

/// Accepted record indices per label plus the rejected records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutlierReport {
    /// `buckets[label]` lists accepted record indices in record order.
    pub buckets: Vec<Vec<usize>>,
    pub outliers: Vec<Outlier>,
}

impl OutlierReport {
    pub fn accepted_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

/// Routes each record to its cluster bucket when
/// `distance(centroid, embedding) < threshold`, otherwise to the outliers.
pub struct OutlierFilter<'a> {
    threshold: f64,
    distance: &'a dyn EmbeddingDistance,
}

impl<'a> OutlierFilter<'a> {
    pub fn new(threshold: f64, distance: &'a dyn EmbeddingDistance) -> Self {
        Self {
            threshold,
            distance,
        }
    }

    pub fn filter(
        &self,
        embeddings: &[&FaceEmbedding],
        assignment: &Assignment,
    ) -> OutlierReport {
        let mut report = OutlierReport {
            buckets: vec![Vec::new(); assignment.cluster_count()],
            outliers: Vec::new(),
        };

        for (record_index, (embedding, &label)) in
            embeddings.iter().zip(&assignment.labels).enumerate()
        {
            let centroid = &assignment.centroids[label];
            let distance = self.distance.distance(centroid, embedding);
            if distance < self.threshold {
                report.buckets[label].push(record_index);
            } else {
                let sequence = report.outliers.len();
                log::info!(
                    "Clustered face too far from centroid ({label}_{sequence}, {distance:.4})"
                );
                report.outliers.push(Outlier {
                    record_index,
                    label,
                    sequence,
                    distance,
                });
            }
        }

        report
    }
}
