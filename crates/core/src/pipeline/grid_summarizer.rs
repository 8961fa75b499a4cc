use std::path::{Path, PathBuf};

use crate::clustering::domain::face_corpus::FaceCorpus;
use crate::clustering::domain::grid_layout::GridBreakpoints;
use crate::clustering::domain::outlier_filter::OutlierReport;
use crate::imaging::domain::grid_composer::compose_grid;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;

pub fn grid_file_name(label: usize) -> String {
    format!("grid_{label}.jpg")
}

pub fn outlier_file_name(label: usize, sequence: usize) -> String {
    format!("outlier_grid_{label}_{sequence}.jpg")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SummaryOutput {
    pub written: Vec<PathBuf>,
    pub failures: Vec<WriteFailure>,
}

/// Writes one contact sheet per populated cluster and one single-thumbnail
/// image per outlier. A failed write is logged and the rest still go out.
pub struct GridSummarizer {
    writer: Box<dyn ImageWriter>,
    breakpoints: GridBreakpoints,
}

impl GridSummarizer {
    pub fn new(writer: Box<dyn ImageWriter>, breakpoints: GridBreakpoints) -> Self {
        Self {
            writer,
            breakpoints,
        }
    }

    pub fn summarize(
        &self,
        corpus: &FaceCorpus,
        report: &OutlierReport,
        output_dir: &Path,
    ) -> SummaryOutput {
        let mut output = SummaryOutput::default();
        let records = corpus.records();

        for (label, bucket) in report.buckets.iter().enumerate() {
            if bucket.is_empty() {
                log::debug!("Cluster {label} has no accepted faces, skipping its grid");
                continue;
            }
            let side = self.breakpoints.side_for(bucket.len());
            if bucket.len() > side * side {
                log::info!(
                    "Cluster {label} has {} faces, grid shows the first {}",
                    bucket.len(),
                    side * side
                );
            }
            let thumbnails: Vec<Frame> = bucket
                .iter()
                .take(side * side)
                .map(|&idx| records[idx].thumbnail.clone())
                .collect();
            let sheet = compose_grid(&thumbnails, side, corpus.thumbnail_size());
            self.write(&output_dir.join(grid_file_name(label)), &sheet, &mut output);
        }

        for outlier in &report.outliers {
            let path = output_dir.join(outlier_file_name(outlier.label, outlier.sequence));
            self.write(&path, &records[outlier.record_index].thumbnail, &mut output);
        }

        output
    }

    fn write(&self, path: &Path, frame: &Frame, output: &mut SummaryOutput) {
        match self.writer.write(path, frame) {
            Ok(()) => output.written.push(path.to_path_buf()),
            Err(e) => {
                log::warn!("Failed to write {}: {e}", path.display());
                output.failures.push(WriteFailure {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::domain::outlier_filter::Outlier;
    use crate::shared::embedding::FaceEmbedding;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    type Written = Arc<Mutex<Vec<(PathBuf, Frame)>>>;

    struct StubImageWriter {
        written: Written,
        fail_on: Option<String>,
    }

    impl ImageWriter for StubImageWriter {
        fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            let name = path.file_name().unwrap().to_string_lossy();
            if self.fail_on.as_deref() == Some(name.as_ref()) {
                return Err("disk full".into());
            }
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), frame.clone()));
            Ok(())
        }
    }

    // --- Helpers ---

    fn summarizer(fail_on: Option<&str>) -> (GridSummarizer, Written) {
        let written: Written = Arc::new(Mutex::new(Vec::new()));
        let writer = StubImageWriter {
            written: written.clone(),
            fail_on: fail_on.map(str::to_string),
        };
        (
            GridSummarizer::new(Box::new(writer), GridBreakpoints::default()),
            written,
        )
    }

    fn corpus(count: usize) -> FaceCorpus {
        FaceCorpus::from_entries(
            (0..count).map(|i| {
                (
                    FaceEmbedding::new(vec![i as f32]),
                    Frame::new(vec![(i as u8 + 1) * 10; 4 * 4 * 3], 4, 4, 3),
                    PathBuf::from(format!("{i}.jpg")),
                )
            }),
            4,
        )
        .unwrap()
    }

    fn names(written: &Written) -> Vec<String> {
        written
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    // --- Tests ---

    #[test]
    fn test_writes_grids_then_outliers() {
        let (summarizer, written) = summarizer(None);
        let report = OutlierReport {
            buckets: vec![vec![0, 1], vec![2]],
            outliers: vec![Outlier {
                record_index: 3,
                label: 1,
                sequence: 0,
                distance: 0.9,
            }],
        };
        let output = summarizer.summarize(&corpus(4), &report, Path::new("out"));

        assert_eq!(
            names(&written),
            vec!["grid_0.jpg", "grid_1.jpg", "outlier_grid_1_0.jpg"]
        );
        assert_eq!(output.written[0], PathBuf::from("out/grid_0.jpg"));
        assert!(output.failures.is_empty());
    }

    #[test]
    fn test_grid_size_follows_breakpoints() {
        let (summarizer, written) = summarizer(None);
        let report = OutlierReport {
            buckets: vec![(0..10).collect()],
            outliers: vec![],
        };
        summarizer.summarize(&corpus(10), &report, Path::new("out"));

        let written = written.lock().unwrap();
        assert_eq!(written[0].1.width(), 5 * 4);
        assert_eq!(written[0].1.height(), 5 * 4);
    }

    #[test]
    fn test_empty_bucket_writes_no_grid() {
        let (summarizer, written) = summarizer(None);
        let report = OutlierReport {
            buckets: vec![vec![], vec![1]],
            outliers: vec![Outlier {
                record_index: 0,
                label: 0,
                sequence: 0,
                distance: 1.0,
            }],
        };
        summarizer.summarize(&corpus(2), &report, Path::new("out"));
        assert_eq!(names(&written), vec!["grid_1.jpg", "outlier_grid_0_0.jpg"]);
    }

    #[test]
    fn test_outlier_image_is_its_thumbnail() {
        let (summarizer, written) = summarizer(None);
        let corpus = corpus(2);
        let report = OutlierReport {
            buckets: vec![vec![0]],
            outliers: vec![Outlier {
                record_index: 1,
                label: 0,
                sequence: 4,
                distance: 1.0,
            }],
        };
        summarizer.summarize(&corpus, &report, Path::new("out"));
        let written = written.lock().unwrap();
        assert_eq!(written[1].1, corpus.records()[1].thumbnail);
    }

    #[test]
    fn test_write_failure_is_recorded_and_skipped() {
        let (summarizer, written) = summarizer(Some("grid_0.jpg"));
        let report = OutlierReport {
            buckets: vec![vec![0], vec![1]],
            outliers: vec![],
        };
        let output = summarizer.summarize(&corpus(2), &report, Path::new("out"));

        assert_eq!(names(&written), vec!["grid_1.jpg"]);
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].path, PathBuf::from("out/grid_0.jpg"));
        assert_eq!(output.failures[0].reason, "disk full");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(grid_file_name(7), "grid_7.jpg");
        assert_eq!(outlier_file_name(2, 11), "outlier_grid_2_11.jpg");
    }
}
