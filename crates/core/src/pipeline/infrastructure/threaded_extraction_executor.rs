use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, Sender};

use crate::extraction::domain::image_extractor::{ExtractedImage, ImageExtractor};
use crate::pipeline::extraction_executor::{
    ExtractionBatch, ExtractionExecutor, ExtractionFailure,
};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::constants::DEFAULT_WORKER_COUNT;

type JobResult = Result<Option<ExtractedImage>, String>;

/// Fixed pool of worker threads pulling `(index, path)` jobs from a shared
/// channel.
///
/// Layout: `main [enqueue] → workers [extract] → main [collect/reorder]`
///
/// The calling thread collects results, reports progress and puts them back
/// into submission order once every worker has exited. A panic inside the
/// extractor fails only the file being processed.
pub struct ThreadedExtractionExecutor {
    worker_count: usize,
}

impl ThreadedExtractionExecutor {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }
}

impl Default for ThreadedExtractionExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_WORKER_COUNT)
    }
}

impl ExtractionExecutor for ThreadedExtractionExecutor {
    fn execute(
        &self,
        extractor: &dyn ImageExtractor,
        paths: &[PathBuf],
        logger: &mut dyn PipelineLogger,
    ) -> ExtractionBatch {
        let total = paths.len();
        if total == 0 {
            return ExtractionBatch::default();
        }
        let workers = self.worker_count.min(total);

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &Path)>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, JobResult)>();
        for (index, path) in paths.iter().enumerate() {
            if job_tx.send((index, path.as_path())).is_err() {
                break;
            }
        }
        drop(job_tx);

        let mut slots: Vec<Option<JobResult>> = (0..total).map(|_| None).collect();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let jobs = job_rx.clone();
                    let results = result_tx.clone();
                    scope.spawn(move || run_worker(worker, extractor, jobs, results))
                })
                .collect();
            drop(result_tx);

            let mut done = 0;
            for (index, result) in result_rx.iter() {
                slots[index] = Some(result);
                done += 1;
                logger.progress(done, total);
            }

            for (worker, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    log::error!("Extraction worker {worker} panicked");
                }
            }
        });

        collect_in_order(paths, slots)
    }
}

fn run_worker(
    worker: usize,
    extractor: &dyn ImageExtractor,
    jobs: Receiver<(usize, &Path)>,
    results: Sender<(usize, JobResult)>,
) {
    for (index, path) in jobs {
        let result = match panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(path))) {
            Ok(extracted) => extracted.map_err(|e| e.to_string()),
            Err(payload) => Err(format!("extraction panicked: {}", panic_message(&*payload))),
        };
        if let Err(reason) = &result {
            log::warn!("Skipping {}: {reason}", path.display());
        }
        if results.send((index, result)).is_err() {
            break;
        }
    }
    log::debug!("Extraction worker {worker} finished");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn collect_in_order(paths: &[PathBuf], slots: Vec<Option<JobResult>>) -> ExtractionBatch {
    let mut batch = ExtractionBatch::default();
    for (path, slot) in paths.iter().zip(slots) {
        match slot {
            Some(Ok(Some(image))) => batch.images.push(image),
            Some(Ok(None)) => {}
            Some(Err(reason)) => batch.failures.push(ExtractionFailure::new(path, reason)),
            None => {
                log::warn!("Skipping {}: no result from extraction worker", path.display());
                batch
                    .failures
                    .push(ExtractionFailure::new(path, "extraction worker exited early"));
            }
        }
    }
    batch
}
