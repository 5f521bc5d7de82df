//! Fixed-size pool of OS threads draining a shared `WorkQueue`.
//!
//! All workers are spawned in `new`. Each loops on `pop`, runs the handler,
//! and folds the outcome into a shared tally. A handler error or panic only
//! marks that item failed. `shutdown` (or dropping the pool) closes the queue,
//! lets the workers finish everything already queued, and joins them.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, warn};

use crate::image_pipeline::batch::queue::{QueueClosed, WorkQueue};
use crate::image_pipeline::batch::report::{BatchReport, FileFailure};
use crate::image_pipeline::batch::work_item::WorkItem;
use crate::image_pipeline::common::error::{ConversionError, Result};

/// Work run for each dequeued item. Returns the written output path.
pub trait WorkHandler: Send + Sync + 'static {
    fn handle(&self, item: &WorkItem) -> Result<PathBuf>;
}

impl<F> WorkHandler for F
where
    F: Fn(&WorkItem) -> Result<PathBuf> + Send + Sync + 'static,
{
    fn handle(&self, item: &WorkItem) -> Result<PathBuf> {
        self(item)
    }
}

#[derive(Default)]
struct Tally {
    outputs: Vec<PathBuf>,
    failures: Vec<FileFailure>,
}

pub struct WorkerPool {
    queue: Arc<WorkQueue<WorkItem>>,
    tally: Arc<Mutex<Tally>>,
    workers: Vec<JoinHandle<()>>,
    submitted: usize,
    started: Instant,
}

impl WorkerPool {
    /// Spawns `size` workers (at least one). A spawn failure joins the
    /// workers already started before returning the error.
    pub fn new<H: WorkHandler>(size: usize, queue_capacity: Option<usize>, handler: Arc<H>) -> std::io::Result<Self> {
        let size = size.max(1);
        let mut pool = Self {
            queue: Arc::new(WorkQueue::with_capacity(queue_capacity)),
            tally: Arc::new(Mutex::new(Tally::default())),
            workers: Vec::with_capacity(size),
            submitted: 0,
            started: Instant::now(),
        };

        for id in 0..size {
            let queue = Arc::clone(&pool.queue);
            let tally = Arc::clone(&pool.tally);
            let handler = Arc::clone(&handler);
            let handle = thread::Builder::new()
                .name(format!("rawconv-worker-{id}"))
                .spawn(move || worker_loop(id, &queue, handler.as_ref(), &tally))?;
            pool.workers.push(handle);
        }

        debug!(workers = size, capacity = ?pool.queue.capacity(), "Worker pool started");
        Ok(pool)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queues an item. Blocks while a bounded queue is full.
    pub fn submit(&mut self, item: WorkItem) -> std::result::Result<(), QueueClosed<WorkItem>> {
        self.queue.push(item)?;
        self.submitted += 1;
        Ok(())
    }

    /// Drains the queue, joins every worker, and returns the tally.
    pub fn shutdown(mut self) -> BatchReport {
        self.join_workers();

        let tally = std::mem::take(&mut *self.tally.lock().unwrap_or_else(PoisonError::into_inner));
        let mut outputs = tally.outputs;
        let mut failures = tally.failures;
        outputs.sort();
        failures.sort_by(|a, b| a.path.cmp(&b.path));

        BatchReport {
            discovered: self.submitted,
            processed: outputs.len(),
            failed: failures.len(),
            outputs,
            failures,
            elapsed: self.started.elapsed(),
        }
    }

    fn join_workers(&mut self) {
        self.queue.close();
        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                error!(worker = %name, "Worker thread panicked outside a task");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.join_workers();
        }
    }
}

fn worker_loop<H: WorkHandler + ?Sized>(id: usize, queue: &WorkQueue<WorkItem>, handler: &H, tally: &Mutex<Tally>) {
    let _span = tracing::debug_span!("worker", id).entered();

    while let Some(item) = queue.pop() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&item)))
            .unwrap_or_else(|payload| Err(ConversionError::WorkerPanic(panic_message(payload.as_ref()))));

        let mut tally = tally.lock().unwrap_or_else(PoisonError::into_inner);
        match outcome {
            Ok(output) => {
                debug!(input = %item.path().display(), output = %output.display(), "Converted");
                tally.outputs.push(output);
            }
            Err(error) => {
                warn!(input = %item.path().display(), kind = %error.kind(), "Conversion failed: {}", error);
                tally.failures.push(FileFailure {
                    path: item.path().to_path_buf(),
                    error,
                });
            }
        }
    }

    debug!("Queue closed and drained, worker exiting");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::common::error::ErrorKind;
    use crate::image_pipeline::raw::types::PixelFormat;
    use std::collections::HashMap;

    fn item(i: usize) -> WorkItem {
        WorkItem::new(format!("frame_{i:04}.nv12"), PixelFormat::Nv12, 4, 2)
    }

    /// Records how many times each path was handled.
    fn counting_handler() -> (Arc<Mutex<HashMap<PathBuf, usize>>>, impl WorkHandler) {
        let seen = Arc::new(Mutex::new(HashMap::new()));
        let handler = {
            let seen = Arc::clone(&seen);
            move |item: &WorkItem| -> Result<PathBuf> {
                *seen.lock().unwrap().entry(item.path().to_path_buf()).or_insert(0) += 1;
                Ok(item.path().with_extension("jpg"))
            }
        };
        (seen, handler)
    }

    #[test]
    fn test_each_item_processed_exactly_once() {
        let workers = 4;
        for count in [0, 1, workers, 10 * workers] {
            let (seen, handler) = counting_handler();
            let mut pool = WorkerPool::new(workers, None, Arc::new(handler)).unwrap();
            assert_eq!(pool.size(), workers);

            for i in 0..count {
                pool.submit(item(i)).unwrap();
            }
            let report = pool.shutdown();

            assert_eq!(report.discovered, count);
            assert_eq!(report.processed, count);
            assert_eq!(report.failed, 0);
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), count);
            assert!(seen.values().all(|&n| n == 1));
        }
    }

    #[test]
    fn test_shutdown_with_empty_queue_completes() {
        let (_, handler) = counting_handler();
        let pool = WorkerPool::new(8, None, Arc::new(handler)).unwrap();
        let report = pool.shutdown();
        assert_eq!(report.discovered, 0);
        assert!(report.no_files_found());
    }

    #[test]
    fn test_drop_joins_workers_after_draining() {
        let (seen, handler) = counting_handler();
        {
            let mut pool = WorkerPool::new(2, None, Arc::new(handler)).unwrap();
            for i in 0..20 {
                pool.submit(item(i)).unwrap();
            }
        }
        assert_eq!(seen.lock().unwrap().len(), 20);
    }

    #[test]
    fn test_failures_and_panics_do_not_stop_the_pool() {
        let handler = |item: &WorkItem| -> Result<PathBuf> {
            let name = item.path().to_string_lossy().into_owned();
            if name.contains("0003") {
                panic!("decoder exploded");
            }
            if name.contains("0005") {
                return Err(ConversionError::InvalidInput("bad frame".into()));
            }
            Ok(item.path().with_extension("jpg"))
        };
        let mut pool = WorkerPool::new(2, None, Arc::new(handler)).unwrap();
        for i in 0..10 {
            pool.submit(item(i)).unwrap();
        }
        let report = pool.shutdown();

        assert_eq!(report.processed, 8);
        assert_eq!(report.failed, 2);
        assert_eq!(report.failures[0].kind(), ErrorKind::Internal);
        assert!(report.failures[0].error.to_string().contains("decoder exploded"));
        assert_eq!(report.failures[1].kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_bounded_queue_processes_everything() {
        let (seen, handler) = counting_handler();
        let mut pool = WorkerPool::new(3, Some(2), Arc::new(handler)).unwrap();
        for i in 0..50 {
            pool.submit(item(i)).unwrap();
        }
        let report = pool.shutdown();
        assert_eq!(report.processed, 50);
        assert_eq!(seen.lock().unwrap().len(), 50);
    }

    #[test]
    fn test_outputs_are_sorted() {
        let (_, handler) = counting_handler();
        let mut pool = WorkerPool::new(4, None, Arc::new(handler)).unwrap();
        for i in (0..12).rev() {
            pool.submit(item(i)).unwrap();
        }
        let report = pool.shutdown();
        let mut sorted = report.outputs.clone();
        sorted.sort();
        assert_eq!(report.outputs, sorted);
    }
}
