use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::image_pipeline::{
    batch::{
        discovery::discover_files,
        queue::QueueClosed,
        report::{BatchReport, FileFailure},
        work_item::WorkItem,
        worker_pool::{WorkHandler, WorkerPool},
    },
    common::error::{ConfigError, ConversionError, PipelineError},
    config::ConversionConfig,
    conversions::{RawToImagePipeline, Timer, output_path_for},
    encode::StandardWriter,
    raw::FileRawReader,
};

/// Runs one batch: discover, enqueue, drain, report.
///
/// A file's failure is recorded in the report and never stops the batch.
/// Only configuration problems and a failure to start the workers abort.
pub struct Coordinator<H: WorkHandler> {
    config: ConversionConfig,
    handler: Arc<H>,
}

impl Coordinator<RawToImagePipeline<FileRawReader, StandardWriter>> {
    pub fn new(config: ConversionConfig) -> Result<Self, ConfigError> {
        let handler = RawToImagePipeline::new(&config);
        Self::with_handler(config, handler)
    }
}

impl<H: WorkHandler> Coordinator<H> {
    pub fn with_handler(config: ConversionConfig, handler: H) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            handler: Arc::new(handler),
        })
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// A directory is scanned for matching files; any other path is converted
    /// as a single file regardless of its suffix.
    pub fn collect_inputs(&self, input: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        if !input.exists() {
            return Err(ConfigError::InputNotFound(input.to_path_buf()));
        }
        if input.is_dir() {
            let files = discover_files(input, self.config.format);
            info!(
                "Found {} {} file(s) in {}",
                files.len(),
                self.config.format.name(),
                input.display()
            );
            Ok(files)
        } else {
            Ok(vec![input.to_path_buf()])
        }
    }

    #[instrument(skip(self, input), fields(input = %input.display(), format = %self.config.format))]
    pub fn run(&self, input: &Path) -> Result<BatchReport, PipelineError> {
        let timer = Timer::start("batch");

        let files = self.collect_inputs(input)?;
        self.prepare_output_dir()?;

        if files.is_empty() {
            warn!("No {} input files found in {}", self.config.format.name(), input.display());
            return Ok(BatchReport {
                elapsed: timer.stop().1,
                ..BatchReport::default()
            });
        }

        let (files, collisions) = self.claim_outputs(files);

        let workers = self.config.worker_count().min(files.len());
        info!(workers, files = files.len(), "Starting conversion");

        let mut pool = WorkerPool::new(workers, self.config.queue_capacity, Arc::clone(&self.handler))
            .map_err(PipelineError::WorkerSpawn)?;

        let (format, width, height) = (self.config.format, self.config.width, self.config.height);
        for path in files {
            if let Err(QueueClosed(item)) = pool.submit(WorkItem::new(path, format, width, height)) {
                // Only reachable if the queue was closed under us.
                warn!(path = %item.path().display(), "Queue closed, remaining files not submitted");
                break;
            }
        }

        let mut report = pool.shutdown();
        report.add_failures(collisions);
        report.elapsed = timer.stop().1;
        report.log_summary();
        Ok(report)
    }

    /// Keeps the first input (in path order) for each output path. Later
    /// inputs mapping to the same output, e.g. `a.nv12` and `a.NV12`, fail
    /// instead of overwriting it.
    fn claim_outputs(&self, files: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<FileFailure>) {
        let extension = self.config.output_format.extension();
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::with_capacity(files.len());
        let mut accepted = Vec::with_capacity(files.len());
        let mut collisions = Vec::new();

        for path in files {
            let output = output_path_for(&path, self.config.output_dir.as_deref(), extension);
            match claimed.entry(output) {
                Entry::Occupied(entry) => {
                    warn!(
                        input = %path.display(),
                        output = %entry.key().display(),
                        "Output already claimed by {}",
                        entry.get().display()
                    );
                    let error = ConversionError::InvalidInput(format!(
                        "output {} is already produced from {}",
                        entry.key().display(),
                        entry.get().display()
                    ));
                    collisions.push(FileFailure { path, error });
                }
                Entry::Vacant(entry) => {
                    entry.insert(path.clone());
                    accepted.push(path);
                }
            }
        }
        (accepted, collisions)
    }

    fn prepare_output_dir(&self) -> Result<(), ConfigError> {
        let Some(dir) = &self.config.output_dir else {
            return Ok(());
        };
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::OutputDirUnavailable {
            path: dir.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::common::error::{ErrorKind, Result};
    use crate::image_pipeline::encode::OutputFormat;
    use crate::image_pipeline::raw::types::PixelFormat;

    fn nv12_config() -> ConversionConfig {
        ConversionConfig::builder()
            .format(PixelFormat::Nv12)
            .dimensions(4, 2)
            .workers(Some(2))
            .build()
    }

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        let config = ConversionConfig::builder().format(PixelFormat::Nv12).dimensions(3, 2).build();
        assert!(matches!(
            Coordinator::new(config),
            Err(ConfigError::OddDimensions { .. })
        ));
    }

    #[test]
    fn test_missing_input_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = Coordinator::new(nv12_config()).unwrap();
        let result = coordinator.run(&dir.path().join("nope"));
        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::InputNotFound(_)))
        ));
    }

    #[test]
    fn test_empty_directory_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hi").unwrap();

        let report = Coordinator::new(nv12_config()).unwrap().run(dir.path()).unwrap();
        assert!(report.no_files_found());
        assert!(report.is_failure());
    }

    #[test]
    fn test_single_file_mode_ignores_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("capture.bin");
        std::fs::write(&input, [128u8; 12]).unwrap();

        let report = Coordinator::new(nv12_config()).unwrap().run(&input).unwrap();
        assert_eq!((report.processed, report.failed), (1, 0));
        assert_eq!(report.outputs, vec![dir.path().join("capture.jpg")]);
    }

    #[test]
    fn test_partial_failure_continues_batch() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..6 {
            std::fs::write(dir.path().join(format!("f{i}.nv12")), b"").unwrap();
        }
        let handler = |item: &WorkItem| -> Result<PathBuf> {
            if item.path().ends_with("f2.nv12") {
                return Err(ConversionError::EncodeError("codec refused".into()));
            }
            Ok(item.path().with_extension("jpg"))
        };

        let coordinator = Coordinator::with_handler(nv12_config(), handler).unwrap();
        let report = coordinator.run(dir.path()).unwrap();

        assert_eq!((report.discovered, report.processed, report.failed), (6, 5, 1));
        assert_eq!(report.failures[0].kind(), ErrorKind::Encode);
        assert!(!report.is_failure());
    }

    #[test]
    fn test_inputs_sharing_an_output_are_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.NV12"), [128u8; 12]).unwrap();
        std::fs::write(dir.path().join("a.nv12"), [20u8; 12]).unwrap();
        std::fs::write(dir.path().join("b.nv12"), [128u8; 12]).unwrap();

        let report = Coordinator::new(nv12_config()).unwrap().run(dir.path()).unwrap();

        assert_eq!((report.discovered, report.processed, report.failed), (3, 2, 1));
        assert_eq!(report.outputs, vec![dir.path().join("a.jpg"), dir.path().join("b.jpg")]);
        assert_eq!(report.failures[0].path, dir.path().join("a.nv12"));
        assert_eq!(report.failures[0].kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_collisions_follow_the_output_format() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["x.raw", "x.raw10"] {
            std::fs::write(dir.path().join(name), [0u8; 16]).unwrap();
        }
        let config = ConversionConfig::builder()
            .format(PixelFormat::Bayer(crate::image_pipeline::raw::types::CfaPattern::Rggb))
            .dimensions(4, 2)
            .output_format(OutputFormat::Tiff)
            .build();

        let report = Coordinator::new(config).unwrap().run(dir.path()).unwrap();

        assert_eq!(report.outputs, vec![dir.path().join("x.tiff")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, dir.path().join("x.raw10"));
    }

    #[test]
    fn test_output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.nv12"), [128u8; 12]).unwrap();
        let out = dir.path().join("out").join("jpg");

        let config = ConversionConfig::builder()
            .format(PixelFormat::Nv12)
            .dimensions(4, 2)
            .output_dir(Some(out.clone()))
            .build();
        let report = Coordinator::new(config).unwrap().run(dir.path()).unwrap();

        assert_eq!(report.outputs, vec![out.join("a.jpg")]);
        assert!(out.join("a.jpg").is_file());
    }
}
