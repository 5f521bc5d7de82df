use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::image_pipeline::{
    batch::{WorkHandler, WorkItem},
    common::error::{ConversionError, Result},
    config::ConversionConfig,
    conversions::timing::PipelineTimings,
    convert::{ConvertOptions, RgbImage, convert_raw},
    encode::{ImageWriter, StandardWriter},
    raw::{FileRawReader, RawBuffer, RawImageReader},
};

/// Load, convert, and encode for a single capture file.
///
/// The encoded image is built fully in memory; the output file is only
/// created once encoding succeeded.
pub struct RawToImagePipeline<R: RawImageReader, W: ImageWriter> {
    reader: R,
    writer: W,
    options: ConvertOptions,
    output_dir: Option<PathBuf>,
}

impl RawToImagePipeline<FileRawReader, StandardWriter> {
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            reader: FileRawReader,
            writer: StandardWriter::new(
                config.output_format,
                config.jpeg_quality,
                config.tiff_compression,
                config.tiff_predictor,
            ),
            options: config.convert_options(),
            output_dir: config.output_dir.clone(),
        }
    }
}

impl<R: RawImageReader, W: ImageWriter> RawToImagePipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, options: ConvertOptions, output_dir: Option<PathBuf>) -> Self {
        Self {
            reader,
            writer,
            options,
            output_dir,
        }
    }

    /// Where the output for `input` goes: its final extension replaced by the
    /// writer's, placed in the output directory when one is configured.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        output_path_for(input, self.output_dir.as_deref(), self.writer.extension())
    }

    /// Converts an in-memory frame and encodes it to `output`.
    pub fn convert(&self, raw: &RawBuffer, output: &mut dyn Write) -> Result<()> {
        let image = convert_raw(raw, self.options)?;
        self.writer.write_image(&image, output)
    }

    #[instrument(skip(self, item), fields(input = %item.path().display(), format = %item.format()))]
    pub fn convert_file_with_timings(&self, item: &WorkItem) -> Result<(PathBuf, PipelineTimings)> {
        let mut timings = PipelineTimings::new();
        let input = item.path();
        let output_path = self.output_path(input);
        if output_path == input {
            return Err(ConversionError::InvalidInput(format!(
                "output would overwrite input {}",
                input.display()
            )));
        }

        let raw = timings.time("read_raw", || {
            let _span = tracing::info_span!("read_raw", bytes = item.data_size()).entered();
            self.reader.read_raw(input, item.format(), item.width(), item.height())
        })?;

        let image: RgbImage = timings.time("convert", || {
            let _span = tracing::info_span!("convert", width = raw.width(), height = raw.height()).entered();
            convert_raw(&raw, self.options)
        })?;
        drop(raw);

        let encoded = timings.time("encode", || {
            let _span = tracing::info_span!("encode", extension = self.writer.extension()).entered();
            let mut buffer = Vec::new();
            self.writer.write_image(&image, &mut buffer).map(|()| buffer)
        })?;

        timings.time("write_output", || {
            let _span = tracing::info_span!("write_output", output = %output_path.display()).entered();
            write_output(&output_path, &encoded)
        })?;

        debug!(output = %output_path.display(), timings = %timings.summary(), "File converted");
        Ok((output_path, timings))
    }

    pub fn convert_file(&self, item: &WorkItem) -> Result<PathBuf> {
        self.convert_file_with_timings(item).map(|(path, _)| path)
    }
}

impl<R, W> WorkHandler for RawToImagePipeline<R, W>
where
    R: RawImageReader + Send + Sync + 'static,
    W: ImageWriter + Send + Sync + 'static,
{
    fn handle(&self, item: &WorkItem) -> Result<PathBuf> {
        self.convert_file(item)
    }
}

pub fn output_path_for(input: &Path, output_dir: Option<&Path>, extension: &str) -> PathBuf {
    match (output_dir, input.file_name()) {
        (Some(dir), Some(name)) => dir.join(name).with_extension(extension),
        _ => input.with_extension(extension),
    }
}

/// Writes the whole encoded image. A write that fails after the file was
/// opened removes it; a file that could not be opened is left untouched.
fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let output_error = |e: std::io::Error| ConversionError::OutputWriteError(format!("{}: {}", path.display(), e));

    let mut file = File::create(path).map_err(output_error)?;
    if let Err(e) = file.write_all(bytes).and_then(|()| file.sync_all()) {
        drop(file);
        let _ = std::fs::remove_file(path);
        return Err(output_error(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_output_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        std::fs::write(&path, b"previous run").unwrap();

        write_output(&path, b"encoded").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"encoded");
    }

    #[test]
    fn test_unopenable_output_is_left_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        std::fs::write(&path, b"previous run").unwrap();
        let mut permissions = std::fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(&path, permissions).unwrap();

        // Privileged users can open read-only files for writing.
        if std::fs::OpenOptions::new().write(true).open(&path).is_ok() {
            return;
        }

        let err = write_output(&path, b"encoded").unwrap_err();
        assert!(matches!(err, ConversionError::OutputWriteError(_)));
        assert_eq!(std::fs::read(&path).unwrap(), b"previous run");
    }

    #[test]
    fn test_missing_parent_fails_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("frame.jpg");

        let err = write_output(&path, b"encoded").unwrap_err();
        assert!(matches!(err, ConversionError::OutputWriteError(_)));
        assert!(!dir.path().join("absent").exists());
    }
}
