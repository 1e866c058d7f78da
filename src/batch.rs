//! Directory batch driver.
//!
//! Every recognized document in the input directory is processed
//! independently: a failure is recorded against that file and the batch
//! moves on to the next one.

use std::path::{Path, PathBuf};

use crate::config::BatchConfig;
use crate::document::DocumentBackend;
use crate::error::{RedactorError, RedactorResult};
use crate::pipeline::{DocumentPipeline, DocumentReport};

/// Result of processing one file of a batch.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub input: PathBuf,
    pub result: RedactorResult<DocumentReport>,
}

/// Summary of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<DocumentOutcome>,
    /// Entries without the recognized extension.
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &DocumentReport> {
        self.processed.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &RedactorError)> {
        self.processed
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.input.as_path(), e)))
    }

    /// Output files that were actually written.
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.succeeded().filter_map(|r| r.output.as_deref())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }
}

/// Derives the output file name for `file_name`.
///
/// The configured suffix is appended to the stem, after stripping an
/// existing copy of it so reprocessed outputs are not double-suffixed.
/// The suffix comparison ignores case.
pub fn output_file_name(file_name: &str, suffix: &str, extension: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    };

    let base = match stem.len().checked_sub(suffix.len()) {
        Some(cut)
            if !suffix.is_empty()
                && stem.is_char_boundary(cut)
                && stem[cut..].eq_ignore_ascii_case(suffix) =>
        {
            &stem[..cut]
        }
        _ => stem,
    };

    format!("{}{}.{}", base, suffix, extension)
}

/// True when `path` carries `extension`, ignoring case.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Runs a [`DocumentPipeline`] over a directory.
pub struct BatchRunner<B> {
    pipeline: DocumentPipeline<B>,
    config: BatchConfig,
}

impl<B: DocumentBackend> BatchRunner<B> {
    pub fn new(pipeline: DocumentPipeline<B>, config: BatchConfig) -> Self {
        Self { pipeline, config }
    }

    /// Processes the input directory in file-name order.
    ///
    /// Only failures to list the input directory or create the output
    /// directory abort the run; per-document failures are collected.
    pub fn run(&self) -> RedactorResult<BatchReport> {
        let input_dir = &self.config.input_dir;
        let output_dir = &self.config.output_dir;

        let entries = std::fs::read_dir(input_dir).map_err(|e| RedactorError::Io {
            path: input_dir.clone(),
            source: e,
        })?;

        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir).map_err(|e| RedactorError::Io {
                path: output_dir.clone(),
                source: e,
            })?;
            tracing::info!(dir = %output_dir.display(), "created output folder");
        }

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RedactorError::Io {
                path: input_dir.clone(),
                source: e,
            })?;
            paths.push(entry.path());
        }
        paths.sort();

        tracing::info!(
            from = %input_dir.display(),
            to = %output_dir.display(),
            "starting batch"
        );

        let mut report = BatchReport::default();
        for path in paths {
            if !path.is_file() || !has_extension(&path, &self.config.extension) {
                tracing::info!(file = %path.display(), "skipping non-document entry");
                report.skipped.push(path);
                continue;
            }

            let result = self.process_one(&path);
            if let Err(e) = &result {
                tracing::error!(file = %path.display(), error = %e, "failed to process document");
            }
            report.processed.push(DocumentOutcome {
                input: path,
                result,
            });
        }

        Ok(report)
    }

    fn process_one(&self, input: &Path) -> RedactorResult<DocumentReport> {
        let file_name = input
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RedactorError::InvalidInput {
                parameter: "input".to_string(),
                reason: "File name contains invalid UTF-8".to_string(),
            })?;

        let output = self.config.output_dir.join(output_file_name(
            file_name,
            &self.config.suffix,
            &self.config.extension.to_lowercase(),
        ));

        self.pipeline.process(input, &output)
    }
}
