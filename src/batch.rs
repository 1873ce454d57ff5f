use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::DatasetError;
use crate::normalizer::Normalizer;
use crate::output::{output_path, write_dataset};
use crate::prompt::Prompter;
use crate::report::{Event, Reporter};
use crate::selector::ColumnSelector;
use crate::source::read_dataset;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// How the timestamp column is chosen in single-dataset mode.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectMode {
    Interactive,
    Auto,
    Column(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub column: String,
    pub rows_read: usize,
    pub rows_written: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub files_found: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub rows_read: usize,
    pub rows_written: usize,
    pub failures: Vec<Failure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub path: PathBuf,
    pub error: String,
}

/// Errors from single-dataset mode. Prompt I/O is kept apart from dataset
/// failures so callers can tell a broken terminal from a bad file.
#[derive(Debug, thiserror::Error)]
pub enum SingleError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("prompt failed: {0}")]
    Prompt(#[from] std::io::Error),
    #[error("no output folder selected")]
    NoOutputDir,
}

/// Every `.{extension}` file under `root`, recursively, in path order.
pub fn find_sources(root: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                warn!(%err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|x| x.to_str())
                .is_some_and(|x| x.eq_ignore_ascii_case(extension))
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Read, select, convert and write, one dataset at a time.
pub struct Pipeline<'a> {
    config: &'a Config,
    selector: ColumnSelector,
    normalizer: Normalizer,
    reporter: &'a dyn Reporter,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, reporter: &'a dyn Reporter) -> Result<Self, regex::Error> {
        Ok(Self {
            config,
            selector: ColumnSelector::new(config)?,
            normalizer: Normalizer::new(config),
            reporter,
        })
    }

    pub fn process_single(
        &self,
        input: &Path,
        out_dir: &Path,
        prompter: &mut dyn Prompter,
        mode: &SelectMode,
    ) -> Result<SingleReport, SingleError> {
        self.process_single_with(input, prompter, mode, |_| Ok(Some(out_dir.to_path_buf())))
    }

    /// Like [`Pipeline::process_single`], but the output folder is asked for
    /// only once a column has been chosen. `choose_out` returning `None` means
    /// the user gave no folder; nothing is written.
    pub fn process_single_with<F>(
        &self,
        input: &Path,
        prompter: &mut dyn Prompter,
        mode: &SelectMode,
        choose_out: F,
    ) -> Result<SingleReport, SingleError>
    where
        F: FnOnce(&mut dyn Prompter) -> std::io::Result<Option<PathBuf>>,
    {
        self.reporter.report(Event::DatasetStarted {
            path: input.to_path_buf(),
        });
        let result = self.single_inner(input, prompter, mode, choose_out);
        if let Err(err) = &result {
            self.reporter.report(Event::DatasetFailed {
                path: input.to_path_buf(),
                error: err.to_string(),
            });
        }
        result
    }

    fn single_inner<F>(
        &self,
        input: &Path,
        prompter: &mut dyn Prompter,
        mode: &SelectMode,
        choose_out: F,
    ) -> Result<SingleReport, SingleError>
    where
        F: FnOnce(&mut dyn Prompter) -> std::io::Result<Option<PathBuf>>,
    {
        let dataset = self.read(input)?;
        let rows_read = dataset.len();

        let column = match mode {
            SelectMode::Interactive => self.selector.select_timestamp_column(&dataset, prompter)?,
            SelectMode::Auto => self
                .selector
                .guess_timestamp_column(dataset.columns())
                .map(String::from),
            SelectMode::Column(name) => Some(name.clone()),
        }
        .ok_or(DatasetError::Selection)?;

        let out_dir = choose_out(prompter)?.ok_or(SingleError::NoOutputDir)?;
        let (output, rows_written) = self.convert_and_write(input, &out_dir, dataset, &column)?;
        Ok(SingleReport {
            input: input.to_path_buf(),
            output,
            column,
            rows_read,
            rows_written,
        })
    }

    /// Automatic mode over every matching file under `root`. A failing
    /// dataset is reported and counted, never fatal to the rest.
    pub fn process_bulk(&self, root: &Path, out_dir: &Path) -> BatchSummary {
        let sources = find_sources(root, &self.config.extension);
        let mut summary = BatchSummary {
            files_found: sources.len(),
            ..BatchSummary::default()
        };
        warn_on_name_collisions(&sources, out_dir, &self.config.output_suffix);

        for path in &sources {
            self.reporter.report(Event::DatasetStarted { path: path.clone() });
            match self.bulk_one(path, out_dir, &mut summary) {
                Ok(rows_written) => {
                    summary.succeeded += 1;
                    summary.rows_written += rows_written;
                }
                Err(err) => {
                    let error = err.to_string();
                    self.reporter.report(Event::DatasetFailed {
                        path: path.clone(),
                        error: error.clone(),
                    });
                    summary.failed += 1;
                    summary.failures.push(Failure {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }
        summary
    }

    fn bulk_one(
        &self,
        path: &Path,
        out_dir: &Path,
        summary: &mut BatchSummary,
    ) -> Result<usize, DatasetError> {
        let dataset = self.read(path)?;
        // counted even if the dataset fails further on
        summary.rows_read += dataset.len();

        let column = self
            .selector
            .guess_timestamp_column(dataset.columns())
            .map(String::from)
            .ok_or(DatasetError::Selection)?;

        let (_, rows_written) = self.convert_and_write(path, out_dir, dataset, &column)?;
        Ok(rows_written)
    }

    fn read(&self, path: &Path) -> Result<Dataset, DatasetError> {
        let source = read_dataset(path)?;
        self.reporter.report(Event::RowsRead {
            path: path.to_path_buf(),
            rows: source.dataset.len(),
            skipped: source.skipped,
        });
        Ok(source.dataset)
    }

    fn convert_and_write(
        &self,
        input: &Path,
        out_dir: &Path,
        dataset: Dataset,
        column: &str,
    ) -> Result<(PathBuf, usize), DatasetError> {
        self.reporter.report(Event::ColumnSelected {
            path: input.to_path_buf(),
            column: column.to_string(),
        });
        let (converted, stats) = self
            .normalizer
            .convert_timestamps(input, dataset, column, self.reporter)?;
        debug!(
            converted = stats.converted,
            empty = stats.empty,
            failed = stats.failed,
            "converted timestamps"
        );

        let output = output_path(input, out_dir, &self.config.output_suffix);
        let rows = write_dataset(&converted, &output)?;
        self.reporter.report(Event::DatasetWritten {
            path: input.to_path_buf(),
            output: output.clone(),
            rows,
        });
        Ok((output, rows))
    }
}

// Outputs are flat, so equal stems in different folders overwrite each other.
fn warn_on_name_collisions(sources: &[PathBuf], out_dir: &Path, suffix: &str) {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    for src in sources {
        let out = output_path(src, out_dir, suffix);
        if let Some(first) = seen.insert(out.clone(), src) {
            warn!(
                first = %first.display(),
                second = %src.display(),
                output = %out.display(),
                "output name collision, later file wins"
            );
        }
    }
}
