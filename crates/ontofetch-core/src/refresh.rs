//! The refresh run loop: fetch, convert, clean up, one source at a time.
//!
//! Strictly sequential and synchronous. The first failing step stops the
//! run; sources after it are never attempted. Sources refreshed before the
//! failure stay on disk, so a failed run can leave the import directory in
//! a mixed state. The per-source outcomes in [`RefreshReport`] make that
//! state visible to the caller.

use crate::convert::{ConvertError, Converter};
use crate::fetch::{FetchError, Fetcher};
use crate::source::ImportSource;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Which step of a source's refresh is about to run. Reported through the
/// progress callback so the CLI can print per-step messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Download,
    Convert,
}

/// Failure of one step while refreshing one source.
#[derive(Debug)]
pub enum StepFailure {
    /// The download failed (transport error or non-2xx status).
    Fetch(FetchError),
    /// The conversion tool failed. The download artifact is left behind.
    Convert(ConvertError),
    /// Removing the download artifact after a successful conversion failed.
    Cleanup(io::Error),
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepFailure::Fetch(e) => write!(f, "download failed: {}", e),
            StepFailure::Convert(e) => write!(f, "conversion failed: {}", e),
            StepFailure::Cleanup(e) => write!(f, "cleanup failed: {}", e),
        }
    }
}

impl std::error::Error for StepFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StepFailure::Fetch(e) => Some(e),
            StepFailure::Convert(e) => Some(e),
            StepFailure::Cleanup(e) => Some(e),
        }
    }
}

/// Failure before any source is attempted.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The conversion tool is unresolvable; no download is performed.
    #[error(transparent)]
    Config(#[from] ConvertError),
    /// The import directory could not be created.
    #[error("failed to create import directory {}: {source}", .path.display())]
    ImportDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// How one source fared in a run.
#[derive(Debug)]
pub enum SourceStatus {
    /// Canonical file written, download artifact removed.
    Refreshed { bytes: u64 },
    /// A step failed; the run stopped here.
    Failed(StepFailure),
    /// Never attempted because an earlier source failed.
    Skipped,
}

#[derive(Debug)]
pub struct SourceOutcome {
    pub name: String,
    pub status: SourceStatus,
}

/// Per-source outcomes of one run, in list order.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub outcomes: Vec<SourceOutcome>,
}

impl RefreshReport {
    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o.status, SourceStatus::Refreshed { .. }))
    }

    /// Number of sources actually refreshed.
    pub fn refreshed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SourceStatus::Refreshed { .. }))
            .count()
    }

    /// The failing source and its failure, if the run stopped early.
    pub fn failure(&self) -> Option<(&str, &StepFailure)> {
        self.outcomes.iter().find_map(|o| match &o.status {
            SourceStatus::Failed(failure) => Some((o.name.as_str(), failure)),
            _ => None,
        })
    }
}

/// Drives the fetch-then-convert refresh over a list of sources.
pub struct Refresher<F, C> {
    import_dir: PathBuf,
    fetcher: F,
    converter: C,
}

impl<F: Fetcher, C: Converter> Refresher<F, C> {
    pub fn new(import_dir: impl Into<PathBuf>, fetcher: F, converter: C) -> Self {
        Self {
            import_dir: import_dir.into(),
            fetcher,
            converter,
        }
    }

    pub fn import_dir(&self) -> &Path {
        &self.import_dir
    }

    /// Refresh `sources` in order. The converter is resolved before anything
    /// is written or fetched. `progress` is called before each download and
    /// before each conversion.
    pub fn run(
        &self,
        sources: &[ImportSource],
        progress: &mut dyn FnMut(&ImportSource, Step),
    ) -> Result<RefreshReport, RefreshError> {
        self.converter.check()?;

        fs::create_dir_all(&self.import_dir).map_err(|e| RefreshError::ImportDir {
            path: self.import_dir.clone(),
            source: e,
        })?;

        let mut report = RefreshReport::default();
        let mut stopped = false;
        for src in sources {
            if stopped {
                report.outcomes.push(SourceOutcome {
                    name: src.name.clone(),
                    status: SourceStatus::Skipped,
                });
                continue;
            }
            let status = match self.refresh_one(src, progress) {
                Ok(bytes) => SourceStatus::Refreshed { bytes },
                Err(failure) => {
                    tracing::error!(source = %src.name, "{}", failure);
                    stopped = true;
                    SourceStatus::Failed(failure)
                }
            };
            report.outcomes.push(SourceOutcome {
                name: src.name.clone(),
                status,
            });
        }
        Ok(report)
    }

    fn refresh_one(
        &self,
        src: &ImportSource,
        progress: &mut dyn FnMut(&ImportSource, Step),
    ) -> Result<u64, StepFailure> {
        let download = src.download_path(&self.import_dir);
        let canonical = src.canonical_path(&self.import_dir);

        progress(src, Step::Download);
        tracing::info!(source = %src.name, url = %src.url, "downloading");
        let bytes = self
            .fetcher
            .fetch(&src.url, src.accept.as_deref(), &download)
            .map_err(StepFailure::Fetch)?;

        progress(src, Step::Convert);
        tracing::info!(source = %src.name, output = %canonical.display(), "converting");
        // On conversion failure the download artifact stays behind; a later
        // successful run overwrites it and then removes it.
        self.converter
            .convert(&download, &canonical)
            .map_err(StepFailure::Convert)?;

        fs::remove_file(&download).map_err(StepFailure::Cleanup)?;
        tracing::info!(source = %src.name, bytes, file = %canonical.display(), "refreshed");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests;
