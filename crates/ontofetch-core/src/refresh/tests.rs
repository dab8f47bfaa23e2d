//! Refresh-loop tests with fake fetcher/converter (no network, no subprocess).

use super::*;
use crate::convert::{ConvertError, Converter};
use crate::fetch::{FetchError, Fetcher};
use crate::source::ImportSource;
use std::cell::{Cell, RefCell};
use std::path::Path;

fn src(name: &str, url: &str) -> ImportSource {
    ImportSource {
        name: name.to_string(),
        url: url.to_string(),
        accept: None,
    }
}

/// Writes a deterministic body per URL; optionally fails URLs containing a
/// marker with a fixed HTTP status. Counts calls and records accept headers.
struct FakeFetcher {
    calls: Cell<usize>,
    accepts: RefCell<Vec<Option<String>>>,
    fail_url_containing: Option<(&'static str, u32)>,
}

impl FakeFetcher {
    fn ok() -> Self {
        Self {
            calls: Cell::new(0),
            accepts: RefCell::new(Vec::new()),
            fail_url_containing: None,
        }
    }

    fn failing_on(marker: &'static str, code: u32) -> Self {
        Self {
            fail_url_containing: Some((marker, code)),
            ..Self::ok()
        }
    }

    fn body_for(url: &str) -> Vec<u8> {
        format!("# fetched from {}\n", url).into_bytes()
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &str, accept: Option<&str>, dest: &Path) -> Result<u64, FetchError> {
        self.calls.set(self.calls.get() + 1);
        self.accepts.borrow_mut().push(accept.map(str::to_string));
        if let Some((marker, code)) = self.fail_url_containing {
            if url.contains(marker) {
                return Err(FetchError::Http {
                    url: url.to_string(),
                    code,
                });
            }
        }
        let body = Self::body_for(url);
        std::fs::write(dest, &body).map_err(FetchError::Io)?;
        Ok(body.len() as u64)
    }
}

/// Identity converter: copies the download artifact to the output path.
struct CopyConverter;

impl Converter for CopyConverter {
    fn check(&self) -> Result<(), ConvertError> {
        Ok(())
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        std::fs::copy(input, output).map_err(|e| ConvertError::Spawn {
            tool: input.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }
}

/// Converter whose tool cannot be resolved.
struct MissingConverter;

impl Converter for MissingConverter {
    fn check(&self) -> Result<(), ConvertError> {
        Err(ConvertError::ToolMissing("/nonexistent/tool".into()))
    }

    fn convert(&self, _input: &Path, _output: &Path) -> Result<(), ConvertError> {
        panic!("convert called after failed check");
    }
}

/// Converter that fails on inputs whose file name contains a marker.
struct FailingConverter {
    fail_input_containing: &'static str,
}

impl Converter for FailingConverter {
    fn check(&self) -> Result<(), ConvertError> {
        Ok(())
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        if input.to_string_lossy().contains(self.fail_input_containing) {
            return Err(ConvertError::Failed {
                tool: "/fake/tool".into(),
                status: "exited with status 1".to_string(),
                stderr: "malformed input".to_string(),
            });
        }
        CopyConverter.convert(input, output)
    }
}

fn no_progress() -> impl FnMut(&ImportSource, Step) {
    |_, _| {}
}

#[test]
fn full_success_leaves_one_canonical_file_per_source_and_no_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let imports = dir.path().join("imports");
    let sources = vec![
        src("duo", "https://example.org/duo.owl"),
        src("prov", "https://example.org/prov-o"),
    ];

    let refresher = Refresher::new(&imports, FakeFetcher::ok(), CopyConverter);
    let report = refresher.run(&sources, &mut no_progress()).unwrap();

    assert!(report.is_success());
    assert_eq!(report.refreshed(), 2);
    assert!(report.failure().is_none());

    assert_eq!(
        std::fs::read(imports.join("duo.ttl")).unwrap(),
        FakeFetcher::body_for("https://example.org/duo.owl")
    );
    assert_eq!(
        std::fs::read(imports.join("prov.ttl")).unwrap(),
        FakeFetcher::body_for("https://example.org/prov-o")
    );
    assert!(!imports.join("duo.download").exists());
    assert!(!imports.join("prov.download").exists());
}

#[test]
fn progress_reports_download_then_convert_per_source_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let sources = vec![
        src("duo", "https://example.org/duo.owl"),
        src("prov", "https://example.org/prov-o"),
    ];

    let refresher = Refresher::new(dir.path().join("imports"), FakeFetcher::ok(), CopyConverter);
    let mut events: Vec<(String, Step)> = Vec::new();
    refresher
        .run(&sources, &mut |s, step| events.push((s.name.clone(), step)))
        .unwrap();

    let expected = [
        ("duo", Step::Download),
        ("duo", Step::Convert),
        ("prov", Step::Download),
        ("prov", Step::Convert),
    ];
    assert_eq!(events.len(), expected.len());
    for ((name, step), (exp_name, exp_step)) in events.iter().zip(expected) {
        assert_eq!(name, exp_name);
        assert_eq!(*step, exp_step);
    }
}

#[test]
fn accept_header_is_forwarded_per_source() {
    let dir = tempfile::tempdir().unwrap();
    let sources = vec![
        src("duo", "https://example.org/duo.owl"),
        ImportSource {
            name: "prov".to_string(),
            url: "https://example.org/prov-o".to_string(),
            accept: Some("text/turtle".to_string()),
        },
    ];

    let fetcher = FakeFetcher::ok();
    let refresher = Refresher::new(dir.path().join("imports"), fetcher, CopyConverter);
    refresher.run(&sources, &mut no_progress()).unwrap();

    let accepts = refresher.fetcher.accepts.borrow();
    assert_eq!(accepts.as_slice(), [None, Some("text/turtle".to_string())]);
}

#[test]
fn missing_converter_fails_before_any_fetch_or_write() {
    let dir = tempfile::tempdir().unwrap();
    let imports = dir.path().join("imports");
    let sources = vec![src("duo", "https://example.org/duo.owl")];

    let fetcher = FakeFetcher::ok();
    let refresher = Refresher::new(&imports, fetcher, MissingConverter);
    let err = refresher.run(&sources, &mut no_progress()).unwrap_err();

    assert!(matches!(
        err,
        RefreshError::Config(ConvertError::ToolMissing(_))
    ));
    assert_eq!(refresher.fetcher.calls.get(), 0);
    assert!(!imports.exists());
}

#[test]
fn failed_fetch_stops_the_run_and_skips_remaining_sources() {
    let dir = tempfile::tempdir().unwrap();
    let imports = dir.path().join("imports");
    let sources = vec![
        src("duo", "https://example.org/duo.owl"),
        src("prov", "https://example.org/prov-o"),
        src("dcterms", "https://example.org/dcterms"),
    ];

    let fetcher = FakeFetcher::failing_on("prov-o", 503);
    let refresher = Refresher::new(&imports, fetcher, CopyConverter);
    let report = refresher.run(&sources, &mut no_progress()).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.refreshed(), 1);
    // Third source is never fetched.
    assert_eq!(refresher.fetcher.calls.get(), 2);

    assert!(imports.join("duo.ttl").exists());
    assert!(!imports.join("prov.ttl").exists());
    assert!(!imports.join("dcterms.ttl").exists());

    let (name, failure) = report.failure().unwrap();
    assert_eq!(name, "prov");
    match failure {
        StepFailure::Fetch(FetchError::Http { code, .. }) => assert_eq!(*code, 503),
        other => panic!("expected HTTP failure, got {:?}", other),
    }
    assert!(matches!(report.outcomes[2].status, SourceStatus::Skipped));
}

#[test]
fn two_consecutive_runs_leave_no_stale_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let imports = dir.path().join("imports");
    let sources = vec![
        src("duo", "https://example.org/duo.owl"),
        src("prov", "https://example.org/prov-o"),
    ];

    for _ in 0..2 {
        let refresher = Refresher::new(&imports, FakeFetcher::ok(), CopyConverter);
        let report = refresher.run(&sources, &mut no_progress()).unwrap();
        assert!(report.is_success());
        assert!(!imports.join("duo.download").exists());
        assert!(!imports.join("prov.download").exists());
    }
}

#[test]
fn failed_conversion_keeps_the_download_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let imports = dir.path().join("imports");
    let sources = vec![src("duo", "https://example.org/duo.owl")];

    let converter = FailingConverter {
        fail_input_containing: "duo.download",
    };
    let refresher = Refresher::new(&imports, FakeFetcher::ok(), converter);
    let report = refresher.run(&sources, &mut no_progress()).unwrap();

    assert!(!report.is_success());
    // Current behavior: a failed conversion does not clean up its input.
    assert!(imports.join("duo.download").exists());
    assert!(!imports.join("duo.ttl").exists());
    match report.failure() {
        Some(("duo", StepFailure::Convert(ConvertError::Failed { .. }))) => {}
        other => panic!("expected conversion failure, got {:?}", other),
    }
}

#[test]
fn earlier_sources_are_not_rolled_back_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let imports = dir.path().join("imports");
    let sources = vec![
        src("duo", "https://example.org/duo.owl"),
        src("prov", "https://example.org/prov-o"),
    ];

    let fetcher = FakeFetcher::failing_on("prov-o", 500);
    let refresher = Refresher::new(&imports, fetcher, CopyConverter);
    let report = refresher.run(&sources, &mut no_progress()).unwrap();

    assert!(!report.is_success());
    // duo stays refreshed even though the run as a whole failed.
    assert!(imports.join("duo.ttl").exists());
}
