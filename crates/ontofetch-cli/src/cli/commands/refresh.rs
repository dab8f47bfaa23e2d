//! `ontofetch refresh` – fetch, convert, and vendor every configured source.

use anyhow::{bail, Result};
use ontofetch_core::config::RefreshConfig;
use ontofetch_core::convert::ToolConverter;
use ontofetch_core::fetch::CurlFetcher;
use ontofetch_core::refresh::{Refresher, SourceStatus, Step};
use ontofetch_core::source::ImportSource;
use std::path::Path;

pub fn run_refresh(
    cfg: &RefreshConfig,
    only: Option<&str>,
    import_dir: Option<&Path>,
) -> Result<()> {
    let sources: Vec<ImportSource> = match only {
        Some(name) => match cfg.sources.iter().find(|s| s.name == name) {
            Some(src) => vec![src.clone()],
            None => bail!("no configured source named {:?}", name),
        },
        None => cfg.sources.clone(),
    };

    let import_dir = import_dir.unwrap_or(&cfg.import_dir);
    let converter = ToolConverter::new(cfg.converter_path());
    let refresher = Refresher::new(import_dir, CurlFetcher, converter);

    let report = refresher.run(&sources, &mut |src, step| match step {
        Step::Download => println!("downloading {} from {}", src.name, src.url),
        Step::Convert => println!(
            "converting {} into {}",
            src.name,
            src.canonical_path(import_dir).display()
        ),
    })?;

    for outcome in &report.outcomes {
        match &outcome.status {
            SourceStatus::Refreshed { bytes } => {
                println!("  {}: refreshed ({} bytes fetched)", outcome.name, bytes)
            }
            SourceStatus::Failed(failure) => println!("  {}: {}", outcome.name, failure),
            SourceStatus::Skipped => println!("  {}: skipped", outcome.name),
        }
    }

    if let Some((name, failure)) = report.failure() {
        bail!("refresh stopped at source {:?}: {}", name, failure);
    }

    println!(
        "refreshed {} source(s) into {}",
        report.refreshed(),
        import_dir.display()
    );
    Ok(())
}
