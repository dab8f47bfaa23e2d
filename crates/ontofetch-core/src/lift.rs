//! Lift the governance reference spreadsheet into a Turtle module.
//!
//! The spreadsheet is column-oriented: column 0 carries row labels (merged
//! cells, so blanks inherit the label above), and every later column is one
//! access profile. Lifting walks each profile column, buckets its cell
//! values under the row labels, and serializes the buckets as `sagegov:`
//! subjects with a fixed label-to-predicate mapping.
//!
//! Only the xlsx reading lives here; the grid-to-profiles and
//! profiles-to-Turtle stages are pure so they can be tested without a
//! workbook file.

mod turtle;

pub use turtle::build_turtle;

use calamine::{open_workbook, Data, Reader, Xlsx};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Worksheet parsed when none is named on the command line.
pub const DEFAULT_SHEET: &str = "Table";

/// Row labels that are section headings, not data.
const HEADER_ROWS: [&str; 2] = ["Access Prerequisites", "Request Submission and Approval Steps"];

/// Footnote text that appears as a cell value and must not become a fact.
const SKIP_VALUES: [&str; 1] = ["** with some exceptions at data contributors discretion"];

#[derive(Debug, Error)]
pub enum LiftError {
    #[error("failed to open workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        source: calamine::XlsxError,
    },
    #[error("worksheet {0:?} not found in workbook")]
    SheetMissing(String),
    #[error("no profiles found in the worksheet")]
    NoProfiles,
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// One profile column: its "Data Type" names plus label-to-values buckets
/// in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub names: Vec<String>,
    fields: Vec<(String, Vec<String>)>,
}

impl Profile {
    pub fn push(&mut self, label: &str, value: &str) {
        if label == "Data Type" {
            self.names.push(collapse_ws(value));
            return;
        }
        match self.fields.iter_mut().find(|(l, _)| l == label) {
            Some((_, values)) => values.push(value.to_string()),
            None => self
                .fields
                .push((label.to_string(), vec![value.to_string()])),
        }
    }

    pub fn values(&self, label: &str) -> &[String] {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.fields.is_empty()
    }
}

fn collapse_ws(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn skip_value(value: &str) -> bool {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, '\'' | '"'))
        .collect::<String>()
        .to_lowercase();
    SKIP_VALUES.contains(&stripped.trim())
}

/// Bucket each profile column of the raw cell grid under its forward-filled
/// row labels. Heading rows, empty cells, and footnote values are dropped.
pub fn collect_profiles(grid: &[Vec<Option<String>>]) -> Vec<Profile> {
    let width = grid.iter().map(|row| row.len()).max().unwrap_or(0);

    let mut row_labels: Vec<Option<String>> = Vec::with_capacity(grid.len());
    let mut last: Option<String> = None;
    for row in grid {
        if let Some(Some(label)) = row.first() {
            last = Some(label.clone());
        }
        row_labels.push(last.clone());
    }

    let mut profiles = Vec::new();
    for col in 1..width {
        let mut profile = Profile::default();
        for (row_idx, row) in grid.iter().enumerate() {
            let label = match row_labels[row_idx].as_deref() {
                Some(l) => l,
                None => continue,
            };
            if HEADER_ROWS.contains(&label) {
                continue;
            }
            let value = match row.get(col).and_then(|c| c.as_deref()) {
                Some(v) => v,
                None => continue,
            };
            if skip_value(value) {
                continue;
            }
            profile.push(label, value);
        }
        if !profile.is_empty() {
            profiles.push(profile);
        }
    }
    profiles
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read_grid(input: &Path, sheet: &str) -> Result<Vec<Vec<Option<String>>>, LiftError> {
    let mut workbook: Xlsx<_> = open_workbook(input).map_err(|e| LiftError::Workbook {
        path: input.to_path_buf(),
        source: e,
    })?;
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|_| LiftError::SheetMissing(sheet.to_string()))?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

/// Lift `input` (worksheet `sheet`) into a Turtle module at `output`.
/// Returns the number of profiles written.
pub fn lift_spreadsheet(input: &Path, sheet: &str, output: &Path) -> Result<usize, LiftError> {
    let grid = read_grid(input, sheet)?;
    let profiles = collect_profiles(&grid);
    if profiles.is_empty() {
        return Err(LiftError::NoProfiles);
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let module = build_turtle(&profiles, &input.display().to_string());
    fs::write(output, module)?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        profiles = profiles.len(),
        "lifted governance spreadsheet"
    );
    Ok(profiles.len())
}
