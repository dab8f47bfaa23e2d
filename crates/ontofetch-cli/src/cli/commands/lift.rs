//! `ontofetch lift` – lift the governance reference spreadsheet into a
//! Turtle module.

use anyhow::Result;
use ontofetch_core::lift::lift_spreadsheet;
use std::path::Path;

pub fn run_lift(input: &Path, sheet: &str, output: &Path) -> Result<()> {
    println!("lifting {} (sheet {:?})", input.display(), sheet);
    let profiles = lift_spreadsheet(input, sheet, output)?;
    println!("wrote {} ({} profiles)", output.display(), profiles);
    Ok(())
}
