//! `ontofetch check` – verify the conversion tool resolves, without any
//! network activity.

use anyhow::Result;
use ontofetch_core::config::RefreshConfig;
use ontofetch_core::convert::{Converter, ToolConverter};

pub fn run_check(cfg: &RefreshConfig) -> Result<()> {
    let converter = ToolConverter::new(cfg.converter_path());
    converter.check()?;
    println!("conversion tool ok: {}", converter.tool().display());
    Ok(())
}
