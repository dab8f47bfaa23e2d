//! `ontofetch list` – show the configured import sources.

use ontofetch_core::config::RefreshConfig;

pub fn run_list(cfg: &RefreshConfig) {
    for src in &cfg.sources {
        match &src.accept {
            Some(accept) => println!("{}  {}  (Accept: {})", src.name, src.url, accept),
            None => println!("{}  {}", src.name, src.url),
        }
    }
}
