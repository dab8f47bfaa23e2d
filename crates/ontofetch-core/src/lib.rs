pub mod config;
pub mod logging;

pub mod convert;
pub mod fetch;
pub mod lift;
pub mod refresh;
pub mod source;
