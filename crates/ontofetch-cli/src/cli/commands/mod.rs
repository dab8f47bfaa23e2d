//! CLI command handlers. Each command is in its own file.

mod check;
mod lift;
mod list;
mod refresh;

pub use check::run_check;
pub use lift::run_lift;
pub use list::run_list;
pub use refresh::run_refresh;
