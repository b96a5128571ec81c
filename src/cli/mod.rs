mod cli_config;
mod report;

pub use cli_config::{Cli, Command};
pub use report::print_change_events;
