//! CLI domain: parse, route, and output only.
//! No workflow logic; the route table dispatches to the coordinator.

mod output;
mod parse;
mod route;

pub use output::{format_status_text, map_error};
pub use parse::{Cli, Commands};
pub use route::RunContext;
