pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, OutputFormatArg};
pub use handlers::{logging_config, parse_args, run};
pub use output::{OutputFormat, OutputFormatter};
