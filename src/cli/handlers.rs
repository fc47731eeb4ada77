//! Command handlers for the console front end
//!
//! Every handler returns the process exit code. Rendered output goes to stdout,
//! errors and hints go to stderr.

use super::commands::CliArgs;
use super::output::{render_success_summary, OutputFormat, OutputFormatter};
use crate::config::{ConfigError, EnhancerConfig};
use crate::enhance::{EnhancementContext, Enhancer};
use crate::templates;
use crate::tracker::{compute_stats, CostLog};
use crate::util::logging::{parse_level, LoggingConfig};
use crate::vagueness;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::{debug, error, info, Level};

/// Parses the command line
///
/// A bare invocation prints the usage help to stdout and yields exit code 1.
/// `--help` and `--version` yield 0, parse errors yield 1.
pub fn parse_args<I, T>(argv: I) -> Result<CliArgs, i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    if argv.len() <= 1 {
        if let Err(e) = CliArgs::command().print_help() {
            eprintln!("Failed to print usage: {}", e);
        }
        println!();
        return Err(1);
    }

    CliArgs::try_parse_from(argv).map_err(|err| {
        if let Err(e) = err.print() {
            eprintln!("Failed to print usage: {}", e);
        }
        if err.use_stderr() {
            1
        } else {
            0
        }
    })
}

/// Logging level from the flags, falling back to the environment
pub fn logging_config(args: &CliArgs) -> LoggingConfig {
    if let Some(level) = &args.log_level {
        LoggingConfig::with_level(parse_level(level))
    } else if args.verbose {
        LoggingConfig::with_level(Level::DEBUG)
    } else if args.quiet {
        LoggingConfig::with_level(Level::ERROR)
    } else {
        LoggingConfig::from_env()
    }
}

/// Environment configuration with the command-line overrides applied
pub fn load_config(args: &CliArgs) -> Result<EnhancerConfig, ConfigError> {
    let mut config = EnhancerConfig::from_env()?;
    if let Some(model) = &args.model {
        debug!("Model overridden to: {}", model);
        config.model = model.clone();
    }
    if let Some(log_file) = &args.log_file {
        debug!("Cost log overridden to: {}", log_file.display());
        config.log_file = log_file.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Cost log path for the log-only commands; the rest of the configuration
/// is neither parsed nor validated
pub fn log_file(args: &CliArgs) -> PathBuf {
    args.log_file
        .clone()
        .unwrap_or_else(EnhancerConfig::log_file_from_env)
}

/// Dispatches to the handler selected by the flags
pub async fn run(args: &CliArgs) -> i32 {
    if args.stats {
        handle_stats(args)
    } else if args.clear_stats {
        handle_clear_stats(args)
    } else if args.list_templates {
        handle_list_templates(args)
    } else if args.check {
        handle_check(args)
    } else {
        handle_enhance(args).await
    }
}

fn config_or_exit(args: &CliArgs) -> Result<EnhancerConfig, i32> {
    load_config(args).map_err(|e| {
        error!("Configuration error: {}", e);
        eprintln!("Error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        1
    })
}

fn print_output(result: anyhow::Result<String>) -> i32 {
    match result {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            eprintln!("Error: failed to format output: {:#}", e);
            1
        }
    }
}

pub fn handle_list_templates(args: &CliArgs) -> i32 {
    let formatter = OutputFormatter::new(args.format.into());
    print_output(formatter.format_templates(&templates::list()))
}

pub fn handle_check(args: &CliArgs) -> i32 {
    let prompt = args.prompt_text();
    if prompt.trim().is_empty() {
        eprintln!("Error: --check needs a prompt");
        eprintln!("\nUsage: prompt-enhancer --check \"your prompt\"");
        return 1;
    }

    let report = vagueness::assess(&prompt);
    debug!("Vagueness report: {:?}", report);
    let formatter = OutputFormatter::new(args.format.into());
    print_output(formatter.format_check(&prompt, &report))
}

pub fn handle_stats(args: &CliArgs) -> i32 {
    let log = CostLog::new(log_file(args));
    let records = match log.load_all() {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to read cost log: {}", e);
            eprintln!("Error: {}", e);
            eprintln!(
                "\nHelp: Fix or remove the file, or reset it with: prompt-enhancer --clear-stats"
            );
            return 1;
        }
    };

    let stats = compute_stats(&records);
    let formatter = OutputFormatter::new(args.format.into());
    print_output(formatter.format_stats(&stats))
}

pub fn handle_clear_stats(args: &CliArgs) -> i32 {
    let log = CostLog::new(log_file(args));
    match log.clear() {
        Ok(()) => {
            info!("Cleared cost log {}", log.path().display());
            if !args.quiet {
                println!("🗑️  Statistics cleared ({})", log.path().display());
            }
            0
        }
        Err(e) => {
            error!("Failed to clear cost log: {}", e);
            eprintln!("Error: {}", e);
            1
        }
    }
}

pub async fn handle_enhance(args: &CliArgs) -> i32 {
    let prompt = args.prompt_text();
    if prompt.trim().is_empty() {
        eprintln!("Error: No prompt provided");
        eprintln!("\nUsage: prompt-enhancer \"your prompt\"");
        eprintln!("Run prompt-enhancer --help for all options.");
        return 1;
    }

    let config = match config_or_exit(args) {
        Ok(config) => config,
        Err(code) => return code,
    };
    debug!("Configuration:");
    let mut entries: Vec<_> = config.to_display_map().into_iter().collect();
    entries.sort();
    for (key, value) in entries {
        debug!("  {}: {}", key, value);
    }

    let enhancer = match Enhancer::from_config(&config) {
        Ok(enhancer) => enhancer,
        Err(e) => {
            error!("Failed to initialize enhancer: {}", e);
            eprintln!("{}", e.help_message());
            return 1;
        }
    };

    let context = EnhancementContext {
        template: args.template.clone(),
        goal: args.goal.clone(),
        experience_level: args.experience_level.clone(),
        domain: args.domain.clone(),
    };

    let format: OutputFormat = args.format.into();
    let markdown = format == OutputFormat::Markdown;
    if markdown && !args.quiet {
        eprintln!("🔄 Enhancing prompt...\n");
    }

    let result = match enhancer.enhance(&prompt, &context).await {
        Ok(result) => result,
        Err(e) => {
            error!("Enhancement failed: {}", e);
            eprintln!("{}", e.help_message());
            return 1;
        }
    };

    let code = print_output(OutputFormatter::new(format).format_result(&result));
    if code != 0 {
        return code;
    }

    if markdown && !args.quiet {
        if let Some(summary) = render_success_summary(&result) {
            println!("{}", "─".repeat(60));
            println!("{}", summary);
        }
    }
    0
}
