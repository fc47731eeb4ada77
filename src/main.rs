use prompt_enhancer::cli::handlers::{load_config, logging_config, parse_args, run};
use prompt_enhancer::cli::CliArgs;
use prompt_enhancer::rpc::mcp::McpServer;
use prompt_enhancer::rpc::ProtocolAdapter;
use prompt_enhancer::util::logging::{init_logging, LoggingConfig};
use prompt_enhancer::{EnhancerConfig, VERSION};

use std::env;
use std::ffi::OsString;
use tokio::io::{self, BufReader};
use tracing::{debug, error};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: failed to load .env file: {}", e);
        }
    }

    let argv: Vec<OsString> = env::args_os().collect();
    let exit_code = if argv.len() > 1 || atty::is(atty::Stream::Stdin) {
        run_cli(argv).await
    } else {
        run_protocol().await
    };

    std::process::exit(exit_code);
}

async fn run_cli(argv: Vec<OsString>) -> i32 {
    let args = match parse_args(argv) {
        Ok(args) => args,
        Err(code) => return code,
    };
    init_logging(logging_config(&args));

    debug!("prompt-enhancer v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    if args.mcp {
        run_mcp(&args).await
    } else {
        run(&args).await
    }
}

async fn run_mcp(args: &CliArgs) -> i32 {
    let config = match load_config(args) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let server = McpServer::from_config(&config);
    match server.serve(BufReader::new(io::stdin()), io::stdout()).await {
        Ok(()) => 0,
        Err(e) => {
            error!("MCP server I/O failure: {}", e);
            1
        }
    }
}

async fn run_protocol() -> i32 {
    init_logging(LoggingConfig::from_env());
    debug!("prompt-enhancer v{} starting in protocol mode", VERSION);

    let adapter = match EnhancerConfig::from_env().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => ProtocolAdapter::from_config(&config),
        Err(e) => {
            error!("Configuration error: {}", e);
            ProtocolAdapter::unavailable(e.to_string())
        }
    };

    match adapter.serve(io::stdin(), io::stdout()).await {
        Ok(()) => 0,
        Err(e) => {
            error!("Protocol I/O failure: {}", e);
            1
        }
    }
}
