pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use product_insight_core::config::{ConfigOverrides, LogFormat};

use crate::commands::analyze::AnalyzeOptions;

#[derive(Debug, Parser)]
#[command(
    name = "product-insight",
    about = "Product insight operator CLI",
    long_about = "Run catalog analysis over a JSON payload and inspect the effective configuration.",
    after_help = "Examples:\n  product-insight analyze --input payload.json --pretty\n  cat payload.json | product-insight analyze --envelope\n  product-insight config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Analyze a catalog payload and print the insight report or error envelope")]
    Analyze {
        #[arg(long, value_name = "PATH", help = "Payload file to read; `-` or omitted reads stdin")]
        input: Option<PathBuf>,
        #[arg(long, help = "Pretty-print the JSON output")]
        pretty: bool,
        #[arg(long, help = "Wrap the output as a {statusCode, body} host response")]
        envelope: bool,
        #[arg(long, value_name = "PATH", help = "Config file to load instead of the default lookup")]
        config: Option<PathBuf>,
        #[arg(long, value_name = "DAYS", help = "Days of order history sales are averaged over")]
        sales_window_days: Option<u32>,
        #[arg(long, value_name = "N", help = "Maximum hero products reported")]
        hero_limit: Option<usize>,
        #[arg(long, value_name = "N", help = "Maximum slow movers reported")]
        slow_mover_limit: Option<usize>,
        #[arg(long, value_name = "N", help = "Maximum seasonal products reported")]
        seasonal_limit: Option<usize>,
        #[arg(long, value_name = "LEVEL", help = "Log level: trace, debug, info, warn or error")]
        log_level: Option<String>,
        #[arg(long, value_name = "FORMAT", help = "Log format: compact, pretty or json")]
        log_format: Option<LogFormat>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Analyze {
            input,
            pretty,
            envelope,
            config,
            sales_window_days,
            hero_limit,
            slow_mover_limit,
            seasonal_limit,
            log_level,
            log_format,
        } => commands::analyze::run(&AnalyzeOptions {
            input,
            pretty,
            envelope,
            config_path: config,
            overrides: ConfigOverrides {
                sales_window_days,
                hero_limit,
                slow_mover_limit,
                seasonal_limit,
                log_level,
                log_format,
            },
        }),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
