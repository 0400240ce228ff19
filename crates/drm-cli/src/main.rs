//! Depot dispatch station CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use drm_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use drm_cli::commands::{
    StationContext, run_clear, run_derive, run_mark, run_note, run_pull, run_push, run_report,
    run_scan, run_schedule, run_status, run_upload,
};
use drm_cli::config::load_config;
use drm_cli::logging::{LogConfig, LogFormat, init_logging};
use drm_cli::summary::{
    print_clear, print_derive, print_mark, print_pull, print_pushes, print_report,
    print_scan_tally, print_schedule, print_status, print_uploads,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config.as_deref());
    let ctx = StationContext::new(config)?;
    match cli.command {
        Command::Derive(args) => print_derive(&run_derive(&ctx, &args)?),
        Command::Upload(args) => print_uploads(&run_upload(&ctx, &args)?),
        Command::Push(args) => print_pushes(&run_push(&ctx, &args).await?),
        Command::Pull(args) => print_pull(run_pull(&ctx, &args).await?),
        Command::Scan(args) => {
            let tally = run_scan(&ctx, &args).await?;
            print_scan_tally(&tally);
            if tally.rejected > 0 {
                return Ok(2);
            }
        }
        Command::Mark(args) => print_mark(&run_mark(&ctx, &args).await?),
        Command::Note(args) => {
            if run_note(&ctx, &args)? {
                println!("Saved note for row {}.", args.row);
            } else {
                println!("Removed note from row {}.", args.row);
            }
        }
        Command::Status(args) => print_status(&run_status(&ctx, &args)?),
        Command::Schedule(args) => print_schedule(&run_schedule(&ctx, &args)?),
        Command::Report(args) => print_report(&run_report(&ctx, &args)?),
        Command::Clear(args) => print_clear(&run_clear(&ctx, &args).await?),
        Command::Config => print!("{}", ctx.config.to_toml()?),
    }
    Ok(0)
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
