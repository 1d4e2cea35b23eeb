use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;

mod cli;
mod cmd_info;
mod cmd_run;
mod cmd_trace;
mod util;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    init_logger(&cli)?;

    match cli.cmd {
        cli::Cmd::Run {
            geometry,
            events,
            write_ratio,
            seed,
            json,
        } => cmd_run::exec(geometry, events, write_ratio, seed, json),

        cli::Cmd::Trace {
            geometry,
            file,
            json,
        } => cmd_trace::exec(geometry, file, json),

        cli::Cmd::Info { geometry, json } => cmd_info::exec(geometry, json),
    }
}

fn init_logger(cli: &cli::Cli) -> Result<()> {
    let level = match cli.log_level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        other => anyhow::bail!("unknown log level {:?}", other),
    };

    match &cli.log_file {
        Some(path) => {
            let f = File::create(path)
                .with_context(|| format!("create log file {}", path.display()))?;
            WriteLogger::init(level, Config::default(), f)?;
        }
        None => {
            TermLogger::init(
                level,
                Config::default(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            )?;
        }
    }
    Ok(())
}
