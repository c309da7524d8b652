// src/main.rs
use anyhow::Context;
use asm_versions::args::Args;
use asm_versions::config::Config;
use asm_versions::presentation;
use clap::Parser;
use log::LevelFilter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.verbose);
    let config = Config::from(args);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    let result = asm_versions_engine::run(config)
        .with_context(|| format!("cannot scan '{}'", config.root.display()))?;
    presentation::print_results(&result, config).context("failed to write results")?;
    Ok(())
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("asm_versions", level)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}
