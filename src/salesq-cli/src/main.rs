use anyhow::{bail, Context, Result};
use clap::CommandFactory;
use clap_complete::generate;
use log::debug;
use salesq_cli::cli::{parse_args, Cli, CliConfig, Commands, ConfigCommands};
use salesq_cli::commands;
use salesq_cli::config::{create_default_config_file, validate_config, Config};

use std::io;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = parse_args();
    let cli_config = CliConfig::from(&args);
    setup_logging(cli_config.verbose, cli_config.quiet);

    let mut config = Config::load()?;
    if let Some(path) = &cli_config.config_file {
        config
            .merge_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
    }
    config.apply_cli(&cli_config);

    log::set_max_level(log_level(config.debug.verbosity, cli_config.quiet));
    debug!("Resolved configuration: {config:?}");

    handle_command(args.command.unwrap_or_default(), &config, cli_config.quiet)
}

fn handle_command(command: Commands, config: &Config, quiet: bool) -> Result<()> {
    match command {
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
        Commands::Config { command } => handle_config_command(command, config),
        Commands::Report { .. } => {
            let table = commands::load_table(config)?;
            println!("{}", commands::report(&table, config)?);
            Ok(())
        }
        Commands::Overview { .. } => {
            let table = commands::load_table(config)?;
            println!("{}", commands::overview(&table, config)?);
            Ok(())
        }
        Commands::Top { by, n, metric } => {
            let table = commands::load_table(config)?;
            println!("{}", commands::top(&table, config, &by, n, metric)?);
            Ok(())
        }
        Commands::Dashboard { view, compact } => {
            let table = commands::load_table(config)?;
            println!("{}", commands::dashboard(&table, config, view, compact)?);
            Ok(())
        }
        Commands::Export { .. } => {
            let table = commands::load_table(config)?;
            let files = commands::export(&table, config)?;
            if !quiet {
                println!("Saved {}", files.overview.display());
                println!("Saved {}", files.detail.display());
            }
            Ok(())
        }
    }
}

fn handle_config_command(command: ConfigCommands, config: &Config) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
            println!("{yaml}");
            Ok(())
        }
        ConfigCommands::Init { path, force } => {
            if path.exists() && !force {
                bail!("Config file already exists: {}", path.display());
            }
            create_default_config_file(&path)?;
            println!("Created config file: {}", path.display());
            Ok(())
        }
        ConfigCommands::Check { path } => {
            let check_config = Config::load_from_file(&path)?;
            validate_config(&check_config)?;
            println!("Config file is valid");
            Ok(())
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn log_level(verbosity: u8, quiet: bool) -> log::LevelFilter {
    if quiet {
        return log::LevelFilter::Error;
    }
    match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Start logging at the command-line level. The logger itself admits every
/// record; `log::set_max_level` narrows or widens it once config files and
/// `SALESQ_VERBOSITY` are merged.
fn setup_logging(verbosity: u8, quiet: bool) {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Trace)
        .init();
    log::set_max_level(log_level(verbosity, quiet));
}
