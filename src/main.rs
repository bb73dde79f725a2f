// src/main.rs

mod app_logic;
mod core;

use crate::app_logic::ui_constants::{APP_NAME, LOG_FILE_NAME};
use crate::app_logic::{ConsolePrompt, ShellHandler, run_shell};
use crate::core::path_resolver;
use crate::core::{
    AppConfig, ConfigManagerOperations, CoreConfigManager, CoreFileSystem, CorePlatformDetector,
    Navigator,
};
use clap::{Parser, Subcommand};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use time::macros::format_description;

#[derive(Debug, Parser)]
#[command(name = "note_explorer", about = "Browse, edit and export a folder of Markdown notes")]
struct Cli {
    /// Use this folder as the note root for this run only.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Log level for messages printed to the terminal.
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive shell (the default).
    Shell,
    /// Aggregate every note below the root into one document.
    Export {
        /// Write the document here instead of printing it.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remember a root folder in the configuration file.
    SetRoot { path: PathBuf },
    /// Forget the configured root folder.
    ClearRoot,
}

fn init_logging(term_level: LevelFilter) {
    let log_config = ConfigBuilder::new()
        .set_time_format_custom(format_description!(
            "[hour]:[minute]:[second].[subsecond digits:3]"
        ))
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    match path_resolver::get_base_app_config_local_dir(APP_NAME)
        .map(|dir| dir.join(LOG_FILE_NAME))
    {
        Some(log_path) => match File::create(&log_path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, log_config, file)),
            Err(e) => eprintln!("Could not create log file {}: {e}", log_path.display()),
        },
        None => eprintln!("No configuration directory available, logging to terminal only."),
    }

    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Failed to initialize logging: {e}");
    }
}

fn load_config(config_manager: &dyn ConfigManagerOperations) -> AppConfig {
    match config_manager.load_config(APP_NAME) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Main: Could not load configuration ({e}), using defaults.");
            AppConfig::default()
        }
    }
}

fn update_root_override(
    config_manager: &dyn ConfigManagerOperations,
    root: Option<PathBuf>,
) -> ExitCode {
    let mut config = load_config(config_manager);
    config.root_path_override = root;
    match config_manager.save_config(APP_NAME, &config) {
        Ok(()) => {
            match &config.root_path_override {
                Some(path) => println!("Root folder set to {}.", path.display()),
                None => println!("Root folder reset to the platform default."),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Could not save configuration: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Paths given to `export -o` are relative to where the command was run, not to the
/// note root.
fn resolve_output_path(output: PathBuf) -> io::Result<PathBuf> {
    if output.is_absolute() {
        return Ok(output);
    }
    Ok(std::env::current_dir()?.join(output))
}

fn start_navigator(
    cli_root: Option<PathBuf>,
    config_manager: &dyn ConfigManagerOperations,
) -> Navigator {
    let mut config = load_config(config_manager);
    if cli_root.is_some() {
        config.root_path_override = cli_root;
    }
    let root = path_resolver::resolve_root_with_detector(&CorePlatformDetector::new(), &config);
    if let Err(e) = path_resolver::ensure_root_exists(&root, &config) {
        log::error!("Main: Could not create root folder {root:?}: {e}");
    }
    log::info!("Main: Note root is {root:?}");
    Navigator::start(Arc::new(CoreFileSystem::new()), root)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);
    let config_manager = CoreConfigManager::new();

    match cli.command.unwrap_or(Command::Shell) {
        Command::SetRoot { path } => update_root_override(&config_manager, Some(path)),
        Command::ClearRoot => update_root_override(&config_manager, None),
        Command::Export { output } => {
            let output = match output.map(resolve_output_path).transpose() {
                Ok(output) => output,
                Err(e) => {
                    eprintln!("Could not determine the working directory: {e}");
                    return ExitCode::FAILURE;
                }
            };
            let mut navigator = start_navigator(cli.root, &config_manager);
            match output {
                Some(output) => match navigator.export_current(&output) {
                    Ok((target, summary)) => {
                        println!(
                            "Exported {} notes from {} folders to {}.",
                            summary.markdown_files,
                            summary.folders,
                            target.display()
                        );
                        ExitCode::SUCCESS
                    }
                    Err(e) => {
                        eprintln!("{e}");
                        ExitCode::FAILURE
                    }
                },
                None => {
                    let (document, _) = navigator.aggregate_current();
                    print!("{document}");
                    ExitCode::SUCCESS
                }
            }
        }
        Command::Shell => {
            let navigator = start_navigator(cli.root, &config_manager);
            let mut handler = ShellHandler::new(navigator, Arc::new(ConsolePrompt::new()));
            match run_shell(&mut handler, &mut io::stdout()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    log::error!("Main: Shell terminated with an I/O error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
