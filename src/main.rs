// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::app_controller::{Controller, WorkItem};
use crate::file_utils::FileManager;

mod app_config;
mod app_controller;
mod caption_processor;
mod errors;
mod file_utils;
mod media_utils;
mod timeline;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Cut a video down to its caption spans and rebase the captions (default command)
    #[command(alias = "cut")]
    Cut(CutArgs),

    /// Generate shell completions for shortsmith
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct CutArgs {
    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Caption table for a single video (defaults to <video stem>.csv)
    #[arg(short = 'c', long)]
    captions: Option<PathBuf>,

    /// Directory for the cut video and rebased caption table
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// shortsmith - highlight clip cutter
///
/// Cuts a long-form video down to the spans covered by a caption table and
/// rewrites the caption timestamps so they are valid against the cut output.
#[derive(Parser, Debug)]
#[command(name = "shortsmith")]
#[command(version = "0.3.0")]
#[command(about = "Cut videos to caption spans and rebase caption timing")]
#[command(long_about = "shortsmith takes a video plus a text,startMs,endMs caption table, merges the
caption time ranges into a minimal cut list, extracts and concatenates the
segments losslessly with ffmpeg, and writes a rebased caption table whose
timestamps match the cut output's own timeline.

EXAMPLES:
    shortsmith talk.mp4                          # Uses talk.csv next to the video
    shortsmith talk.mp4 -c picked_lines.csv      # Explicit caption table
    shortsmith -f talk.mp4                       # Force overwrite existing outputs
    shortsmith /videos/                          # Process every video with a table
    shortsmith --log-level debug talk.mp4        # Verbose run
    shortsmith completions bash > shortsmith.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Caption table for a single video (defaults to <video stem>.csv)
    #[arg(short = 'c', long)]
    captions: Option<PathBuf>,

    /// Directory for the cut video and rebased caption table
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "shortsmith", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Cut(args)) => run_cut(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            let cut_args = CutArgs {
                input_path,
                captions: cli.captions,
                output_dir: cli.output_dir,
                force_overwrite: cli.force_overwrite,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_cut(cut_args).await
        }
    }
}

async fn run_cut(options: CutArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path)?
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );

        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config to {}", config_path))?;
        config
    };

    // Override config with CLI options if provided
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    if options.input_path.is_dir() {
        if options.captions.is_some() {
            return Err(anyhow!(
                "--captions only applies to a single video, not a directory"
            ));
        }
        return controller
            .run_folder(&options.input_path, options.force_overwrite)
            .await;
    }

    // Single video: explicit caption table or the .csv next to the video
    let captions_path = match options.captions {
        Some(path) => path,
        None => FileManager::caption_table_for_video(&options.input_path).ok_or_else(|| {
            anyhow!(
                "No caption table found next to {:?} (expected same stem with .csv); \
                 pass one with --captions",
                options.input_path
            )
        })?,
    };

    let item = WorkItem {
        video_path: options.input_path,
        captions_path,
    };
    controller.run(&item, options.force_overwrite).await
}
