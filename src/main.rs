// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::{Config, TranslationMode};
use crate::app_controller::{Controller, SubtitleSource};
use crate::ass_converter::AssConverter;
use crate::media_tools::SubtitleFile;

mod app_config;
mod app_controller;
mod ass_converter;
mod errors;
mod media_tools;
mod providers;
mod subtitle_processor;
mod translation;

/// CLI wrapper for TranslationMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationMode {
    Bilingual,
    English,
    Chinese,
}

impl From<CliTranslationMode> for TranslationMode {
    fn from(cli_mode: CliTranslationMode) -> Self {
        match cli_mode {
            CliTranslationMode::Bilingual => TranslationMode::Bilingual,
            CliTranslationMode::English => TranslationMode::English,
            CliTranslationMode::Chinese => TranslationMode::Chinese,
        }
    }
}

/// CLI wrapper for SubtitleSource to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSubtitleSource {
    Auto,
    Embedded,
    Audio,
}

impl From<CliSubtitleSource> for SubtitleSource {
    fn from(cli_source: CliSubtitleSource) -> Self {
        match cli_source {
            CliSubtitleSource::Auto => SubtitleSource::Auto,
            CliSubtitleSource::Embedded => SubtitleSource::Embedded,
            CliSubtitleSource::Audio => SubtitleSource::Audio,
        }
    }
}

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LevelFilter {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl From<app_config::LogLevel> for CliLogLevel {
    fn from(level: app_config::LogLevel) -> Self {
        match level {
            app_config::LogLevel::Error => CliLogLevel::Error,
            app_config::LogLevel::Warn => CliLogLevel::Warn,
            app_config::LogLevel::Info => CliLogLevel::Info,
            app_config::LogLevel::Debug => CliLogLevel::Debug,
            app_config::LogLevel::Trace => CliLogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate an SRT file or every SRT file under a directory
    Translate {
        /// Input .srt file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Translation mode
        #[arg(short, long, value_enum)]
        mode: Option<CliTranslationMode>,

        /// Model name to use for translation
        #[arg(long)]
        model: Option<String>,
    },

    /// Generate translated subtitles for a video file
    Generate {
        /// Input video file
        #[arg(value_name = "VIDEO_PATH")]
        video_path: PathBuf,

        /// Output directory (defaults to the video's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Where subtitle content comes from
        #[arg(short, long, value_enum, default_value = "auto")]
        source: CliSubtitleSource,

        /// Translation mode
        #[arg(short, long, value_enum)]
        mode: Option<CliTranslationMode>,

        /// Model name to use for translation
        #[arg(long)]
        model: Option<String>,
    },

    /// Embed subtitle files into a copy of a video
    Embed {
        /// Input video file
        #[arg(value_name = "VIDEO_PATH")]
        video_path: PathBuf,

        /// Subtitle files to embed (.srt or .ass)
        #[arg(required = true, value_name = "SUBTITLE_FILE")]
        subtitle_files: Vec<PathBuf>,

        /// Output directory (defaults to the video's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Language tags for the subtitle streams, in order
        #[arg(short, long, value_delimiter = ',')]
        languages: Vec<String>,
    },

    /// Convert an SRT file to styled ASS files
    Ass {
        /// Input .srt file
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Style sheet JSON file
        #[arg(short = 'c', long, default_value = "ass_styles.json")]
        style_sheet: PathBuf,

        /// Style keys to render, one output file per key
        #[arg(short = 'S', long, value_delimiter = ',')]
        styles: Vec<String>,

        /// List available style keys and exit
        #[arg(long)]
        list_styles: bool,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate shell completions for subsmith
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subsmith - AI subtitle translation toolkit
///
/// Translates SRT subtitles, generates subtitles for videos from embedded
/// tracks or audio transcription, embeds subtitle files into video
/// containers, and renders styled ASS output.
#[derive(Parser, Debug)]
#[command(name = "subsmith")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AI-powered subtitle translation toolkit")]
#[command(long_about = "subsmith translates subtitles and generates them for videos using AI.

EXAMPLES:
    subsmith translate movie.srt                 # Bilingual translation next to the input
    subsmith translate -m english /subs/         # Translate a whole directory
    subsmith generate movie.mkv                  # Embedded track if present, else audio
    subsmith generate -s audio movie.mkv         # Always transcribe the audio
    subsmith embed movie.mkv movie.bilingual.srt # Mux subtitles into a copy
    subsmith ass -S neon movie.srt               # Render a styled ASS file
    subsmith completions bash > subsmith.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum, global = true)]
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

    // @returns: ANSI color code for log level
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
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
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

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        log::set_max_level(level.clone().into());
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subsmith", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate {
            ref input_path,
            ref output_dir,
            ref mode,
            ref model,
        } => {
            let config = load_config(&cli, mode.clone(), model.clone())?;
            let controller = Controller::with_config(config)?;
            let output_dir = resolve_output_dir(output_dir, input_path);

            if input_path.is_dir() {
                controller.translate_directory(input_path, &output_dir).await?;
            } else {
                controller.translate_srt_file(input_path, &output_dir).await?;
            }
            Ok(())
        }
        Commands::Generate {
            ref video_path,
            ref output_dir,
            ref source,
            ref mode,
            ref model,
        } => {
            let config = load_config(&cli, mode.clone(), model.clone())?;
            let controller = Controller::with_config(config)?;
            let output_dir = resolve_output_dir(output_dir, video_path);

            controller
                .generate_subtitles(video_path, source.clone().into(), &output_dir)
                .await?;
            Ok(())
        }
        Commands::Embed {
            ref video_path,
            ref subtitle_files,
            ref output_dir,
            ref languages,
        } => {
            let config = load_config(&cli, None, None)?;
            let controller = Controller::with_config(config)?;
            let output_dir = resolve_output_dir(output_dir, video_path);

            let subtitles: Vec<SubtitleFile> = subtitle_files
                .iter()
                .enumerate()
                .map(|(i, path)| SubtitleFile {
                    path: path.clone(),
                    language: languages.get(i).cloned(),
                    title: None,
                })
                .collect();

            controller.embed(video_path, &subtitles, &output_dir).await?;
            Ok(())
        }
        Commands::Ass {
            ref input_path,
            ref style_sheet,
            ref styles,
            list_styles,
            ref output_dir,
        } => {
            let converter = AssConverter::from_file(style_sheet)?;

            if list_styles {
                for key in converter.style_keys() {
                    println!("{}", key);
                }
                return Ok(());
            }

            let output_dir = resolve_output_dir(output_dir, input_path);
            let written = converter.srt_to_ass(styles, input_path.as_path(), output_dir.as_path())?;
            for path in written {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

/// Load the configuration file (creating a default one when missing) and
/// apply CLI overrides
fn load_config(
    cli: &CommandLineOptions,
    mode: Option<CliTranslationMode>,
    model: Option<String>,
) -> Result<Config> {
    let config_path = Path::new(&cli.config_path);

    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            cli.config_path
        );
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to: {}", cli.config_path))?;
        config
    };

    if let Some(mode) = mode {
        config.mode = mode.into();
    }
    if let Some(model) = model {
        config.provider.text_model = model;
    }
    // API key from the environment wins over the config file
    if let Ok(key) = std::env::var("SUBSMITH_API_KEY") {
        if !key.is_empty() {
            config.provider.api_key = key;
        }
    }

    if cli.log_level.is_none() {
        let level: CliLogLevel = config.log_level.clone().into();
        log::set_max_level(level.into());
    }

    Ok(config)
}

/// Output directory fallback: next to the input
fn resolve_output_dir(output_dir: &Option<PathBuf>, input: &Path) -> PathBuf {
    output_dir.clone().unwrap_or_else(|| {
        input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    })
}
