use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings. Everything the original
/// scripts hardcoded (directory names, encoder timeouts) is explicit here.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory where cut videos and rebased caption tables are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Timeout for ffmpeg cut/concat invocations, in seconds
    #[serde(default = "default_ffmpeg_timeout_secs")]
    pub ffmpeg_timeout_secs: u64,

    /// Timeout for ffprobe invocations, in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Skip zero-length planned segments at the encode boundary
    #[serde(default = "default_skip_empty_segments")]
    pub skip_empty_segments: bool,

    /// Filename suffix for the cut video output
    #[serde(default = "default_cut_suffix")]
    pub cut_suffix: String,

    /// Filename suffix for the rebased caption table
    #[serde(default = "default_rebased_suffix")]
    pub rebased_suffix: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    // @level: Errors only
    Error,
    // @level: Errors and warnings
    Warn,
    // @level: Normal output
    #[default]
    Info,
    // @level: Verbose output
    Debug,
    // @level: Everything
    Trace,
}

impl LogLevel {
    // @returns: log crate level filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("processed_data")
}

fn default_ffmpeg_timeout_secs() -> u64 {
    300
}

fn default_probe_timeout_secs() -> u64 {
    60
}

fn default_skip_empty_segments() -> bool {
    true
}

fn default_cut_suffix() -> String {
    "cut".to_string()
}

fn default_rebased_suffix() -> String {
    "rebased".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            ffmpeg_timeout_secs: default_ffmpeg_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            skip_empty_segments: default_skip_empty_segments(),
            cut_suffix: default_cut_suffix(),
            rebased_suffix: default_rebased_suffix(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Check configuration values for obvious mistakes
    pub fn validate(&self) -> Result<()> {
        if self.ffmpeg_timeout_secs == 0 {
            return Err(anyhow!("ffmpeg_timeout_secs must be greater than 0"));
        }

        if self.probe_timeout_secs == 0 {
            return Err(anyhow!("probe_timeout_secs must be greater than 0"));
        }

        if self.cut_suffix.is_empty() || self.rebased_suffix.is_empty() {
            return Err(anyhow!("Output filename suffixes must not be empty"));
        }

        if self.cut_suffix == self.rebased_suffix {
            return Err(anyhow!(
                "cut_suffix and rebased_suffix must differ, both are '{}'",
                self.cut_suffix
            ));
        }

        Ok(())
    }
}
