use crate::filter::overlay_description;
use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overlay a watermark on a video, saving the result as raw yuv420p and showing it in a window
///
/// Example configuration file content
///
/// input = "cuc_ieschool.flv"
/// output = "test.yuv"
/// watermark = "logo.png"
/// offset_x = 5
/// offset_y = 5
/// delay_ms = 40
/// no_display = false
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Input media file
    #[arg(short, long, default_value = "cuc_ieschool.flv")]
    pub input: PathBuf,

    /// Raw yuv420p output file
    #[arg(short, long, default_value = "test.yuv")]
    pub output: PathBuf,

    /// Image overlaid on every frame
    #[arg(short, long, default_value = "logo.png")]
    pub watermark: PathBuf,

    /// Horizontal offset of the watermark in pixels
    #[arg(short = 'x', long, default_value_t = 5)]
    pub offset_x: i32,

    /// Vertical offset of the watermark in pixels
    #[arg(short = 'y', long, default_value_t = 5)]
    pub offset_y: i32,

    /// Full filter graph description, reading from `[in]` and writing to `[out]`.
    /// Replaces the watermark overlay when set.
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Delay between displayed frames in milliseconds
    #[arg(short, long, default_value_t = 40)]
    pub delay_ms: u64,

    /// Window title
    #[arg(short, long, default_value = "Simplest FFmpeg Video Filter")]
    pub title: String,

    /// Only write the output file, without opening a window or pacing frames
    #[arg(long, overrides_with = "display")]
    pub no_display: bool,

    /// Open the window even when the configuration file sets `no_display`
    #[arg(long, overrides_with = "no_display")]
    #[serde(skip)]
    pub display: bool,

    /// Configuration file path, CLI arguments that differ from their defaults take precedence
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<PathBuf>,
}

fn default_input() -> PathBuf {
    PathBuf::from("cuc_ieschool.flv")
}

fn default_output() -> PathBuf {
    PathBuf::from("test.yuv")
}

fn default_watermark() -> PathBuf {
    PathBuf::from("logo.png")
}

fn default_offset() -> i32 {
    5
}

fn default_delay_ms() -> u64 {
    40
}

fn default_title() -> String {
    "Simplest FFmpeg Video Filter".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            watermark: default_watermark(),
            offset_x: default_offset(),
            offset_y: default_offset(),
            filter: None,
            delay_ms: default_delay_ms(),
            title: default_title(),
            no_display: false,
            display: false,
            config: None,
        }
    }
}

impl Config {
    /// Load configuration from CLI args, optionally merging with a config file
    pub fn load() -> Result<Self> {
        Config::parse().resolve()
    }

    /// Like [`Config::load`], with explicit arguments instead of the process's
    pub fn load_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Config::try_parse_from(args)?.resolve()
    }

    fn resolve(mut self) -> Result<Self> {
        if let Some(config_path) = self.config.clone() {
            let file_config = Self::from_file(&config_path)
                .with_context(|| format!("failed to load config file {}", config_path.display()))?;
            self = self.merge_with_file(file_config);
        }

        self.validate()?;
        Ok(self)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge with file config, CLI args take precedence unless they are still at their default
    fn merge_with_file(mut self, file_config: Config) -> Self {
        if self.input == default_input() {
            self.input = file_config.input;
        }
        if self.output == default_output() {
            self.output = file_config.output;
        }
        if self.watermark == default_watermark() {
            self.watermark = file_config.watermark;
        }
        if self.offset_x == default_offset() {
            self.offset_x = file_config.offset_x;
        }
        if self.offset_y == default_offset() {
            self.offset_y = file_config.offset_y;
        }
        if self.delay_ms == default_delay_ms() {
            self.delay_ms = file_config.delay_ms;
        }
        if self.title == default_title() {
            self.title = file_config.title;
        }
        // a bare flag cannot say "off", so only `--display` outranks the file
        if !self.display {
            self.no_display |= file_config.no_display;
        }
        if self.filter.is_none() {
            self.filter = file_config.filter;
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.input == self.output {
            bail!(
                "output {} would overwrite the input",
                self.output.display()
            );
        }
        if let Some(filter) = &self.filter {
            if filter.trim().is_empty() {
                bail!("filter description cannot be empty");
            }
        }
        if self.title.trim().is_empty() {
            bail!("window title cannot be empty");
        }

        Ok(())
    }

    /// The filter graph to run, either the explicit description or the watermark overlay
    pub fn filter_description(&self) -> String {
        match &self.filter {
            Some(filter) => filter.clone(),
            None => overlay_description(&self.watermark, self.offset_x, self.offset_y),
        }
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    #[cfg(feature = "display")]
    pub fn display_options(&self) -> crate::display::DisplayOptions {
        crate::display::DisplayOptions {
            title: self.title.clone(),
            delay: self.delay(),
        }
    }
}
