//! Output formatting for difflog CLI
//!
//! Every command result can be rendered as a human-readable table, JSON, or
//! CSV. Colors are disabled automatically when stdout is not a TTY.

use clap::ValueEnum;
use serde::Serialize;
use std::io::IsTerminal;
use std::str::FromStr;

mod csv;
mod json;

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report grouped by file (default)
    #[default]
    Table,
    /// JSON format for machine consumption
    Json,
    /// CSV format, one row per change
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: '{}'", s)),
        }
    }
}

/// Configuration for output rendering
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Disable colored output
    pub no_color: bool,
    /// Minified JSON on a single line
    pub compact: bool,
}

impl OutputConfig {
    #[cfg(test)]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            no_color: false,
            compact: false,
        }
    }

    /// Create an OutputConfig with automatic TTY detection and optional color override.
    ///
    /// `Some(true)` forces colors on, `Some(false)` forces them off and `None`
    /// enables them only when stdout is a TTY.
    pub fn auto_detect_with_color_override(
        format: OutputFormat,
        color_override: Option<bool>,
    ) -> Self {
        let use_color = color_override.unwrap_or_else(|| std::io::stdout().is_terminal());
        Self {
            format,
            no_color: !use_color,
            compact: false,
        }
    }

    pub fn use_colors(&self) -> bool {
        !self.no_color
    }

    /// Builder: disable colors
    #[cfg(test)]
    pub fn without_colors(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Builder: enable compact mode
    #[cfg(test)]
    pub fn compact(mut self) -> Self {
        self.compact = true;
        self
    }
}

/// Column definition for CSV output
#[derive(Debug, Clone)]
pub struct Column {
    /// Display name for the column header
    pub name: String,
    /// Key of the serialized field the column reads
    pub key: String,
}

impl Column {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// Trait for types that can be formatted as output
pub trait Outputter: Serialize + Sized {
    /// Render as table format
    fn to_table(&self, config: &OutputConfig) -> String;

    /// Render as JSON format
    fn to_json(&self, config: &OutputConfig) -> String {
        JsonOutput::format(self, config)
    }

    /// Render as CSV format
    fn to_csv(&self, config: &OutputConfig) -> String;

    /// Render using the format specified in config
    fn render(&self, config: &OutputConfig) -> String {
        match config.format {
            OutputFormat::Table => self.to_table(config),
            OutputFormat::Json => self.to_json(config),
            OutputFormat::Csv => self.to_csv(config),
        }
    }

    /// Render and print to stdout
    fn output(&self, config: &OutputConfig) {
        println!("{}", self.render(config));
    }
}

/// Result wrapper for formatted output with automatic format selection
pub struct Output<T> {
    data: T,
    config: OutputConfig,
}

impl<T: Outputter> Output<T> {
    pub fn with_config(data: T, config: OutputConfig) -> Self {
        Self { data, config }
    }

    /// Render the output to stdout
    pub fn render(&self) -> anyhow::Result<()> {
        self.data.output(&self.config);
        Ok(())
    }

    /// Get the rendered string without printing
    #[cfg(test)]
    pub fn render_to_string(&self) -> String {
        self.data.render(&self.config)
    }
}

/// Simple trait for results that only need a hand-written table view.
///
/// JSON and CSV renderings are derived from the `Serialize` impl.
pub trait TableDisplay: Serialize {
    fn to_table(&self) -> String;
}

impl<T: TableDisplay + Serialize> Outputter for T {
    fn to_table(&self, _config: &OutputConfig) -> String {
        TableDisplay::to_table(self)
    }

    fn to_csv(&self, config: &OutputConfig) -> String {
        CsvOutput::format(self, config)
    }
}
