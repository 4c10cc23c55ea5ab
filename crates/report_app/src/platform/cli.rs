use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Deserialize;

#[derive(Debug, Parser)]
#[command(name = "report_app")]
#[command(version, about = "Submit a report job and follow its progress until it finishes")]
pub struct Cli {
    /// Server root, e.g. http://127.0.0.1:5000/
    #[arg(long)]
    pub base_url: Option<String>,

    /// Text form field as name=value. Repeatable.
    #[arg(long = "field", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub fields: Vec<(String, String)>,

    /// File form field as name=path. Repeatable; forces a multipart body.
    #[arg(long = "file", value_name = "NAME=PATH", value_parser = parse_key_path)]
    pub files: Vec<(String, PathBuf)>,

    /// RON config file. Defaults to ./report_app.ron when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Per-request timeout. Unbounded unless set.
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// Fetch the finished report into the output directory.
    #[arg(long)]
    pub download: bool,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Send multipart/form-data even without file fields.
    #[arg(long)]
    pub multipart: bool,

    #[arg(long, value_enum)]
    pub log: Option<LogChoice>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogChoice {
    Terminal,
    #[default]
    File,
    Both,
    Off,
}

impl From<LogChoice> for engine_logging::LogDestination {
    fn from(choice: LogChoice) -> Self {
        match choice {
            LogChoice::Terminal => engine_logging::LogDestination::Terminal,
            LogChoice::File => engine_logging::LogDestination::File,
            LogChoice::Both => engine_logging::LogDestination::Both,
            LogChoice::Off => engine_logging::LogDestination::Off,
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}

fn parse_key_path(raw: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = parse_key_value(raw)?;
    if path.is_empty() {
        return Err(format!("missing path in `{raw}`"));
    }
    Ok((name, PathBuf::from(path)))
}
