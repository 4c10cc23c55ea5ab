use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use engine_logging::engine_info;
use report_core::FormField;
use report_engine::ClientSettings;
use serde::Deserialize;

use super::cli::{Cli, LogChoice};

pub const DEFAULT_CONFIG_FILE: &str = "report_app.ron";
const DEFAULT_LOG_FILE: &str = "report_app.log";

/// Optional settings read from the RON config file; every key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub download: Option<bool>,
    pub multipart: Option<bool>,
    pub log: Option<LogChoice>,
    pub log_file: Option<PathBuf>,
    /// Default text fields, in submission order.
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings: ClientSettings,
    pub fields: Vec<FormField>,
    pub download: bool,
    pub log: LogChoice,
    pub log_file: PathBuf,
    pub verbose: bool,
}

/// Reads the config file. An explicit path must exist; the default one is optional.
pub fn load_file_config(explicit: Option<&Path>) -> anyhow::Result<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(FileConfig::default());
            }
            default
        }
    };

    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = parse_file_config(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    engine_info!("Loaded config from {:?}", path);
    Ok(config)
}

pub fn parse_file_config(text: &str) -> anyhow::Result<FileConfig> {
    Ok(ron::from_str(text)?)
}

/// Merges file values with the command line; the command line wins.
pub fn resolve(cli: &Cli, file: FileConfig) -> anyhow::Result<AppConfig> {
    let defaults = ClientSettings::default();

    let poll_interval_ms = cli.poll_interval_ms.or(file.poll_interval_ms);
    if poll_interval_ms == Some(0) {
        bail!("poll interval must be greater than zero");
    }

    let settings = ClientSettings {
        base_url: cli
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or(defaults.base_url),
        poll_interval: poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval),
        connect_timeout: file
            .connect_timeout_ms
            .map(Duration::from_millis)
            .or(defaults.connect_timeout),
        request_timeout: cli
            .request_timeout_ms
            .or(file.request_timeout_ms)
            .map(Duration::from_millis),
        force_multipart: cli.multipart || file.multipart.unwrap_or(false),
        output_dir: cli
            .output_dir
            .clone()
            .or(file.output_dir)
            .unwrap_or(defaults.output_dir),
    };

    let mut fields: Vec<FormField> = Vec::new();
    for (name, value) in file.fields.into_iter().chain(cli.fields.iter().cloned()) {
        let field = FormField::text(name, value);
        match fields.iter_mut().find(|existing| existing.name == field.name) {
            Some(existing) => *existing = field,
            None => fields.push(field),
        }
    }
    fields.extend(
        cli.files
            .iter()
            .map(|(name, path)| FormField::file(name.clone(), path.clone())),
    );

    Ok(AppConfig {
        settings,
        fields,
        download: cli.download || file.download.unwrap_or(false),
        log: cli.log.or(file.log).unwrap_or_default(),
        log_file: file
            .log_file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        verbose: cli.verbose,
    })
}
