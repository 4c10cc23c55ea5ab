use std::path::PathBuf;

use crate::{Phase, TaskId};

pub const DEFAULT_MESSAGE: &str = "Processing...";
pub const READY_MESSAGE: &str = "Report Ready!";
pub const GENERATE_LABEL: &str = "Generate Report";
pub const BUSY_LABEL: &str = "Processing...";
pub const RETRY_LABEL: &str = "Try Again";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DownloadView {
    #[default]
    NotRequested,
    InFlight,
    Saved(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControlView {
    pub enabled: bool,
    /// Show a busy indicator next to the label.
    pub busy: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressViewModel {
    pub phase: Phase,
    pub attempt: u32,
    pub task_id: Option<TaskId>,
    pub percent: f64,
    pub percent_label: String,
    pub message: String,
    pub error_style: bool,
    pub overlay_visible: bool,
    pub completion_visible: bool,
    pub download_href: Option<String>,
    pub download: DownloadView,
    pub submit: SubmitControlView,
    /// Transport failures seen while polling the current task.
    pub poll_failures: u32,
}

impl ProgressViewModel {
    /// Bar fill in `0.0..=1.0`; the label keeps the raw server value.
    pub fn bar_fraction(&self) -> f64 {
        (self.percent / 100.0).clamp(0.0, 1.0)
    }
}

/// `45.0` renders as `45%`, `12.5` as `12.5%`.
pub fn format_percent(percent: f64) -> String {
    format!("{percent}%")
}

/// Server-relative link; `/` in `result_file` is kept as a path separator.
pub fn download_href(result_file: &str) -> String {
    format!("/download/{result_file}")
}
