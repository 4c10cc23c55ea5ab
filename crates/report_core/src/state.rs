use std::path::PathBuf;

use crate::view_model::{
    download_href, format_percent, DownloadView, ProgressViewModel, SubmitControlView, BUSY_LABEL,
    DEFAULT_MESSAGE, GENERATE_LABEL, READY_MESSAGE, RETRY_LABEL,
};
use crate::{FormField, Snapshot, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    phase: Phase,
    fields: Vec<FormField>,
    attempt: u32,
    task_id: Option<TaskId>,
    percent: f64,
    message: String,
    error_style: bool,
    overlay_visible: bool,
    completion_visible: bool,
    result_file: Option<String>,
    download: DownloadView,
    submit_enabled: bool,
    submit_busy: bool,
    submit_label: &'static str,
    poll_failures: u32,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            fields: Vec::new(),
            attempt: 0,
            task_id: None,
            percent: 0.0,
            message: DEFAULT_MESSAGE.to_string(),
            error_style: false,
            overlay_visible: false,
            completion_visible: false,
            result_file: None,
            download: DownloadView::NotRequested,
            submit_enabled: true,
            submit_busy: false,
            submit_label: GENERATE_LABEL,
            poll_failures: 0,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn view(&self) -> ProgressViewModel {
        ProgressViewModel {
            phase: self.phase,
            attempt: self.attempt,
            task_id: self.task_id.clone(),
            percent: self.percent,
            percent_label: format_percent(self.percent),
            message: self.message.clone(),
            error_style: self.error_style,
            overlay_visible: self.overlay_visible,
            completion_visible: self.completion_visible,
            download_href: if self.completion_visible {
                self.result_file.as_deref().map(download_href)
            } else {
                None
            },
            download: self.download.clone(),
            submit: SubmitControlView {
                enabled: self.submit_enabled,
                busy: self.submit_busy,
                label: self.submit_label.to_string(),
            },
            poll_failures: self.poll_failures,
        }
    }

    /// Returns whether anything visible changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn accepts_form_edits(&self) -> bool {
        !matches!(self.phase, Phase::Submitting | Phase::Polling)
    }

    pub(crate) fn set_text_field(&mut self, name: String, value: String) {
        let field = FormField::text(name, value);
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub(crate) fn replace_fields(&mut self, fields: Vec<FormField>) {
        self.fields = fields;
    }

    pub(crate) fn is_polling(&self, task_id: &str) -> bool {
        self.phase == Phase::Polling && self.task_id.as_deref() == Some(task_id)
    }

    /// Starts a fresh run: the previous run's progress surface is reset.
    pub(crate) fn begin_submit(&mut self) {
        self.phase = Phase::Submitting;
        self.attempt += 1;
        self.task_id = None;
        self.percent = 0.0;
        self.message = DEFAULT_MESSAGE.to_string();
        self.error_style = false;
        self.overlay_visible = true;
        self.completion_visible = false;
        self.result_file = None;
        self.download = DownloadView::NotRequested;
        self.submit_enabled = false;
        self.submit_busy = true;
        self.submit_label = BUSY_LABEL;
        self.poll_failures = 0;
        self.dirty = true;
    }

    pub(crate) fn fail_submit(&mut self, error: &str) {
        self.phase = Phase::Failed;
        self.message = format!("Error: {error}");
        self.submit_enabled = true;
        self.submit_busy = false;
        self.submit_label = GENERATE_LABEL;
        self.dirty = true;
    }

    pub(crate) fn start_polling(&mut self, task_id: TaskId) {
        self.phase = Phase::Polling;
        self.task_id = Some(task_id);
        self.dirty = true;
    }

    pub(crate) fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        self.percent = normalize_percent(snapshot.percent);
        self.message = match snapshot.message.as_deref() {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => DEFAULT_MESSAGE.to_string(),
        };
        self.dirty = true;
    }

    pub(crate) fn complete(&mut self, result_file: Option<String>) {
        self.phase = Phase::Completed;
        self.percent = 100.0;
        self.message = READY_MESSAGE.to_string();
        self.completion_visible = true;
        self.result_file = result_file;
        // The submit control is left as submission set it: disabled and busy.
        self.dirty = true;
    }

    pub(crate) fn fail_task(&mut self, message: Option<&str>) {
        self.phase = Phase::Failed;
        self.message = format!("Error: {}", message.unwrap_or("unknown error"));
        self.error_style = true;
        self.submit_enabled = true;
        self.submit_busy = false;
        self.submit_label = RETRY_LABEL;
        self.dirty = true;
    }

    pub(crate) fn record_poll_failure(&mut self) {
        self.poll_failures = self.poll_failures.saturating_add(1);
        self.dirty = true;
    }

    pub(crate) fn result_file(&self) -> Option<&str> {
        self.result_file.as_deref()
    }

    pub(crate) fn download(&self) -> &DownloadView {
        &self.download
    }

    pub(crate) fn begin_download(&mut self) {
        self.download = DownloadView::InFlight;
        self.dirty = true;
    }

    pub(crate) fn finish_download(&mut self, result: Result<PathBuf, String>) {
        self.download = match result {
            Ok(path) => DownloadView::Saved(path),
            Err(message) => DownloadView::Failed(message),
        };
        self.dirty = true;
    }
}

fn normalize_percent(percent: Option<f64>) -> f64 {
    match percent {
        Some(value) if value.is_finite() && value != 0.0 => value,
        _ => 0.0,
    }
}
