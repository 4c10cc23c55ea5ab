use engine_logging::engine_debug;
use indicatif::{ProgressBar, ProgressStyle};

use super::constants::{
    BAR_DONE_TEMPLATE, BAR_ERROR_TEMPLATE, BAR_LENGTH, BAR_TEMPLATE, SPINNER_TICK,
};
use super::render::UiCommand;
use super::Surface;

/// Progress surface drawn on the terminal with an `indicatif` bar.
pub struct TerminalSurface {
    base_url: String,
    bar: Option<ProgressBar>,
    submit_label: Option<String>,
    error_styled: bool,
    completed: bool,
    download_link: Option<String>,
    download_status: Option<String>,
    poll_retries: u32,
}

impl TerminalSurface {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bar: None,
            submit_label: None,
            error_styled: false,
            completed: false,
            download_link: None,
            download_status: None,
            poll_retries: 0,
        }
    }

    fn bar(&mut self) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(BAR_LENGTH);
            bar.set_style(style(BAR_TEMPLATE));
            bar.enable_steady_tick(SPINNER_TICK);
            bar
        })
    }

    fn println(&mut self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }

    /// Absolute form of a server-relative link.
    fn absolute(&self, href: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), href)
    }

    /// Stops the spinner and leaves the last frame on screen.
    pub fn close(&mut self) {
        if let Some(bar) = self.bar.take() {
            if !bar.is_finished() {
                bar.abandon();
            }
        }
    }
}

impl Surface for TerminalSurface {
    fn apply(&mut self, commands: Vec<UiCommand>) {
        for command in commands {
            match command {
                UiCommand::SetSubmitControl {
                    enabled,
                    busy,
                    label,
                } => {
                    if self.submit_label.as_deref() != Some(label.as_str()) {
                        engine_debug!("Submit control: {} enabled={} busy={}", label, enabled, busy);
                        self.submit_label = Some(label);
                    }
                }
                UiCommand::ShowProgressSurface => {
                    self.bar();
                }
                UiCommand::SetProgress {
                    position,
                    label,
                    error_style,
                } => {
                    if error_style && !self.error_styled {
                        self.error_styled = true;
                        self.bar().set_style(style(BAR_ERROR_TEMPLATE));
                    }
                    let bar = self.bar();
                    bar.set_position(position);
                    bar.set_prefix(label);
                }
                UiCommand::SetMessage { text, .. } => {
                    self.bar().set_message(text);
                }
                UiCommand::ShowCompletion => {
                    if !self.completed {
                        self.completed = true;
                        let bar = self.bar();
                        bar.set_style(style(BAR_DONE_TEMPLATE));
                        bar.tick();
                        bar.disable_steady_tick();
                    }
                }
                UiCommand::ShowDownloadLink { href } => {
                    if self.download_link.as_deref() != Some(href.as_str()) {
                        let line = format!("Download: {}", self.absolute(&href));
                        self.println(line);
                        self.download_link = Some(href);
                    }
                }
                UiCommand::ShowDownloadStatus { text, error } => {
                    if self.download_status.as_deref() != Some(text.as_str()) {
                        let line = if error {
                            format!("! {text}")
                        } else {
                            text.clone()
                        };
                        self.println(line);
                        self.download_status = Some(text);
                    }
                }
                UiCommand::ShowPollRetries { failures } => {
                    if failures != self.poll_retries {
                        self.poll_retries = failures;
                        self.println(format!("! Server unreachable, retrying ({failures})"));
                    }
                }
            }
        }
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}
