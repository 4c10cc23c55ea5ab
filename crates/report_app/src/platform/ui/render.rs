use report_core::{DownloadView, Phase, ProgressViewModel};

use super::constants::BAR_LENGTH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    SetSubmitControl {
        enabled: bool,
        busy: bool,
        label: String,
    },
    ShowProgressSurface,
    SetProgress {
        position: u64,
        label: String,
        error_style: bool,
    },
    SetMessage {
        text: String,
        error_style: bool,
    },
    ShowCompletion,
    ShowDownloadLink {
        href: String,
    },
    ShowDownloadStatus {
        text: String,
        error: bool,
    },
    /// Polling hit transport errors and keeps retrying.
    ShowPollRetries {
        failures: u32,
    },
}

#[allow(clippy::vec_init_then_push)]
pub fn render(view: &ProgressViewModel) -> Vec<UiCommand> {
    let mut cmds = Vec::new();

    cmds.push(UiCommand::SetSubmitControl {
        enabled: view.submit.enabled,
        busy: view.submit.busy,
        label: view.submit.label.clone(),
    });

    if !view.overlay_visible {
        return cmds;
    }

    cmds.push(UiCommand::ShowProgressSurface);
    cmds.push(UiCommand::SetProgress {
        position: (view.bar_fraction() * BAR_LENGTH as f64).round() as u64,
        label: view.percent_label.clone(),
        error_style: view.error_style,
    });
    cmds.push(UiCommand::SetMessage {
        text: view.message.clone(),
        error_style: view.error_style,
    });

    if view.phase == Phase::Polling && view.poll_failures > 0 {
        cmds.push(UiCommand::ShowPollRetries {
            failures: view.poll_failures,
        });
    }

    if view.completion_visible {
        cmds.push(UiCommand::ShowCompletion);
        if let Some(href) = &view.download_href {
            cmds.push(UiCommand::ShowDownloadLink { href: href.clone() });
        }
    }

    match &view.download {
        DownloadView::NotRequested => {}
        DownloadView::InFlight => cmds.push(UiCommand::ShowDownloadStatus {
            text: "Downloading report...".to_string(),
            error: false,
        }),
        DownloadView::Saved(path) => cmds.push(UiCommand::ShowDownloadStatus {
            text: format!("Saved to {}", path.display()),
            error: false,
        }),
        DownloadView::Failed(message) => cmds.push(UiCommand::ShowDownloadStatus {
            text: format!("Download failed: {message}"),
            error: true,
        }),
    }

    cmds
}
