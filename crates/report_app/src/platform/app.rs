use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_info, engine_warn};
use log::LevelFilter;
use report_core::{update, AppState, DownloadView, Msg, Phase, ProgressViewModel};
use report_engine::EngineHandle;

use super::cli::Cli;
use super::config::{self, AppConfig};
use super::effects::EffectRunner;
use super::ui::render::render;
use super::ui::terminal::TerminalSurface;
use super::ui::Surface;

pub fn run_app() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let file_config = config::load_file_config(cli.config.as_deref())?;
    let config = config::resolve(&cli, file_config)?;

    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    engine_logging::initialize(config.log.into(), level, &config.log_file);
    engine_info!(
        "Starting report run against {} (poll every {:?})",
        config.settings.base_url,
        config.settings.poll_interval
    );

    let engine = EngineHandle::new(config.settings.clone()).context("failed to start engine")?;
    let surface = TerminalSurface::new(config.settings.base_url.clone());
    let mut session = Session::new(
        AppState::with_fields(config.fields.clone()),
        EffectRunner::new(engine),
        surface,
    );

    let view = session.run(&config)?;
    session.surface.close();

    if run_succeeded(&view) {
        Ok(ExitCode::SUCCESS)
    } else {
        engine_warn!("Run ended in {:?}: {}", view.phase, view.message);
        Ok(ExitCode::FAILURE)
    }
}

/// One controller bound to one form: owns the state, drives effects and renders.
struct Session<S: Surface> {
    state: AppState,
    runner: EffectRunner,
    surface: S,
}

impl<S: Surface> Session<S> {
    fn new(state: AppState, runner: EffectRunner, surface: S) -> Self {
        Self {
            state,
            runner,
            surface,
        }
    }

    /// Submits once and processes engine messages until the run settles.
    fn run(&mut self, config: &AppConfig) -> anyhow::Result<ProgressViewModel> {
        self.dispatch_msg(Msg::SubmitClicked);

        let mut download_requested = false;
        loop {
            let view = self.state.view();
            if view.phase == Phase::Completed && config.download && !download_requested {
                download_requested = true;
                self.dispatch_msg(Msg::DownloadRequested);
                continue;
            }
            if is_settled(&view) {
                return Ok(view);
            }

            let msg = self
                .runner
                .next_msg()
                .context("engine stopped before the run finished")?;
            self.dispatch_msg(msg);
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.surface.apply(render(&state.view()));
        }
        self.state = state;
        self.runner.enqueue(effects);
    }
}

fn is_settled(view: &ProgressViewModel) -> bool {
    view.phase.is_terminal() && view.download != DownloadView::InFlight
}

fn run_succeeded(view: &ProgressViewModel) -> bool {
    view.phase == Phase::Completed && !matches!(view.download, DownloadView::Failed(_))
}
