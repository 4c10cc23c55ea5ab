use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::poller::{run_poller, ChannelEventSink, EventSink};
use crate::{
    ClientError, ClientSettings, EngineEvent, FailureKind, FormField, ProgressApi,
    ReqwestProgressApi, TaskId,
};

enum EngineCommand {
    Submit { fields: Vec<FormField> },
    StartPolling { task_id: TaskId },
    StopPolling { task_id: TaskId },
    Download { result_file: String },
}

/// Bridge between a synchronous caller and the async client.
///
/// Commands are handled on a background thread that owns a tokio runtime;
/// results come back as `EngineEvent`s. Dropping the handle shuts the
/// runtime down and with it any running poller.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let poll_interval = settings.poll_interval;
        let output_dir = settings.output_dir.clone();
        let api = Arc::new(ReqwestProgressApi::new(settings)?);
        Self::with_api(api, poll_interval, output_dir)
    }

    pub fn with_api(
        api: Arc<dyn ProgressApi>,
        poll_interval: Duration,
        output_dir: PathBuf,
    ) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let mut pollers: HashMap<TaskId, CancellationToken> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                pollers.retain(|_, token| !token.is_cancelled());
                let sink = ChannelEventSink::new(event_tx.clone());
                match command {
                    EngineCommand::Submit { fields } => {
                        let api = api.clone();
                        runtime.spawn(async move {
                            let result = api.submit(&fields).await;
                            sink.emit(EngineEvent::Submitted(result));
                        });
                    }
                    EngineCommand::StartPolling { task_id } => {
                        if pollers.contains_key(&task_id) {
                            engine_warn!(task = task_id; "Already polling; ignoring start");
                            continue;
                        }
                        let token = CancellationToken::new();
                        pollers.insert(task_id.clone(), token.clone());
                        let api = api.clone();
                        runtime.spawn(async move {
                            let reason =
                                run_poller(api.as_ref(), &task_id, poll_interval, token, &sink)
                                    .await;
                            sink.emit(EngineEvent::PollingStopped { task_id, reason });
                        });
                    }
                    EngineCommand::StopPolling { task_id } => {
                        if let Some(token) = pollers.remove(&task_id) {
                            engine_info!(task = task_id; "Stopping poller");
                            token.cancel();
                        }
                    }
                    EngineCommand::Download { result_file } => {
                        let api = api.clone();
                        let dir = output_dir.clone();
                        runtime.spawn(async move {
                            let result = api.download(&result_file, &dir).await;
                            sink.emit(EngineEvent::Downloaded {
                                result_file,
                                result,
                            });
                        });
                    }
                }
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, fields: Vec<FormField>) {
        let _ = self.cmd_tx.send(EngineCommand::Submit { fields });
    }

    pub fn start_polling(&self, task_id: impl Into<TaskId>) {
        let _ = self.cmd_tx.send(EngineCommand::StartPolling {
            task_id: task_id.into(),
        });
    }

    /// Cancels the poller for `task_id`. Stopping an already finished poller is a no-op.
    pub fn stop_polling(&self, task_id: impl Into<TaskId>) {
        let _ = self.cmd_tx.send(EngineCommand::StopPolling {
            task_id: task_id.into(),
        });
    }

    pub fn download(&self, result_file: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            result_file: result_file.into(),
        });
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Blocks until the next event. Returns `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}
