use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use report_core::{Effect, FieldValue, FormField, Msg, Snapshot, SubmitReply, TaskStatus};
use report_engine::{EngineEvent, EngineHandle};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitForm { fields } => {
                    engine_info!("SubmitForm fields={}", fields.len());
                    self.engine
                        .submit(fields.into_iter().map(map_field).collect());
                }
                Effect::StartPolling { task_id } => {
                    engine_info!(task = task_id; "StartPolling");
                    self.engine.start_polling(task_id);
                }
                Effect::StopPolling { task_id } => {
                    engine_info!(task = task_id; "StopPolling");
                    self.engine.stop_polling(task_id);
                }
                Effect::DownloadResult { result_file } => {
                    engine_info!("DownloadResult file={}", result_file);
                    self.engine.download(result_file);
                }
            }
        }
    }

    /// Blocks until the engine produces an event the core cares about.
    /// Returns `None` if the engine has shut down.
    pub fn next_msg(&self) -> Option<Msg> {
        loop {
            let event = self.engine.recv()?;
            if let Some(msg) = event_to_msg(event) {
                return Some(msg);
            }
        }
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Submitted(Ok(outcome)) => Some(Msg::SubmitResponded(SubmitReply {
            error: outcome.error,
            task_id: outcome.task_id,
        })),
        EngineEvent::Submitted(Err(err)) => {
            engine_error!("Submission error: {}", err);
            Some(Msg::SubmitFailed(err.to_string()))
        }
        EngineEvent::Polled {
            task_id,
            result: Ok(snapshot),
        } => Some(Msg::PollResponded {
            task_id,
            snapshot: map_snapshot(snapshot),
        }),
        EngineEvent::Polled {
            task_id,
            result: Err(err),
        } => {
            engine_warn!(task = task_id; "Polling error: {}", err);
            Some(Msg::PollFailed {
                task_id,
                message: err.to_string(),
            })
        }
        EngineEvent::PollingStopped { task_id, reason } => {
            engine_debug!(task = task_id; "Poller stopped: {:?}", reason);
            None
        }
        EngineEvent::Downloaded {
            result_file,
            result,
        } => {
            if let Err(err) = &result {
                engine_warn!("Download of {} failed: {}", result_file, err);
            }
            Some(Msg::DownloadFinished(result.map_err(|err| err.to_string())))
        }
    }
}

fn map_field(field: FormField) -> report_engine::FormField {
    match field.value {
        FieldValue::Text(value) => report_engine::FormField::text(field.name, value),
        FieldValue::File(path) => report_engine::FormField::file(field.name, path),
    }
}

fn map_snapshot(snapshot: report_engine::ProgressSnapshot) -> Snapshot {
    Snapshot {
        percent: snapshot.percent,
        message: snapshot.message,
        status: map_status(snapshot.status),
        result_file: snapshot.result_file,
    }
}

fn map_status(status: report_engine::TaskStatus) -> TaskStatus {
    match status {
        report_engine::TaskStatus::Completed => TaskStatus::Completed,
        report_engine::TaskStatus::Error => TaskStatus::Error,
        report_engine::TaskStatus::Pending | report_engine::TaskStatus::Other => {
            TaskStatus::Pending
        }
    }
}
