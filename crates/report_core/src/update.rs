use crate::{AppState, DownloadView, Effect, Msg, Phase, SubmitReply, TaskId, TaskStatus};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FieldChanged { name, value } => {
            if state.accepts_form_edits() {
                state.set_text_field(name, value);
            }
            Vec::new()
        }
        Msg::FieldsReplaced(fields) => {
            if state.accepts_form_edits() {
                state.replace_fields(fields);
            }
            Vec::new()
        }
        Msg::SubmitClicked => match state.phase() {
            // A failed run leaves the control enabled; pressing it starts a new run.
            Phase::Idle | Phase::Failed => {
                state.begin_submit();
                vec![Effect::SubmitForm {
                    fields: state.fields().to_vec(),
                }]
            }
            Phase::Submitting | Phase::Polling | Phase::Completed => Vec::new(),
        },
        Msg::SubmitResponded(reply) => {
            if state.phase() != Phase::Submitting {
                return (state, Vec::new());
            }
            match accept_reply(reply) {
                Ok(task_id) => {
                    state.start_polling(task_id.clone());
                    vec![Effect::StartPolling { task_id }]
                }
                Err(error) => {
                    state.fail_submit(&error);
                    Vec::new()
                }
            }
        }
        Msg::SubmitFailed(error) => {
            if state.phase() == Phase::Submitting {
                state.fail_submit(&error);
            }
            Vec::new()
        }
        Msg::PollResponded { task_id, snapshot } => {
            if !state.is_polling(&task_id) {
                return (state, Vec::new());
            }
            state.apply_snapshot(&snapshot);
            match snapshot.status {
                TaskStatus::Pending => Vec::new(),
                TaskStatus::Completed => {
                    state.complete(snapshot.result_file);
                    vec![Effect::StopPolling { task_id }]
                }
                TaskStatus::Error => {
                    state.fail_task(snapshot.message.as_deref());
                    vec![Effect::StopPolling { task_id }]
                }
            }
        }
        Msg::PollFailed { task_id, .. } => {
            if state.is_polling(&task_id) {
                state.record_poll_failure();
            }
            Vec::new()
        }
        Msg::DownloadRequested => {
            let ready = state.phase() == Phase::Completed
                && matches!(
                    state.download(),
                    DownloadView::NotRequested | DownloadView::Failed(_)
                );
            match state.result_file().map(ToOwned::to_owned) {
                Some(result_file) if ready => {
                    state.begin_download();
                    vec![Effect::DownloadResult { result_file }]
                }
                _ => Vec::new(),
            }
        }
        Msg::DownloadFinished(result) => {
            if *state.download() == DownloadView::InFlight {
                state.finish_download(result);
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn accept_reply(reply: SubmitReply) -> Result<TaskId, String> {
    if let Some(error) = reply.error {
        return Err(error);
    }
    match reply.task_id {
        Some(task_id) if !task_id.is_empty() => Ok(task_id),
        _ => Err("missing task_id".to_string()),
    }
}
