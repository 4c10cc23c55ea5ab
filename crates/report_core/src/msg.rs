use std::path::PathBuf;

use crate::{FormField, Snapshot, SubmitReply, TaskId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited a text field; replaces any field with the same name.
    FieldChanged { name: String, value: String },
    /// Replace the whole form (e.g. fields collected from the command line).
    FieldsReplaced(Vec<FormField>),
    /// User activated the submit control.
    SubmitClicked,
    /// The submit request returned a decoded JSON body.
    SubmitResponded(SubmitReply),
    /// The submit request failed before a body could be decoded.
    SubmitFailed(String),
    /// One poll tick returned a snapshot.
    PollResponded { task_id: TaskId, snapshot: Snapshot },
    /// One poll tick failed at the transport level.
    PollFailed { task_id: TaskId, message: String },
    /// User asked to fetch the finished report.
    DownloadRequested,
    /// Download finished with the saved path or an error message.
    DownloadFinished(Result<PathBuf, String>),
}
