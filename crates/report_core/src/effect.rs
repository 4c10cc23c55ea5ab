use crate::{FormField, TaskId};

/// Side effects requested by `update`; executed by the host, never by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitForm { fields: Vec<FormField> },
    StartPolling { task_id: TaskId },
    /// Emitted exactly once per task, on the first terminal status.
    StopPolling { task_id: TaskId },
    DownloadResult { result_file: String },
}
