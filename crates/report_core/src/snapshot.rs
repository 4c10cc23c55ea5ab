pub type TaskId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Error,
}

/// One progress payload as reported by the server.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub percent: Option<f64>,
    pub message: Option<String>,
    pub status: TaskStatus,
    pub result_file: Option<String>,
}

/// Decoded body of the submit response. `error` is only set when the
/// server's value was truthy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitReply {
    pub error: Option<String>,
    pub task_id: Option<TaskId>,
}
