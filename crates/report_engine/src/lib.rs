//! Report engine: HTTP client for the report server, task polling and download persistence.
mod api;
mod engine;
mod filename;
mod persist;
mod poller;
mod types;

pub use api::{ClientSettings, ProgressApi, ReqwestProgressApi};
pub use engine::EngineHandle;
pub use filename::safe_download_name;
pub use persist::{ensure_output_dir, AtomicFileWriter, PendingFile, PersistError};
pub use poller::{run_poller, ChannelEventSink, EventSink};
pub use types::{
    ClientError, EngineEvent, FailureKind, FormField, FormValue, ProgressSnapshot, StopReason,
    SubmitOutcome, TaskId, TaskStatus,
};
