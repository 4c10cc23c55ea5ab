//! Report core: pure submit/poll state machine and view-model helpers.
mod effect;
mod form;
mod msg;
mod snapshot;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use form::{FieldValue, FormField};
pub use msg::Msg;
pub use snapshot::{Snapshot, SubmitReply, TaskId, TaskStatus};
pub use state::{AppState, Phase};
pub use update::update;
pub use view_model::{
    download_href, format_percent, DownloadView, ProgressViewModel, SubmitControlView,
    BUSY_LABEL, DEFAULT_MESSAGE, GENERATE_LABEL, READY_MESSAGE, RETRY_LABEL,
};
