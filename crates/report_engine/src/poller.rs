use std::sync::mpsc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, ProgressApi, StopReason};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Polls one task until a terminal status is seen or `cancel` fires.
///
/// Ticks are strictly sequential: the interval is slept, one request is made
/// and its result emitted before the next sleep starts. A failed request is
/// emitted as an error and the loop keeps going. On a terminal status the
/// token is cancelled before returning, so holders can tell the task is done.
pub async fn run_poller(
    api: &dyn ProgressApi,
    task_id: &str,
    interval: Duration,
    cancel: CancellationToken,
    sink: &dyn EventSink,
) -> StopReason {
    engine_info!(task = task_id; "Polling every {:?}", interval);
    let mut tick: u64 = 0;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return StopReason::Cancelled,
            _ = tokio::time::sleep(interval) => {}
        }

        tick += 1;
        let result = tokio::select! {
            _ = cancel.cancelled() => return StopReason::Cancelled,
            result = api.poll(task_id) => result,
        };

        let terminal = match &result {
            Ok(snapshot) => {
                engine_debug!(task = task_id; "tick {} status={:?}", tick, snapshot.status);
                snapshot.status.is_terminal()
            }
            Err(err) => {
                engine_warn!(task = task_id; "Polling error on tick {}: {}", tick, err);
                false
            }
        };

        sink.emit(EngineEvent::Polled {
            task_id: task_id.to_string(),
            result,
        });

        if terminal {
            engine_info!(task = task_id; "Terminal status after {} tick(s)", tick);
            cancel.cancel();
            return StopReason::Terminal;
        }
    }
}
