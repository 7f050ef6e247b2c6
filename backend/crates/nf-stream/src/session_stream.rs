use crate::{Result, StreamSession};

use std::sync::Arc;

use axum::response::sse::Event;
use tokio::sync::mpsc;

/// Transport side of a started session.
///
/// Yields the events queued by the flush task. A session closed by a failure
/// (slow consumer, forced failure) ends the stream with that error at once,
/// ahead of anything still queued.
pub struct SessionStream {
    session: Arc<StreamSession>,
    events: mpsc::Receiver<Result<Event>>,
    failed: bool,
}

impl SessionStream {
    pub(crate) fn new(session: Arc<StreamSession>, events: mpsc::Receiver<Result<Event>>) -> Self {
        Self {
            session,
            events,
            failed: false,
        }
    }

    /// Next item for the transport; `None` once the stream is over
    pub async fn next(&mut self) -> Option<Result<Event>> {
        if self.failed {
            return None;
        }

        let item = tokio::select! {
            biased;
            error = self.session.failure() => Some(Err(error)),
            event = self.events.recv() => event,
        };

        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }

    pub fn session(&self) -> &Arc<StreamSession> {
        &self.session
    }
}
