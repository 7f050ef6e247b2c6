use crate::StreamSession;

use nf_core::{ChannelId, SessionId};

use std::sync::Arc;

/// Owning reference to an open session, returned by
/// [`NotificationService::open_session`](crate::NotificationService::open_session).
///
/// Hand it back with [`NotificationService::release`](crate::NotificationService::release)
/// when the stream ends.
#[derive(Debug)]
pub struct SessionHandle {
    session: Arc<StreamSession>,
}

impl SessionHandle {
    pub(crate) fn new(session: Arc<StreamSession>) -> Self {
        Self { session }
    }

    pub fn id(&self) -> SessionId {
        self.session.id()
    }

    pub fn channel(&self) -> &ChannelId {
        self.session.channel()
    }

    pub fn session(&self) -> &Arc<StreamSession> {
        &self.session
    }
}
