use crate::{
    CloseReason, DropReason, EnqueueOutcome, Result, SessionCounters, SessionInfo, SessionState,
    StreamError,
};

use nf_config::OverflowPolicy;
use nf_core::{ChannelId, Notification, SessionId};

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use tokio::sync::{Notify, watch};

/// One client's output stream.
///
/// Producers (the dispatcher) call [`enqueue`](Self::enqueue), which never
/// waits. The session's flush task pulls with
/// [`next_outbound`](Self::next_outbound). The registry and dispatcher only
/// hold `Weak` references; the flush task owns the session.
pub struct StreamSession {
    id: SessionId,
    channel: ChannelId,
    capacity: usize,
    policy: OverflowPolicy,
    opened_at: DateTime<Utc>,
    inner: Mutex<SessionInner>,
    wake: Notify,
    state_tx: watch::Sender<SessionState>,
}

struct SessionInner {
    state: SessionState,
    buffer: VecDeque<Notification>,
    last_sequence: Option<u64>,
    counters: SessionCounters,
    close_reason: Option<CloseReason>,
}

impl StreamSession {
    pub fn new(channel: ChannelId, capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        let (state_tx, _) = watch::channel(SessionState::Connecting);
        Self {
            id: SessionId::new(),
            channel,
            capacity,
            policy,
            opened_at: Utc::now(),
            inner: Mutex::new(SessionInner {
                state: SessionState::Connecting,
                buffer: VecDeque::with_capacity(capacity),
                last_sequence: None,
                counters: SessionCounters::default(),
                close_reason: None,
            }),
            wake: Notify::new(),
            state_tx,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn state(&self) -> SessionState {
        self.lock_recovering().state
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.lock_recovering().close_reason.clone()
    }

    pub fn counters(&self) -> SessionCounters {
        self.lock_recovering().counters
    }

    pub fn buffered(&self) -> usize {
        self.lock_recovering().buffer.len()
    }

    pub fn info(&self) -> SessionInfo {
        let inner = self.lock_recovering();
        SessionInfo {
            id: self.id,
            channel: self.channel.clone(),
            state: inner.state,
            buffered: inner.buffer.len(),
            capacity: self.capacity,
            counters: inner.counters,
            close_reason: inner.close_reason.as_ref().map(ToString::to_string),
            opened_at: self.opened_at,
        }
    }

    /// Offer a message. Never waits; a full buffer is resolved by the
    /// session's overflow policy.
    pub fn enqueue(&self, notification: Notification) -> Result<EnqueueOutcome> {
        let mut inner = self.lock()?;

        if !inner.state.accepts_messages() {
            inner.counters.dropped += 1;
            return Ok(EnqueueOutcome::Dropped(DropReason::NotAccepting));
        }

        if let Some(last) = inner.last_sequence
            && notification.sequence < last
        {
            inner.counters.dropped += 1;
            return Ok(EnqueueOutcome::Dropped(DropReason::OutOfOrder));
        }

        let mut evicted = false;
        if inner.buffer.len() >= self.capacity {
            match self.policy {
                OverflowPolicy::DropOldest => {
                    inner.buffer.pop_front();
                    inner.counters.evicted += 1;
                    evicted = true;
                }
                OverflowPolicy::DropNewest => {
                    inner.counters.dropped += 1;
                    return Ok(EnqueueOutcome::Dropped(DropReason::BufferFull));
                }
                OverflowPolicy::Disconnect => {
                    warn!(
                        "Session {} on {} exceeded buffer of {}, disconnecting",
                        self.id, self.channel, self.capacity
                    );
                    inner.counters.dropped += 1;
                    self.close_locked(&mut inner, CloseReason::SlowConsumer);
                    drop(inner);
                    self.wake.notify_one();
                    return Ok(EnqueueOutcome::Dropped(DropReason::SlowConsumer));
                }
            }
        }

        inner.last_sequence = Some(notification.sequence);
        inner.buffer.push_back(notification);
        inner.counters.enqueued += 1;
        drop(inner);

        self.wake.notify_one();
        Ok(EnqueueOutcome::Accepted { evicted })
    }

    /// Wait for the next message to flush.
    ///
    /// Returns `Ok(None)` once the session is closed (or a draining session
    /// has flushed everything), and `Err` when the session was closed by a
    /// failure the transport should see.
    pub async fn next_outbound(&self) -> Result<Option<Notification>> {
        loop {
            let woken = self.wake.notified();

            {
                let mut inner = self.lock()?;
                match inner.state {
                    SessionState::Closed => {
                        return self.close_error(&inner).map_or(Ok(None), Err);
                    }
                    SessionState::Draining => {
                        if let Some(next) = inner.buffer.pop_front() {
                            inner.counters.delivered += 1;
                            return Ok(Some(next));
                        }
                        self.set_state(&mut inner, SessionState::Closed);
                        debug!("Session {} drained", self.id);
                        return Ok(None);
                    }
                    SessionState::Connecting | SessionState::Active => {
                        if let Some(next) = inner.buffer.pop_front() {
                            inner.counters.delivered += 1;
                            return Ok(Some(next));
                        }
                    }
                }
            }

            woken.await;
        }
    }

    /// `Connecting -> Active`, once the session is registered
    pub fn mark_active(&self) -> bool {
        let mut inner = self.lock_recovering();
        if inner.state == SessionState::Connecting {
            self.set_state(&mut inner, SessionState::Active);
            true
        } else {
            false
        }
    }

    /// Stop accepting new messages but keep flushing what is buffered
    pub fn begin_drain(&self, reason: CloseReason) -> bool {
        let mut inner = self.lock_recovering();
        if !inner.state.accepts_messages() {
            return false;
        }

        debug!("Session {} draining: {}", self.id, reason);
        self.set_state(&mut inner, SessionState::Draining);
        inner.close_reason = Some(reason);
        drop(inner);

        self.wake.notify_one();
        true
    }

    /// Close immediately, discarding anything buffered. A reason recorded by an
    /// earlier `begin_drain` is kept.
    pub fn close(&self, reason: CloseReason) -> bool {
        let mut inner = self.lock_recovering();
        if inner.state == SessionState::Closed {
            return false;
        }

        self.close_locked(&mut inner, reason);
        drop(inner);

        self.wake.notify_one();
        true
    }

    /// Close with a failure that is surfaced to the transport
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.close(CloseReason::Failed(reason.into()))
    }

    fn close_locked(&self, inner: &mut SessionInner, reason: CloseReason) {
        inner.counters.discarded += inner.buffer.len() as u64;
        inner.buffer.clear();
        self.set_state(inner, SessionState::Closed);
        if inner.close_reason.is_none() || matches!(reason, CloseReason::Failed(_)) {
            inner.close_reason = Some(reason);
        }
    }

    fn set_state(&self, inner: &mut SessionInner, state: SessionState) {
        inner.state = state;
        self.state_tx.send_replace(state);
    }

    /// Resolves once the session stops accepting messages (draining or closed)
    pub async fn stopped_accepting(&self) {
        let mut state_rx = self.state_tx.subscribe();
        let _ = state_rx.wait_for(|state| !state.accepts_messages()).await;
    }

    /// Error the transport should end with, if the session was closed by a
    /// failure
    pub fn transport_error(&self) -> Option<StreamError> {
        let inner = self.lock_recovering();
        if inner.state == SessionState::Closed {
            self.close_error(&inner)
        } else {
            None
        }
    }

    /// Resolves with the transport error once the session is closed by a
    /// failure. Stays pending for any other close.
    pub async fn failure(&self) -> StreamError {
        let mut state_rx = self.state_tx.subscribe();
        let closed = state_rx
            .wait_for(|state| *state == SessionState::Closed)
            .await
            .is_ok();
        if closed && let Some(error) = self.transport_error() {
            return error;
        }
        std::future::pending().await
    }

    fn close_error(&self, inner: &SessionInner) -> Option<StreamError> {
        match &inner.close_reason {
            Some(CloseReason::SlowConsumer) => {
                Some(StreamError::slow_consumer(self.id, self.capacity))
            }
            Some(CloseReason::Failed(reason)) => {
                Some(StreamError::session_failed(self.id, reason.clone()))
            }
            _ => None,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionInner>> {
        self.inner
            .lock()
            .map_err(|_| StreamError::session_poisoned(self.id))
    }

    /// State transitions must still happen after a panic elsewhere
    fn lock_recovering(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = self.inner.lock();
                    panic!("poisoning session state");
                })
                .join();
        });
    }
}

impl std::fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("capacity", &self.capacity)
            .finish()
    }
}
