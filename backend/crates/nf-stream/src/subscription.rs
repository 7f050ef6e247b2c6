use crate::SubscriptionState;

use nf_core::ChannelId;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

/// The single broker subscription for one channel.
///
/// Owns the sequence counter and the stop signal of its listener task.
pub struct Subscription {
    channel: ChannelId,
    created_at: DateTime<Utc>,
    next_sequence: AtomicU64,
    teardown_epoch: AtomicU64,
    reconnects: AtomicU64,
    state: Mutex<SubscriptionState>,
    stop_tx: watch::Sender<bool>,
}

impl Subscription {
    pub fn new(channel: ChannelId) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            channel,
            created_at: Utc::now(),
            next_sequence: AtomicU64::new(1),
            teardown_epoch: AtomicU64::new(0),
            reconnects: AtomicU64::new(0),
            state: Mutex::new(SubscriptionState::Connecting),
            stop_tx,
        }
    }

    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Claim the next sequence number (starts at 1)
    pub fn assign_sequence(&self) -> u64 {
        self.next_sequence.fetch_add(1, Ordering::SeqCst)
    }

    /// Sequence numbers handed out so far
    pub fn last_sequence(&self) -> u64 {
        self.next_sequence.load(Ordering::SeqCst) - 1
    }

    pub fn state(&self) -> SubscriptionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_state(&self, state: SubscriptionState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    pub fn reconnects(&self) -> u64 {
        self.reconnects.load(Ordering::SeqCst)
    }

    pub(crate) fn record_reconnect(&self) -> u64 {
        self.reconnects.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Invalidate any pending grace teardown and return the new epoch
    pub(crate) fn bump_epoch(&self) -> u64 {
        self.teardown_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.teardown_epoch.load(Ordering::SeqCst)
    }

    pub(crate) fn stop_signal(&self) -> watch::Receiver<bool> {
        self.stop_tx.subscribe()
    }

    /// Ask the listener task to release the broker handle and exit
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("state", &self.state())
            .field("last_sequence", &self.last_sequence())
            .finish()
    }
}
