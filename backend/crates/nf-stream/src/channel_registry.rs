use crate::StreamSession;

use nf_core::{ChannelId, SessionId};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Result of attaching a session to a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachOutcome {
    /// The channel had no sessions before this one
    pub first_session: bool,
}

/// Result of detaching a session from a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachOutcome {
    /// The session was attached and is now gone
    pub removed: bool,
    /// No sessions remain on the channel
    pub channel_empty: bool,
}

/// Channel membership, keyed by channel.
///
/// Holds `Weak` session references only. Locking is per channel: a sharded map
/// for the channel set and one `RwLock` per channel for its members. An empty
/// channel stays listed until [`remove_if_empty`](Self::remove_if_empty) runs,
/// which happens when the idle grace window ends.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    channels: DashMap<ChannelId, ChannelEntry>,
    total_sessions: AtomicUsize,
}

struct ChannelEntry {
    sessions: RwLock<HashMap<SessionId, Weak<StreamSession>>>,
    created_at: DateTime<Utc>,
}

impl Default for ChannelEntry {
    fn default() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            created_at: Utc::now(),
        }
    }
}

impl ChannelEntry {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<SessionId, Weak<StreamSession>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, Weak<StreamSession>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `session` to `channel`, creating the channel entry if needed.
    ///
    /// The insert happens while the channel's shard is held, so it cannot
    /// interleave with [`remove_if_empty`](Self::remove_if_empty).
    pub fn attach(&self, channel: &ChannelId, session: &Arc<StreamSession>) -> AttachOutcome {
        let entry = self.inner.channels.entry(channel.clone()).or_default();
        let mut sessions = entry.write();

        let first_session = sessions.is_empty();
        if sessions
            .insert(session.id(), Arc::downgrade(session))
            .is_none()
        {
            self.inner.total_sessions.fetch_add(1, Ordering::SeqCst);
        }

        AttachOutcome { first_session }
    }

    /// Remove a session. The channel entry itself is kept.
    pub fn detach(&self, channel: &ChannelId, session_id: SessionId) -> DetachOutcome {
        let Some(entry) = self.inner.channels.get(channel) else {
            return DetachOutcome {
                removed: false,
                channel_empty: true,
            };
        };

        let mut sessions = entry.write();
        let removed = sessions.remove(&session_id).is_some();
        if removed {
            self.inner.total_sessions.fetch_sub(1, Ordering::SeqCst);
        }

        DetachOutcome {
            removed,
            channel_empty: sessions.is_empty(),
        }
    }

    /// Live sessions on a channel. The snapshot is taken under the channel's
    /// read lock and returned without it.
    pub fn lookup_sessions(&self, channel: &ChannelId) -> Vec<Arc<StreamSession>> {
        self.inner
            .channels
            .get(channel)
            .map(|entry| entry.read().values().filter_map(Weak::upgrade).collect())
            .unwrap_or_default()
    }

    /// Drop the channel entry if no session is attached
    pub fn remove_if_empty(&self, channel: &ChannelId) -> bool {
        self.inner
            .channels
            .remove_if(channel, |_, entry| entry.read().is_empty())
            .is_some()
    }

    pub fn session_count(&self, channel: &ChannelId) -> usize {
        self.inner
            .channels
            .get(channel)
            .map(|entry| entry.read().len())
            .unwrap_or(0)
    }

    pub fn total_sessions(&self) -> usize {
        self.inner.total_sessions.load(Ordering::SeqCst)
    }

    pub fn contains(&self, channel: &ChannelId) -> bool {
        self.inner.channels.contains_key(channel)
    }

    pub fn channel_ids(&self) -> Vec<ChannelId> {
        self.inner
            .channels
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// When the channel entry was created, if it exists
    pub fn channel_created_at(&self, channel: &ChannelId) -> Option<DateTime<Utc>> {
        self.inner
            .channels
            .get(channel)
            .map(|entry| entry.created_at)
    }

    /// Every live session on every channel
    pub fn all_sessions(&self) -> Vec<Arc<StreamSession>> {
        self.inner
            .channels
            .iter()
            .flat_map(|entry| {
                entry
                    .read()
                    .values()
                    .filter_map(Weak::upgrade)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn find_session(&self, session_id: SessionId) -> Option<Arc<StreamSession>> {
        self.inner
            .channels
            .iter()
            .find_map(|entry| entry.read().get(&session_id).and_then(Weak::upgrade))
    }
}
