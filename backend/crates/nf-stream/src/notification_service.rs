use crate::{
    ChannelRegistry, ChannelStats, CloseReason, Metrics, Result, SessionHandle, SessionInfo,
    SessionStream, ShutdownCoordinator, StreamError, StreamSession, StreamSettings,
    SubscriptionManager, create_session_span, flush_task,
};

use nf_core::{Broker, ChannelId, SessionId};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tracing::Instrument;

/// Lifecycle owner for the fan-out pipeline.
///
/// Constructed once at startup and shared by cloning. Wires the channel
/// registry, subscription manager and dispatcher together and applies the
/// rule that attaching subscribes and emptying a channel schedules teardown.
#[derive(Clone)]
pub struct NotificationService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    broker: Arc<dyn Broker>,
    registry: ChannelRegistry,
    subscriptions: SubscriptionManager,
    settings: StreamSettings,
    metrics: Metrics,
    shutdown: ShutdownCoordinator,
    open_sessions: AtomicUsize,
}

impl NotificationService {
    pub fn new(
        broker: Arc<dyn Broker>,
        settings: StreamSettings,
        metrics: Metrics,
        shutdown: ShutdownCoordinator,
    ) -> Self {
        let registry = ChannelRegistry::new();
        let subscriptions = SubscriptionManager::new(
            broker.clone(),
            registry.clone(),
            settings.grace_period,
            settings.reconnect.clone(),
            settings.max_payload_bytes,
            metrics.clone(),
        );

        info!(
            "Notification service ready (broker: {}, max sessions: {}, buffer: {}, overflow: {})",
            broker.name(),
            settings.max_sessions,
            settings.buffer_capacity,
            settings.overflow_policy
        );

        Self {
            inner: Arc::new(ServiceInner {
                broker,
                registry,
                subscriptions,
                settings,
                metrics,
                shutdown,
                open_sessions: AtomicUsize::new(0),
            }),
        }
    }

    /// Open a stream session on `channel`: attach it, make sure the channel is
    /// subscribed, then mark it active.
    pub fn open_session(&self, channel: &str) -> Result<SessionHandle> {
        let inner = &self.inner;

        if inner.shutdown.is_shutdown() {
            return Err(StreamError::shutting_down());
        }

        let channel = ChannelId::parse(channel)?;
        self.reserve_slot()?;

        let session = Arc::new(StreamSession::new(
            channel.clone(),
            inner.settings.buffer_capacity,
            inner.settings.overflow_policy,
        ));

        let outcome = inner.registry.attach(&channel, &session);
        inner.subscriptions.ensure_subscribed(&channel);

        // A shutdown that ran since the first check has already stopped the
        // subscriptions it saw
        if inner.shutdown.is_shutdown() {
            self.abandon(&session);
            return Err(StreamError::shutting_down());
        }

        session.mark_active();

        inner.metrics.session_opened();
        info!(
            "Session {} opened on {channel}{}",
            session.id(),
            if outcome.first_session {
                " (first session)"
            } else {
                ""
            }
        );

        Ok(SessionHandle::new(session))
    }

    /// Detach a finished session; an emptied channel is scheduled for teardown
    pub fn release(&self, handle: SessionHandle) {
        let inner = &self.inner;
        let session = handle.session();

        session.close(CloseReason::ClientCancelled);

        let outcome = inner.registry.detach(session.channel(), session.id());
        if !outcome.removed {
            return;
        }

        inner.open_sessions.fetch_sub(1, Ordering::SeqCst);

        let reason = session
            .close_reason()
            .map(|reason| reason.as_str())
            .unwrap_or("unknown");
        inner.metrics.session_closed(reason);

        let counters = session.counters();
        info!(
            "Session {} on {} closed ({reason}): {} delivered, {} evicted, {} dropped",
            session.id(),
            session.channel(),
            counters.delivered,
            counters.evicted,
            counters.dropped
        );

        if outcome.channel_empty {
            inner.subscriptions.schedule_teardown(session.channel());
        }
    }

    /// Ask a session to finish flushing and end its stream
    pub fn close_session(&self, session_id: &str) -> Result<SessionInfo> {
        let session = SessionId::parse(session_id)
            .ok()
            .and_then(|id| self.inner.registry.find_session(id))
            .ok_or_else(|| StreamError::session_not_found(session_id))?;

        if session.begin_drain(CloseReason::CloseRequested) {
            info!("Session {} close requested", session.id());
        }

        Ok(session.info())
    }

    /// Publish through the broker
    pub async fn publish(&self, channel: &str, payload: Bytes) -> Result<()> {
        let channel = ChannelId::parse(channel)?;

        let max = self.inner.settings.max_payload_bytes;
        if payload.len() > max {
            return Err(StreamError::payload_too_large(payload.len(), max));
        }

        let result = self.inner.broker.publish(&channel, payload).await;
        self.inner.metrics.published(result.is_ok());
        result.map_err(|e| {
            warn!("Publish to {channel} failed: {e}");
            StreamError::from(e)
        })
    }

    /// Start the flush task for `handle`.
    ///
    /// The returned stream carries SSE events for the transport. The session
    /// is released when the flush task finishes.
    pub fn start_stream(&self, handle: SessionHandle) -> SessionStream {
        let (tx, rx) = mpsc::channel(self.inner.settings.transport_buffer);
        let service = self.clone();
        let guard = self.inner.shutdown.subscribe_guard();
        let drain_timeout = self.inner.settings.drain_timeout;
        let span = create_session_span(&handle.id().to_string(), handle.channel().as_str());
        let stream = SessionStream::new(handle.session().clone(), rx);

        tokio::spawn(
            async move {
                flush_task::run(handle.session().clone(), tx, guard, drain_timeout).await;
                service.release(handle);
            }
            .instrument(span),
        );

        stream
    }

    /// Close every session without flushing and stop every subscription
    pub fn shutdown(&self) {
        self.inner.shutdown.shutdown();

        let sessions = self.inner.registry.all_sessions();
        for session in &sessions {
            session.close(CloseReason::Shutdown);
        }

        self.inner.subscriptions.shutdown();
        info!("Notification service stopped, closed {} sessions", sessions.len());
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutdown.is_shutdown()
    }

    pub fn channel_stats(&self) -> Vec<ChannelStats> {
        let mut stats: Vec<ChannelStats> = self
            .inner
            .registry
            .channel_ids()
            .into_iter()
            .map(|channel| {
                let subscription = self.inner.subscriptions.subscription(&channel);
                ChannelStats {
                    sessions: self.inner.registry.session_count(&channel),
                    subscription: subscription.as_ref().map(|s| s.state()),
                    last_sequence: subscription.as_ref().map_or(0, |s| s.last_sequence()),
                    reconnects: subscription.as_ref().map_or(0, |s| s.reconnects()),
                    subscribed_at: subscription.as_ref().map(|s| s.created_at()),
                    created_at: self.inner.registry.channel_created_at(&channel),
                    channel,
                }
            })
            .collect();

        stats.sort_by(|a, b| a.channel.cmp(&b.channel));
        stats
    }

    pub fn session_info(&self) -> Vec<SessionInfo> {
        self.inner
            .registry
            .all_sessions()
            .iter()
            .map(|session| session.info())
            .collect()
    }

    pub fn open_sessions(&self) -> usize {
        self.inner.open_sessions.load(Ordering::SeqCst)
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.inner.registry
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.inner.subscriptions
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.inner.settings
    }

    /// Undo an open that lost the race with `shutdown`
    fn abandon(&self, session: &StreamSession) {
        let inner = &self.inner;
        session.close(CloseReason::Shutdown);

        let outcome = inner.registry.detach(session.channel(), session.id());
        if outcome.removed {
            inner.open_sessions.fetch_sub(1, Ordering::SeqCst);
        }
        if outcome.channel_empty {
            inner.subscriptions.teardown(session.channel());
        }
        debug!("Session {} abandoned during shutdown", session.id());
    }

    fn reserve_slot(&self) -> Result<()> {
        let max = self.inner.settings.max_sessions;
        self.inner
            .open_sessions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current < max).then_some(current + 1)
            })
            .map(|_| ())
            .map_err(|current| {
                debug!("Session limit reached ({current}/{max})");
                StreamError::session_limit(current, max)
            })
    }
}
