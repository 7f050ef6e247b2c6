//! Fan-out core: bridges broker channels to many server-sent event streams.
//!
//! A [`NotificationService`] owns the pipeline:
//!
//! ```text
//! Broker -> SubscriptionManager (one subscription per channel)
//!        -> FanOutDispatcher -> StreamSession buffers -> flush tasks -> SSE
//! ```
//!
//! Sessions have bounded buffers with a configurable overflow policy, so a
//! slow client never holds up delivery to the others.

pub mod app_state;
pub mod channel_registry;
pub mod channel_stats;
pub mod close_reason;
pub mod dispatch_report;
pub mod dispatch_timer;
pub mod enqueue_outcome;
pub mod error;
pub mod fan_out_dispatcher;
pub mod flush_task;
pub mod metrics;
pub mod notification_service;
pub mod reconnect_backoff;
pub mod session_handle;
pub mod session_info;
pub mod session_state;
pub mod session_stream;
pub mod shutdown_coordinator;
pub mod shutdown_guard;
pub mod sse_event;
pub mod stream_session;
pub mod stream_settings;
pub mod subscription;
pub mod subscription_manager;
pub mod subscription_state;

pub use app_state::{AppState, StreamQuery, handler};
pub use channel_registry::{AttachOutcome, ChannelRegistry, DetachOutcome};
pub use channel_stats::ChannelStats;
pub use close_reason::CloseReason;
pub use dispatch_report::DispatchReport;
pub use dispatch_timer::DispatchTimer;
pub use enqueue_outcome::{DropReason, EnqueueOutcome};
pub use error::{Result, StreamError};
pub use fan_out_dispatcher::FanOutDispatcher;
pub use metrics::Metrics;
pub use notification_service::NotificationService;
pub use reconnect_backoff::{ReconnectBackoff, ReconnectPolicy};
pub use session_handle::SessionHandle;
pub use session_info::{SessionCounters, SessionInfo};
pub use session_state::SessionState;
pub use session_stream::SessionStream;
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;
pub use stream_session::StreamSession;
pub use stream_settings::StreamSettings;
pub use subscription::Subscription;
pub use subscription_manager::SubscriptionManager;
pub use subscription_state::SubscriptionState;

#[cfg(test)]
mod tests;

use tracing::info_span;

/// Create a tracing span for a stream session's flush task.
/// Events recorded inside the task carry these fields.
pub fn create_session_span(session_id: &str, channel: &str) -> tracing::Span {
    info_span!(
        "stream_session",
        session_id = %session_id,
        channel = %channel,
    )
}
