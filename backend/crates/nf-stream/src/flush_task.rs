//! Per-session task moving buffered notifications to the SSE transport.

use crate::{CloseReason, Result, ShutdownGuard, StreamError, StreamSession, sse_event};

use nf_core::SessionId;

use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::Event;
use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Flush `session` into `tx` until the session ends, the client goes away,
/// or the server shuts down.
///
/// Once the session stops accepting messages it has `drain_timeout` to flush
/// what it has buffered. A session closed by a failure ends the transport
/// with that error.
pub async fn run(
    session: Arc<StreamSession>,
    tx: mpsc::Sender<Result<Event>>,
    mut shutdown: ShutdownGuard,
    drain_timeout: Duration,
) {
    let id = session.id();

    let drain_expired = async {
        session.stopped_accepting().await;
        sleep(drain_timeout).await;
    };
    tokio::pin!(drain_expired);

    let error = loop {
        let next = tokio::select! {
            _ = shutdown.wait() => {
                session.close(CloseReason::Shutdown);
                break None;
            }
            _ = tx.closed() => {
                debug!("Session {id}: client disconnected");
                session.begin_drain(CloseReason::ClientCancelled);
                session.close(CloseReason::ClientCancelled);
                break None;
            }
            _ = &mut drain_expired => {
                warn!("Session {id}: drain timed out after {drain_timeout:?}");
                session.close(CloseReason::DrainTimeout);
                break None;
            }
            next = session.next_outbound() => next,
        };

        match next {
            Ok(Some(notification)) => {
                let event = sse_event::encode(&notification);
                let sent = tokio::select! {
                    _ = shutdown.wait() => {
                        session.close(CloseReason::Shutdown);
                        break None;
                    }
                    // The transport is full here, so this is how an overflow
                    // under the disconnect policy is noticed
                    error = session.failure() => break Some(error),
                    _ = &mut drain_expired => {
                        warn!("Session {id}: drain timed out after {drain_timeout:?}");
                        session.close(CloseReason::DrainTimeout);
                        break None;
                    }
                    sent = tx.send(Ok(event)) => sent,
                };

                if sent.is_err() {
                    debug!("Session {id}: transport closed mid-send");
                    session.close(CloseReason::TransportError);
                    break None;
                }
            }
            Ok(None) => {
                debug!("Session {id}: stream complete");
                break None;
            }
            Err(e) => break Some(e),
        }
    };

    if let Some(error) = error.or_else(|| session.transport_error()) {
        surface(&tx, id, error);
    }
}

/// Queue the closing error without waiting for room. A full transport still
/// sees the failure through [`SessionStream`](crate::SessionStream).
fn surface(tx: &mpsc::Sender<Result<Event>>, id: SessionId, error: StreamError) {
    warn!("Session {id}: closing stream with error: {error}");

    if let Err(e) = tx.try_send(Err(error)) {
        debug!("Session {id}: closing error not queued: {e}");
    }
}
