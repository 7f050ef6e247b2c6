//! Broker capability interface.
//!
//! The broker is external publish/subscribe infrastructure. Backends implement
//! [`Broker`]; the rest of the system only sees the trait object.

pub mod broker_error;

use crate::{BrokerMessage, BrokerResult, ChannelId};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Deliveries for one channel.
///
/// `Err(BrokerError::Malformed { .. })` items are per-message failures and the
/// stream stays usable. Any other error, or the end of the stream, means the
/// broker-side listen handle is gone.
pub type BrokerStream = BoxStream<'static, BrokerResult<BrokerMessage>>;

#[async_trait]
pub trait Broker: Send + Sync + 'static {
    /// Open a listen handle for `channel`
    async fn subscribe(&self, channel: &ChannelId) -> BrokerResult<BrokerStream>;

    /// Publish `payload` to every listener of `channel`
    async fn publish(&self, channel: &ChannelId, payload: Bytes) -> BrokerResult<()>;

    /// Backend name for logs and health output
    fn name(&self) -> &'static str;
}
