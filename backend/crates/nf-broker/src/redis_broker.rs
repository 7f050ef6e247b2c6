use nf_core::{Broker, BrokerError, BrokerMessage, BrokerResult, BrokerStream, ChannelId};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use log::{debug, info};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Redis pub/sub broker.
///
/// Every listen handle is its own pub/sub connection, so dropping a
/// subscription's stream closes exactly that connection. When Redis goes away
/// the message stream simply ends and the caller reconnects.
#[derive(Clone)]
pub struct RedisBroker {
    client: redis::Client,
    publisher: ConnectionManager,
}

impl RedisBroker {
    /// Open the client and establish the publishing connection.
    pub async fn connect(url: &str) -> BrokerResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| BrokerError::connect(format!("invalid redis url: {e}")))?;

        let publisher = ConnectionManager::new(client.clone())
            .await
            .map_err(|e| BrokerError::connect(e.to_string()))?;

        info!("Redis broker connected");

        Ok(Self { client, publisher })
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn subscribe(&self, channel: &ChannelId) -> BrokerResult<BrokerStream> {
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|e| BrokerError::connect(e.to_string()))?;

        pubsub
            .subscribe(channel.as_str())
            .await
            .map_err(|e| BrokerError::connect(format!("SUBSCRIBE {channel}: {e}")))?;

        debug!("Redis broker: subscribed to {channel}");

        Ok(pubsub.into_on_message().map(decode_message).boxed())
    }

    async fn publish(&self, channel: &ChannelId, payload: Bytes) -> BrokerResult<()> {
        let mut connection = self.publisher.clone();

        let receivers: i64 = connection
            .publish(channel.as_str(), payload.to_vec())
            .await
            .map_err(|e| BrokerError::publish(channel.as_str(), e.to_string()))?;

        debug!("Redis broker: published to {channel} ({receivers} receivers)");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

fn decode_message(message: redis::Msg) -> BrokerResult<BrokerMessage> {
    let channel: String = message
        .get_channel()
        .map_err(|e| BrokerError::malformed(format!("unreadable channel name: {e}")))?;

    Ok(BrokerMessage::new(
        channel,
        Bytes::copy_from_slice(message.get_payload_bytes()),
    ))
}
