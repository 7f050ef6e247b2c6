use crate::{InMemoryBroker, RedisBroker};

use nf_config::{BrokerConfig, BrokerKind};
use nf_core::{Broker, BrokerResult};

use std::sync::Arc;

use log::info;

/// Build the broker backend selected in configuration
pub async fn connect_broker(config: &BrokerConfig) -> BrokerResult<Arc<dyn Broker>> {
    match config.kind {
        BrokerKind::Memory => {
            info!("Using in-memory broker (single process only)");
            Ok(Arc::new(InMemoryBroker::new()))
        }
        BrokerKind::Redis => {
            info!("Connecting to redis broker at {}", config.redacted_url());
            Ok(Arc::new(RedisBroker::connect(&config.url).await?))
        }
    }
}
