pub mod broker;
pub mod error;
pub mod models;

pub use broker::broker_error::{BrokerError, BrokerResult};
pub use broker::{Broker, BrokerStream};
pub use error::{CoreError, Result};
pub use error_location::ErrorLocation;
pub use models::broker_message::BrokerMessage;
pub use models::channel_id::{ChannelId, MAX_CHANNEL_ID_LENGTH};
pub use models::notification::Notification;
pub use models::session_id::SessionId;
