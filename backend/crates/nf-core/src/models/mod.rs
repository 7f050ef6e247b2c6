pub mod broker_message;
pub mod channel_id;
pub mod notification;
pub mod session_id;
