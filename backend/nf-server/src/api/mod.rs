pub mod error;
pub mod publish;
pub mod publish_response;
