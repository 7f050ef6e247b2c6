pub mod admin;
pub mod api;
pub mod error;
pub mod health;
pub mod logger;
pub mod metrics_exporter;
pub mod routes;

#[cfg(test)]
mod tests;

pub use api::{
    error::ApiError,
    error::Result as ApiResult,
    publish::publish,
    publish_response::PublishResponse,
};

pub use crate::routes::build_router;
