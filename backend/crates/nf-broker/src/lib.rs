//! Broker backends for the notification fan-out service.
//!
//! Both backends implement [`nf_core::Broker`]:
//!
//! - [`InMemoryBroker`]: process-local, used for tests and single-node setups.
//!   Exposes fault injection (forced disconnects, failing subscribes) so the
//!   reconnect path can be exercised without real infrastructure.
//! - [`RedisBroker`]: Redis pub/sub. Each `subscribe` opens a dedicated pub/sub
//!   connection; publishing goes through one shared connection manager.

pub mod broker_factory;
pub mod in_memory_broker;
pub mod redis_broker;

pub use broker_factory::connect_broker;
pub use in_memory_broker::{DEFAULT_CHANNEL_CAPACITY, InMemoryBroker};
pub use redis_broker::RedisBroker;

#[cfg(test)]
mod tests;
