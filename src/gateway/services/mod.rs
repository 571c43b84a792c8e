//! Protocol dispatch services.

mod gateway;

pub use gateway::ProtocolGateway;
