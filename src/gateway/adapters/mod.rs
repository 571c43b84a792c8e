//! Transport adapters for the protocol gateway.

mod http_client;
#[cfg(feature = "websocket")]
mod websocket_client;

pub use http_client::ReqwestTransport;
#[cfg(feature = "websocket")]
pub use websocket_client::TungsteniteConnector;
