//! Port contracts for the protocol gateway.

mod transport;

#[cfg(test)]
pub(crate) use transport::MockHttpTransport;
pub use transport::{
    GrpcCall, GrpcInvoker, HttpTransport, TransportError, TransportRequest, TransportResponse,
    WebsocketConnector, WebsocketReply,
};
