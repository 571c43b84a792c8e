//! One bridge per protocol family.
//!
//! Bridges are stateless functions over the transport ports. They validate
//! the request, build the protocol envelope, perform exactly one exchange
//! and normalize the answer.

pub(crate) mod a2a;
pub(crate) mod common;
pub(crate) mod grpc;
pub(crate) mod http;
pub(crate) mod mcp;
pub(crate) mod websocket;
