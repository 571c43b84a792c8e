//! Domain model for protocol invocation.

mod config;
mod error;
mod method;
mod request;
mod result;

pub use config::GatewayConfig;
pub use error::{GatewayError, ParseHttpMethodError};
pub use method::HttpMethod;
pub use request::{DispatchTarget, InvocationRequest};
pub use result::{InvocationResult, ProtocolAvailability};
