//! Registry-level request, response and error types.

mod envelope;
mod error;
mod listing;
mod stats;

pub use envelope::ApiEnvelope;
pub use error::{ErrorKind, RegistryError, RegistryResult};
pub use listing::ListQuery;
pub use stats::{AgentStats, ConvergenceReport, InvocationMetrics, RegistryStats, SearchMatch};
