//! Domain model for trust scoring.

mod config;
mod error;
mod event;

pub use config::{TrustConfig, TrustWeights};
pub use error::TrustConfigError;
pub use event::{ScoreChange, TrustBreakdown, TrustEvent, TrustEventKind, TrustScore};
