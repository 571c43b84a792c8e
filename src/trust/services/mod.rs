//! Trust scoring services.

mod ledger;
mod manager;

pub use manager::TrustManager;
