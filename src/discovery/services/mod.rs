//! Discovery services.

mod discovery;
mod index;

pub use discovery::DiscoveryService;
pub(crate) use discovery::{UnrankedRow, sort_unranked};
