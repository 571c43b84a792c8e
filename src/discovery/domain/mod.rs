//! Domain model for capability discovery.

mod hit;
mod query;
mod stats;
mod tokens;

pub use hit::{MatchedField, SearchHit};
pub use query::{DEFAULT_LIMIT, DiscoveryQuery, Ordering, SortKey, SortOrder};
pub use stats::IndexStats;
pub use tokens::tokenize;
