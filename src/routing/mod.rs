//! Store identity and entity-to-store routing.
//!
//! Stores are opaque here. The routing layer hands out [`StoreHandle`]s and
//! decides which one backs a given entity type; opening and reading stores
//! belongs to the storage engine built on top.

mod handle;
mod router;

pub use handle::{ConfigurationName, StoreHandle, StoreId, StoreLocation};
pub use router::{StoreResolution, StoreRouter};
