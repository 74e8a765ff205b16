//! Migration chain modelling for schema version history.
//!
//! The types here answer one question: given the schema version a store was
//! written at, which version comes next? They never perform a migration
//! themselves; the session layer walks the chain and the storage engine does
//! the work.

mod chain;
mod steps;
mod version;

pub use chain::VersionGraph;
pub use steps::MigrationSteps;
pub use version::VersionId;
