//! Workspace root crate.
//!
//! Re-exports the scoring engine and the scenario generator so integration
//! tests can depend on a single crate.

pub use scenario::*;
pub use scoring::*;
