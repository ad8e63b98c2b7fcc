//! Courier Common - shared types for the courier update service
//!
//! One canonical version identifier, one comparison law, and the release
//! catalog every negotiation request reads from.

pub mod catalog;
pub mod decision;
pub mod release;
pub mod schemas;
pub mod version;

pub use catalog::*;
pub use decision::*;
pub use release::*;
pub use schemas::*;
pub use version::*;
