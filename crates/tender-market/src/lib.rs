//! Marketplace engine for property maintenance tenders.
//!
//! Landlords post tenders against maintenance issues, contractors with a
//! matching trade submit competing quotes, and the acceptance engine resolves
//! exactly one winner per tender under concurrent access. The HTTP surface in
//! [`marketplace::router`] and the service facade in [`marketplace::service`]
//! are the two supported entry points.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
