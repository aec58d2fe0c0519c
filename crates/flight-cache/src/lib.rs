//! Expiring single-flight cache and per-resource download coordination
//!
//! [`FlightCache`] deduplicates concurrent computations of the same key into a
//! single upstream call and keeps successful results for a per-call TTL.
//! [`DownloadCoordinator`] serializes materialization of on-disk resources so
//! that each resource is fetched at most once at a time.
//!
//! Both types are plain values owned by whoever builds them; there is no
//! global state. Computations run on spawned tasks, so a caller that goes
//! away does not cancel work other callers are still waiting on.

mod cache;
mod coordinator;
mod error;

pub use cache::FlightCache;
pub use coordinator::DownloadCoordinator;
pub use error::{DownloadError, FlightError};
