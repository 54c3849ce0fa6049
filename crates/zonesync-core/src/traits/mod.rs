//! Capability traits
//!
//! The sync driver and apply engine only talk to the outside world through
//! these interfaces.
//!
//! - [`RemoteZoneApi`]: provider management API transport
//! - [`RateLimiter`]: admission control for remote calls
//! - [`StateStore`]: persistence of observed state between passes

pub mod rate_limiter;
pub mod remote_api;
pub mod state_store;

pub use rate_limiter::{RateLimiter, TokenBucket, Unlimited};
pub use remote_api::{RemoteZoneApi, RemoteZoneApiFactory};
pub use state_store::{StateStore, StoredResource};
