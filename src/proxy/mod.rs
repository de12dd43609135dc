//! Reverse-proxy subsystem.
//!
//! ```text
//! proxy.conf → vhost.rs (host → targets + policy)
//!            → balancer.rs (per-host rotation)
//!            → forward.rs (relay request bytes to the chosen target)
//! ```

pub mod balancer;
pub mod forward;
pub mod vhost;
