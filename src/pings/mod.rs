//! Ping registry for "looking for game" broadcasts
//!
//! This module holds the outstanding pings per queue type with a
//! time-bounded visibility window, shared by the unranked queues and the
//! ranked ladder.

pub mod registry;

// Re-export commonly used types
pub use registry::{InMemoryPingRegistry, PingRegistry, RecentPing, RecentPings};
