//! Utility functions for the matchmaking and ranking engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique match proposal ID
pub fn generate_proposal_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Age of `then` relative to `now`, rounded to the nearest whole minute
pub fn minutes_ago(now: DateTime<Utc>, then: DateTime<Utc>) -> i64 {
    let seconds = (now - then).num_seconds();
    (seconds as f64 / 60.0).round() as i64
}
