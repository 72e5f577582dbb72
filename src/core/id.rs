use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Time-based id in the `<prefix>_<millis>` shape the original records use.
/// Two allocations within the same millisecond bump past the previous value
/// so ids stay unique and sortable within a process.
pub fn time_based(prefix: &str) -> String {
    let now = Utc::now().timestamp_millis();
    let millis = LAST_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .map(|last| now.max(last + 1))
        .unwrap_or(now);
    format!("{prefix}_{millis}")
}

pub fn user_id() -> String {
    time_based("user")
}

pub fn session_id() -> String {
    time_based("session")
}
