//! Participant identities.

use chrono::Utc;
use common::types::Role;
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Fresh identity of the form `<role>-<unix millis>`, e.g. `host-1718000000000`.
///
/// Stamps are strictly increasing within the process, so two identities
/// generated in the same millisecond still differ.
pub fn generate_identity(role: Role) -> String {
    format!("{}-{}", role.as_str(), next_stamp(Utc::now().timestamp_millis()))
}

fn next_stamp(now_millis: i64) -> i64 {
    let mut last = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let next = now_millis.max(last.saturating_add(1));
        match LAST_STAMP.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}
