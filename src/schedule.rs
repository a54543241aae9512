//! Daily run timing for the scheduler binary.

use std::thread;
use std::time::Duration as StdDuration;

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};

/// Longest single sleep while waiting; the clock is re-read after each one
pub const POLL_INTERVAL: StdDuration = StdDuration::from_secs(60);

/// The first daily run strictly after `now`
#[must_use]
pub fn next_run_after(now: NaiveDateTime, run_time: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(run_time);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Block until the local clock reaches `target`
pub fn wait_until(target: NaiveDateTime) {
    loop {
        let now = Local::now().naive_local();
        if now >= target {
            return;
        }
        let remaining = (target - now).to_std().unwrap_or_default();
        thread::sleep(remaining.min(POLL_INTERVAL));
    }
}
