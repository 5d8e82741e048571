//! Time windows
//!
//! A `TimeWindow` is an inclusive `[start, end]` pair of unix timestamps in
//! seconds. Before an archive is read, the caller's window is clamped to the
//! archive's last update so that no slot past the newest authoritative data
//! is requested.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive time window in unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Window between two instants, truncated to whole seconds
    pub fn from_datetimes(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(start.timestamp(), end.timestamp())
    }

    /// Window bounds scaled to milliseconds
    pub fn to_millis(&self) -> (i64, i64) {
        (self.start.saturating_mul(1000), self.end.saturating_mul(1000))
    }

    /// Check if a timestamp (seconds) falls inside the window
    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Clamp `requested` to an archive's last update
///
/// The end moves back to `last_update` only when it lies strictly inside
/// the window; otherwise the window is returned unchanged.
pub fn resolve(requested: TimeWindow, last_update: i64) -> TimeWindow {
    if requested.start < last_update && last_update < requested.end {
        TimeWindow::new(requested.start, last_update)
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clamp_inside() {
        let w = TimeWindow::new(100, 200);
        assert_eq!(resolve(w, 150), TimeWindow::new(100, 150));
    }

    #[test]
    fn test_clamp_outside_or_on_bounds() {
        let w = TimeWindow::new(100, 200);
        for t in [50, 100, 200, 250] {
            assert_eq!(resolve(w, t), w, "last_update {} should not clamp", t);
        }
    }

    #[test]
    fn test_clamp_idempotent() {
        let windows = [
            TimeWindow::new(100, 200),
            TimeWindow::new(0, 0),
            TimeWindow::new(300, 100),
            TimeWindow::new(-50, 50),
        ];
        for w in windows {
            for t in [-100, 0, 99, 100, 101, 150, 199, 200, 201, 1000] {
                let once = resolve(w, t);
                assert_eq!(resolve(once, t), once);
            }
        }
    }

    #[test]
    fn test_from_datetimes_truncates() {
        let start = Utc.timestamp_millis_opt(1_494_720_000_237).unwrap();
        let end = Utc.timestamp_millis_opt(1_494_806_399_999).unwrap();
        let w = TimeWindow::from_datetimes(start, end);
        assert_eq!(w, TimeWindow::new(1_494_720_000, 1_494_806_399));
        assert_eq!(w.to_millis(), (1_494_720_000_000, 1_494_806_399_000));
        assert!(w.contains(1_494_720_000));
        assert!(!w.contains(1_494_806_400));
    }
}
