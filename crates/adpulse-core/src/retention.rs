//! Age-based retention.
//!
//! Each event log is pruned independently at the start of every delivery
//! cycle, before metrics and payload construction, so stale entries never
//! reach the aggregator or the network.

use crate::events::Timestamped;

/// Drop every entry with `now - timestamp >= max_age`. Entries with
/// timestamps in the future (clock skew across a restore) are kept.
pub fn prune_older_than<T: Timestamped>(log: &mut Vec<T>, now_ms: u64, max_age_ms: u64) {
    log.retain(|e| now_ms.saturating_sub(e.timestamp_ms()) < max_age_ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ClickEvent;

    fn click(timestamp_ms: u64) -> ClickEvent {
        ClickEvent {
            timestamp_ms,
            x: 0,
            y: 0,
            target: "DIV".to_string(),
            path: "/".to_string(),
        }
    }

    #[test]
    fn test_prunes_entries_at_or_past_max_age() {
        let max_age = 1_000;
        let now = 10_000;
        let mut log = vec![click(8_999), click(9_000), click(9_001), click(10_000)];
        prune_older_than(&mut log, now, max_age);
        let kept: Vec<u64> = log.iter().map(|c| c.timestamp_ms).collect();
        // 8_999 and 9_000 are both >= max_age old; 9_001 is inside the window.
        assert_eq!(kept, vec![9_001, 10_000]);
    }

    #[test]
    fn test_empty_log_is_noop() {
        let mut log: Vec<ClickEvent> = Vec::new();
        prune_older_than(&mut log, 1, 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_future_timestamps_survive() {
        let mut log = vec![click(20_000)];
        prune_older_than(&mut log, 10_000, 1_000);
        assert_eq!(log.len(), 1);
    }
}
