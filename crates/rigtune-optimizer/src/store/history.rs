//! Sample history
//!
//! Append-only, chronological, and capacity-bounded. Trimming is an explicit
//! step so the cycle can finish its analysis before old samples go.

use rigtune_common::{Sample, HISTORY_CAPACITY, HISTORY_RETAIN};
use tracing::debug;

use crate::config::HistorySettings;

/// Bounded log of samples, oldest first
#[derive(Debug, Clone)]
pub struct HistoryStore {
    samples: Vec<Sample>,
    /// Trim once length exceeds this
    capacity: usize,
    /// Samples kept by a trim
    retain: usize,
}

impl HistoryStore {
    /// Create a store; `retain` is capped at `capacity`
    pub fn new(capacity: usize, retain: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity + 1),
            capacity,
            retain: retain.min(capacity),
        }
    }

    pub fn from_settings(settings: &HistorySettings) -> Self {
        Self::new(settings.capacity, settings.retain)
    }

    /// Add a sample at the end
    pub fn append(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// The last `n` samples (fewer if history is shorter), oldest first
    pub fn recent(&self, n: usize) -> &[Sample] {
        let start = self.samples.len().saturating_sub(n);
        &self.samples[start..]
    }

    /// All retained samples, oldest first
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Drop all but the most recent `retain` samples once over capacity.
    ///
    /// Returns the number of samples discarded.
    pub fn trim(&mut self) -> usize {
        if self.samples.len() <= self.capacity {
            return 0;
        }
        let discard = self.samples.len() - self.retain;
        self.samples.drain(..discard);
        debug!(discarded = discard, retained = self.samples.len(), "Trimmed history");
        discard
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY, HISTORY_RETAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn sample_at(i: i64) -> Sample {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Sample::new(100.0 + i as f64, 800.0, 70.0, 20, 1, 60_000.0)
            .at(base + Duration::minutes(15 * i))
    }

    #[test]
    fn test_recent_shorter_history() {
        let mut store = HistoryStore::default();
        for i in 0..3 {
            store.append(sample_at(i));
        }
        assert_eq!(store.recent(10).len(), 3);
        assert_eq!(store.recent(2)[0].hashrate, 101.0);
        assert_eq!(store.recent(0).len(), 0);
    }

    #[test]
    fn test_trim_after_101_keeps_latest_50() {
        let mut store = HistoryStore::default();
        for i in 0..101 {
            store.append(sample_at(i));
        }

        let discarded = store.trim();

        assert_eq!(discarded, 51);
        assert_eq!(store.len(), 50);
        let expected: Vec<_> = (51..101).map(|i| sample_at(i).timestamp).collect();
        let actual: Vec<_> = store.samples().iter().map(|s| s.timestamp).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_trim_at_capacity_is_noop() {
        let mut store = HistoryStore::default();
        for i in 0..100 {
            store.append(sample_at(i));
        }
        assert_eq!(store.trim(), 0);
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn test_trim_does_not_touch_borrowed_snapshot() {
        let mut store = HistoryStore::new(4, 2);
        for i in 0..5 {
            store.append(sample_at(i));
        }
        let snapshot: Vec<Sample> = store.recent(5).to_vec();
        store.trim();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(store.len(), 2);
        assert_eq!(store.latest().unwrap().timestamp, sample_at(4).timestamp);
    }

    #[test]
    fn test_retain_capped_at_capacity() {
        let store = HistoryStore::new(10, 50);
        assert_eq!(store.capacity, 10);
        assert_eq!(store.retain, 10);
    }
}
