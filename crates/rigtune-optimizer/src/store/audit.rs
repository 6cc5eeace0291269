//! Decision audit log
//!
//! Every decision is recorded with its analysis snapshot and ordered action
//! list. Retention is bounded:
//! - count: oldest records evicted past `max_records`
//! - age: records older than `max_age` evicted on append
//!
//! Sinks receive each record as it is appended, independently of retention.

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rigtune_common::{Action, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AuditSettings;
use crate::engine::Analysis;

/// One decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Unique, time-ordered record ID
    pub record_id: Uuid,
    /// When the decision was made
    pub timestamp: DateTime<Utc>,
    /// Analysis the decision was based on
    pub analysis: Analysis,
    /// Actions, in rule order
    pub actions: Vec<Action>,
}

impl DecisionRecord {
    pub fn new(analysis: Analysis, actions: Vec<Action>) -> Self {
        Self {
            record_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            analysis,
            actions,
        }
    }

    /// Override the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Convert to a single JSON line
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Destination for appended records
pub trait AuditSink: Send + Sync {
    /// Write one record
    fn write(&self, record: &DecisionRecord);

    /// Flush pending records
    fn flush(&self);
}

/// Logs each record through `tracing`
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn write(&self, record: &DecisionRecord) {
        let actions: Vec<&str> = record.actions.iter().map(Action::as_str).collect();
        debug!(
            record_id = %record.record_id,
            timestamp = %record.timestamp,
            actions = ?actions,
            "Decision recorded"
        );
    }

    fn flush(&self) {
        // Logging is immediate
    }
}

/// Appends records as JSON lines to a file
pub struct JsonLinesAuditSink {
    path: String,
    buffer: Arc<Mutex<Vec<String>>>,
    max_buffer_size: usize,
}

impl JsonLinesAuditSink {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            buffer: Arc::new(Mutex::new(Vec::new())),
            max_buffer_size: 1,
        }
    }

    /// Hold up to `size` records before writing
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size.max(1);
        self
    }

    fn write_lines(&self, lines: &[String]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        for line in lines {
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    fn drain(&self, buffer: &mut Vec<String>) {
        if buffer.is_empty() {
            return;
        }
        match self.write_lines(buffer) {
            Ok(()) => {
                debug!(path = %self.path, count = buffer.len(), "Flushed audit buffer");
                buffer.clear();
            }
            Err(e) => warn!(path = %self.path, "Failed to write audit records: {}", e),
        }
    }
}

impl AuditSink for JsonLinesAuditSink {
    fn write(&self, record: &DecisionRecord) {
        let line = match record.to_json() {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to serialize audit record: {}", e);
                return;
            }
        };

        let mut buffer = self.buffer.lock();
        buffer.push(line);
        if buffer.len() >= self.max_buffer_size {
            self.drain(&mut buffer);
        }
    }

    fn flush(&self) {
        let mut buffer = self.buffer.lock();
        self.drain(&mut buffer);
    }
}

/// Retained decision records, oldest first
pub struct AuditLog {
    records: VecDeque<DecisionRecord>,
    max_records: usize,
    max_age: Option<Duration>,
    sinks: Vec<Box<dyn AuditSink>>,
    evicted: u64,
}

impl AuditLog {
    /// Create a log keeping at most `max_records`
    pub fn new(max_records: usize) -> Self {
        Self {
            records: VecDeque::new(),
            max_records: max_records.max(1),
            max_age: None,
            sinks: Vec::new(),
            evicted: 0,
        }
    }

    /// Build from settings, attaching the JSON-lines sink if configured
    pub fn from_settings(settings: &AuditSettings) -> Self {
        let mut log = Self::new(settings.max_records);
        if let Some(secs) = settings.max_age_secs {
            match i64::try_from(secs).ok().and_then(Duration::try_seconds) {
                Some(max_age) => log = log.with_max_age(max_age),
                None => warn!(
                    max_age_secs = secs,
                    "Audit max age out of range; age retention disabled"
                ),
            }
        }
        if let Some(path) = &settings.export_path {
            log.add_sink(Box::new(
                JsonLinesAuditSink::new(path).with_buffer_size(settings.buffer_size),
            ));
        }
        log
    }

    /// Also evict records older than `max_age`
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Add a sink
    pub fn add_sink(&mut self, sink: Box<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    /// Record a decision and enforce retention
    pub fn append(&mut self, record: DecisionRecord) {
        for sink in &self.sinks {
            sink.write(&record);
        }

        let now = record.timestamp;
        self.records.push_back(record);

        // An unrepresentable cutoff means nothing is old enough to evict
        if let Some(cutoff) = self.max_age.and_then(|age| now.checked_sub_signed(age)) {
            while self
                .records
                .front()
                .map_or(false, |oldest| oldest.timestamp < cutoff)
            {
                self.records.pop_front();
                self.evicted += 1;
            }
        }

        while self.records.len() > self.max_records {
            self.records.pop_front();
            self.evicted += 1;
        }
    }

    /// Retained records, oldest first
    pub fn records(&self) -> impl Iterator<Item = &DecisionRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&DecisionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records dropped by retention so far
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Export retained records, one JSON object per line
    pub fn to_json_lines(&self) -> Result<String> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.to_json()?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Flush all sinks
    pub fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::from_settings(&AuditSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn analysis() -> Analysis {
        Analysis {
            hashrate_mean: 70.0,
            hashrate_stddev: 1.5,
            power_mean: 700.0,
            temp_mean: 80.0,
            profitability_mean: 0.000007,
            efficiency: 0.10,
            rejection_rate: 0.08,
            sample_count: 3,
        }
    }

    fn record_at(minute: i64) -> DecisionRecord {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        DecisionRecord::new(analysis(), vec![Action::Noop]).at(base + Duration::minutes(minute))
    }

    #[test]
    fn test_count_retention() {
        let mut log = AuditLog::new(3);
        for i in 0..5 {
            log.append(record_at(i));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.evicted(), 2);
        assert_eq!(log.records().next().unwrap().timestamp, record_at(2).timestamp);
    }

    #[test]
    fn test_age_retention() {
        let mut log = AuditLog::new(100).with_max_age(Duration::minutes(30));
        for i in [0, 10, 20, 45] {
            log.append(record_at(i));
        }
        // cutoff is minute 15
        assert_eq!(log.len(), 2);
        assert_eq!(log.evicted(), 2);
    }

    #[test]
    fn test_huge_max_age_keeps_appended_record() {
        for secs in [u64::MAX, 10_000_000_000_000] {
            let settings = AuditSettings {
                max_age_secs: Some(secs),
                ..AuditSettings::default()
            };
            let mut log = AuditLog::from_settings(&settings);
            log.append(record_at(0));
            log.append(record_at(1));
            assert_eq!(log.len(), 2);
            assert_eq!(log.evicted(), 0);
        }
    }

    #[test]
    fn test_settings_buffer_size_applies_to_export() {
        let path = std::env::temp_dir().join(format!("rigtune-audit-{}.jsonl", Uuid::new_v4()));
        let settings = AuditSettings {
            export_path: Some(path.to_string_lossy().to_string()),
            buffer_size: 2,
            ..AuditSettings::default()
        };
        let mut log = AuditLog::from_settings(&settings);

        log.append(record_at(0));
        assert!(!path.exists());
        log.append(record_at(1));
        log.append(record_at(2));
        log.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_age_cutoff_before_min_timestamp_skips_eviction() {
        let mut log = AuditLog::new(10).with_max_age(Duration::days(365));
        log.append(record_at(0).at(DateTime::<Utc>::MIN_UTC));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_json_lines_export_preserves_fields() {
        let mut log = AuditLog::new(10);
        log.append(DecisionRecord::new(
            analysis(),
            vec![Action::IncreaseHashrate, Action::ReduceHeat],
        ));

        let export = log.to_json_lines().unwrap();
        assert_eq!(export.lines().count(), 1);

        let parsed: DecisionRecord = serde_json::from_str(export.trim_end()).unwrap();
        assert_eq!(parsed.analysis, analysis());
        assert_eq!(parsed.actions, vec![Action::IncreaseHashrate, Action::ReduceHeat]);
        assert!(export.contains("\"increase_hashrate\""));
        assert!(export.contains("\"rejection_rate\":0.08"));
    }

    struct CountingSink(Arc<Mutex<usize>>);

    impl AuditSink for CountingSink {
        fn write(&self, _record: &DecisionRecord) {
            *self.0.lock() += 1;
        }

        fn flush(&self) {}
    }

    #[test]
    fn test_sinks_see_evicted_records() {
        let count = Arc::new(Mutex::new(0));
        let mut log = AuditLog::new(1);
        log.add_sink(Box::new(CountingSink(count.clone())));
        for i in 0..4 {
            log.append(record_at(i));
        }
        assert_eq!(*count.lock(), 4);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_json_lines_sink_appends_to_file() {
        let path = std::env::temp_dir().join(format!("rigtune-audit-{}.jsonl", Uuid::new_v4()));
        let path_str = path.to_string_lossy().to_string();

        let sink = JsonLinesAuditSink::new(&path_str).with_buffer_size(2);
        sink.write(&record_at(0));
        assert!(!path.exists());
        sink.write(&record_at(1));
        sink.write(&record_at(2));
        sink.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        std::fs::remove_file(&path).unwrap();
    }
}
