// Gateway trait for device API access
use crate::domain::reading::{HistoryRecord, SensorReading};
use crate::infrastructure::device_client::ApiEndpoint;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic sequence shared by all fetch tasks. Every request takes a
/// number before it starts; the app state keeps per-stream floors and drops
/// completions at or below them, so the newest request always wins.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence(Arc<AtomicU64>);

impl RequestSequence {
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Completion of one fetch task, handed to the UI loop over the event
/// channel. Live and history completions are stamped with the connection
/// generation that issued them plus a request sequence number; the UI loop
/// is the only writer of dashboard state.
#[derive(Debug)]
pub enum FetchEvent {
    Live {
        generation: u64,
        seq: u64,
        result: anyhow::Result<SensorReading>,
    },
    History {
        generation: u64,
        seq: u64,
        result: anyhow::Result<Vec<HistoryRecord>>,
    },
    CsvSaved {
        result: anyhow::Result<PathBuf>,
    },
}

#[async_trait]
pub trait DeviceGateway: Send + Sync {
    /// Fetch the current snapshot from `<address>/api`
    async fn fetch_live(&self, endpoint: &ApiEndpoint) -> anyhow::Result<SensorReading>;

    /// Fetch the stored history array from `<address>/api/history`
    async fn fetch_history(&self, endpoint: &ApiEndpoint) -> anyhow::Result<Vec<HistoryRecord>>;

    /// Fetch the stored history as CSV from `<address>/api/history/csv`
    async fn fetch_history_csv(&self, endpoint: &ApiEndpoint) -> anyhow::Result<Bytes>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_sequence_is_monotonic() {
        let seq = RequestSequence::default();
        assert_eq!(seq.current(), 0);
        let a = seq.next();
        let b = seq.next();
        assert!(b > a);
        assert_eq!(seq.current(), b);
    }

    #[test]
    fn test_request_sequence_shared_across_clones() {
        let seq = RequestSequence::default();
        let clone = seq.clone();
        let a = seq.next();
        let b = clone.next();
        assert!(b > a);
        assert_eq!(seq.current(), clone.current());
    }
}
