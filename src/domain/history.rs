// Chart state domain models - rolling buffer, history cache, statuses
use super::reading::HistoryRecord;
use std::collections::VecDeque;

/// Outcome of the most recent live poll, not a persistent session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Error,
}

/// Which dataset the chart reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMode {
    Live,
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Fixed-capacity FIFO of recent readings backing the live chart mode.
/// Append at the tail, evict at the head once over capacity.
#[derive(Debug, Clone)]
pub struct RollingHistory {
    records: VecDeque<HistoryRecord>,
    capacity: usize,
}

impl RollingHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: HistoryRecord) {
        self.records.push_back(record);
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> Vec<&HistoryRecord> {
        self.records.iter().collect()
    }
}

/// One-shot fetched array of device-stored readings, replaced wholesale on
/// each successful fetch.
#[derive(Debug, Clone)]
pub struct ApiHistory {
    pub status: FetchStatus,
    pub records: Vec<HistoryRecord>,
}

impl Default for ApiHistory {
    fn default() -> Self {
        Self {
            status: FetchStatus::Idle,
            records: Vec::new(),
        }
    }
}

impl ApiHistory {
    pub fn replace(&mut self, records: Vec<HistoryRecord>) {
        self.records = records;
        self.status = FetchStatus::Loaded;
    }
}
