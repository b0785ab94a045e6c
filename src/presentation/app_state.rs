// Dashboard state owned by the terminal event loop
use crate::application::device_gateway::FetchEvent;
use crate::application::fetch_service::FetchService;
use crate::domain::history::{ApiHistory, ChartMode, ConnectionStatus, FetchStatus, RollingHistory};
use crate::domain::reading::{HistoryRecord, SensorReading};
use crate::infrastructure::device_client::ApiEndpoint;
use chrono::Local;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Whether keystrokes edit the address field or drive the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// All mutable dashboard state. Only the event loop writes here; fetch
/// tasks report back through [`FetchEvent`]s, so no field needs a lock.
pub struct AppState {
    pub address_input: String,
    pub input_mode: InputMode,
    pub endpoint: ApiEndpoint,
    pub conn_status: ConnectionStatus,
    pub latest: Option<SensorReading>,
    pub history: RollingHistory,
    pub api_history: ApiHistory,
    pub chart_mode: ChartMode,
    pub hover: Option<(u16, u16)>,
    pub last_csv: Option<PathBuf>,
    pub should_quit: bool,
    live_floor: u64,
    history_floor: u64,
    fetcher: FetchService,
    poll_interval: Duration,
}

impl AppState {
    pub fn new(
        address: String,
        history_capacity: usize,
        poll_interval: Duration,
        fetcher: FetchService,
    ) -> Self {
        let endpoint = ApiEndpoint::from_input(&address);
        Self {
            address_input: address,
            input_mode: InputMode::Normal,
            endpoint,
            conn_status: ConnectionStatus::Connecting,
            latest: None,
            history: RollingHistory::new(history_capacity),
            api_history: ApiHistory::default(),
            chart_mode: ChartMode::Live,
            hover: None,
            last_csv: None,
            should_quit: false,
            live_floor: 0,
            history_floor: 0,
            fetcher,
            poll_interval,
        }
    }

    /// Adopt the current address input and start over: clear both buffers
    /// and restart the poll loop. The restart bumps the fetch generation,
    /// which orphans every response still in flight for the old device.
    pub fn connect(&mut self) {
        self.address_input = self.address_input.trim().to_string();
        self.endpoint = ApiEndpoint::from_input(&self.address_input);

        self.conn_status = ConnectionStatus::Connecting;
        self.latest = None;
        self.history.clear();
        self.api_history = ApiHistory::default();

        self.fetcher
            .restart_live_poll(self.endpoint.clone(), self.poll_interval);
    }

    /// Switch the chart between the rolling buffer and the device history.
    /// Entering api mode requests the history only when the cache has
    /// nothing usable; a pending load or loaded data is left alone.
    pub fn set_chart_mode(&mut self, mode: ChartMode) {
        self.chart_mode = mode;
        if mode == ChartMode::Api
            && matches!(
                self.api_history.status,
                FetchStatus::Idle | FetchStatus::Error
            )
        {
            self.api_history.status = FetchStatus::Loading;
            self.fetcher.request_history(self.endpoint.clone());
        }
    }

    pub fn download_csv(&self) {
        self.fetcher.request_csv_download(self.endpoint.clone());
    }

    /// Fold one completed fetch into the state. Completions from a replaced
    /// connection are ignored, as are responses at or below their stream's
    /// floor, which lost the race to a newer completion.
    pub fn apply_event(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::Live { generation, seq, result } => {
                if generation != self.fetcher.generation() {
                    debug!(
                        "Dropping live response from a replaced connection (gen {})",
                        generation
                    );
                    return;
                }
                if seq <= self.live_floor {
                    debug!(
                        "Dropping stale live response (seq {} <= floor {})",
                        seq, self.live_floor
                    );
                    return;
                }
                self.live_floor = seq;

                match result {
                    Ok(reading) => {
                        self.history.push(HistoryRecord::from_live(&reading, Local::now()));
                        self.latest = Some(reading);
                        self.conn_status = ConnectionStatus::Connected;
                    }
                    Err(e) => {
                        warn!("Live fetch failed: {:#}", e);
                        self.conn_status = ConnectionStatus::Error;
                    }
                }
            }
            FetchEvent::History { generation, seq, result } => {
                if generation != self.fetcher.generation() {
                    debug!(
                        "Dropping history response from a replaced connection (gen {})",
                        generation
                    );
                    return;
                }
                if seq <= self.history_floor {
                    debug!(
                        "Dropping stale history response (seq {} <= floor {})",
                        seq, self.history_floor
                    );
                    return;
                }
                self.history_floor = seq;

                match result {
                    Ok(records) => {
                        debug!("API history loaded ({} readings)", records.len());
                        self.api_history.replace(records);
                    }
                    Err(e) => {
                        warn!("API history fetch failed: {:#}", e);
                        self.api_history.status = FetchStatus::Error;
                    }
                }
            }
            FetchEvent::CsvSaved { result } => match result {
                Ok(path) => {
                    debug!("History CSV saved to {}", path.display());
                    self.last_csv = Some(path);
                }
                Err(e) => {
                    warn!("CSV download failed: {:#}", e);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::device_gateway::{DeviceGateway, RequestSequence};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct StubGateway {
        live_calls: AtomicUsize,
        history_calls: AtomicUsize,
    }

    #[async_trait]
    impl DeviceGateway for StubGateway {
        async fn fetch_live(&self, _endpoint: &ApiEndpoint) -> anyhow::Result<SensorReading> {
            self.live_calls.fetch_add(1, Ordering::SeqCst);
            Ok(SensorReading {
                pm2p5: Some(3.4),
                ..Default::default()
            })
        }

        async fn fetch_history(
            &self,
            _endpoint: &ApiEndpoint,
        ) -> anyhow::Result<Vec<HistoryRecord>> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![HistoryRecord {
                time_label: "12:00".to_string(),
                pm2p5: 5.0,
                co2: 600.0,
                temperature: 21.0,
                humidity: 45.0,
                voc_index: 100.0,
                nox_index: 1.0,
                pm1p0: 3.0,
            }])
        }

        async fn fetch_history_csv(&self, _endpoint: &ApiEndpoint) -> anyhow::Result<Bytes> {
            Ok(Bytes::from_static(b"time,pm2p5\n"))
        }
    }

    fn test_app(
        gateway: Arc<StubGateway>,
        tx: mpsc::Sender<FetchEvent>,
    ) -> (AppState, RequestSequence) {
        let seq = RequestSequence::default();
        let fetcher = FetchService::new(gateway, tx, seq.clone());
        let app = AppState::new(
            "ambient.local".to_string(),
            120,
            Duration::from_secs(60),
            fetcher,
        );
        (app, seq)
    }

    #[tokio::test]
    async fn test_switch_to_api_fetches_only_when_unloaded() {
        let (tx, mut rx) = mpsc::channel(16);
        let gateway = Arc::new(StubGateway::default());
        let (mut app, _seq) = test_app(gateway.clone(), tx);

        app.set_chart_mode(ChartMode::Api);
        assert_eq!(app.api_history.status, FetchStatus::Loading);

        // Toggling away and back while a load is pending must not refetch.
        app.set_chart_mode(ChartMode::Live);
        app.set_chart_mode(ChartMode::Api);

        let event = rx.recv().await.unwrap();
        app.apply_event(event);
        assert_eq!(app.api_history.status, FetchStatus::Loaded);
        assert_eq!(app.api_history.records.len(), 1);
        assert_eq!(gateway.history_calls.load(Ordering::SeqCst), 1);

        // Loaded data is reused without another request.
        app.set_chart_mode(ChartMode::Live);
        app.set_chart_mode(ChartMode::Api);
        assert_eq!(gateway.history_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_switch_to_api_refetches_after_error() {
        let (tx, mut rx) = mpsc::channel(16);
        let gateway = Arc::new(StubGateway::default());
        let (mut app, seq) = test_app(gateway.clone(), tx);

        let generation = app.fetcher.generation();
        app.set_chart_mode(ChartMode::Api);
        let failed = seq.current();
        app.apply_event(FetchEvent::History {
            generation,
            seq: failed,
            result: Err(anyhow::anyhow!("connection refused")),
        });
        assert_eq!(app.api_history.status, FetchStatus::Error);

        // The stub's own completion carries the same sequence number as the
        // failure that superseded it, so it must not clear the error.
        let stale = rx.recv().await.unwrap();
        app.apply_event(stale);
        assert_eq!(app.api_history.status, FetchStatus::Error);

        app.set_chart_mode(ChartMode::Live);
        app.set_chart_mode(ChartMode::Api);
        assert_eq!(app.api_history.status, FetchStatus::Loading);

        let retry = rx.recv().await.unwrap();
        app.apply_event(retry);
        assert_eq!(app.api_history.status, FetchStatus::Loaded);
        assert_eq!(gateway.history_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_connect_clears_buffers_and_restarts_polling() {
        let (tx, mut rx) = mpsc::channel(16);
        let gateway = Arc::new(StubGateway::default());
        let (mut app, _seq) = test_app(gateway, tx);

        app.latest = Some(SensorReading {
            pm2p5: Some(9.0),
            ..Default::default()
        });
        app.history.push(HistoryRecord::from_live(&SensorReading::default(), Local::now()));
        app.api_history.replace(Vec::new());

        app.address_input = "  10.0.0.9  ".to_string();
        app.connect();

        assert_eq!(app.address_input, "10.0.0.9");
        assert_eq!(app.endpoint.base(), "http://10.0.0.9");
        assert_eq!(app.conn_status, ConnectionStatus::Connecting);
        assert!(app.latest.is_none());
        assert!(app.history.is_empty());
        assert_eq!(app.api_history.status, FetchStatus::Idle);

        // The restarted poll loop fires without waiting a full interval.
        match rx.recv().await.unwrap() {
            FetchEvent::Live { result, .. } => assert!(result.is_ok()),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connect_drops_in_flight_responses() {
        let (tx, _rx) = mpsc::channel(16);
        let gateway = Arc::new(StubGateway::default());
        let (mut app, seq) = test_app(gateway, tx);

        let old_generation = app.fetcher.generation();
        let stale = seq.next();
        app.connect();

        app.apply_event(FetchEvent::Live {
            generation: old_generation,
            seq: stale,
            result: Ok(SensorReading {
                pm2p5: Some(1.0),
                ..Default::default()
            }),
        });
        assert!(app.latest.is_none());
        assert_eq!(app.conn_status, ConnectionStatus::Connecting);

        let generation = app.fetcher.generation();
        let fresh = seq.next();
        app.apply_event(FetchEvent::Live {
            generation,
            seq: fresh,
            result: Ok(SensorReading {
                pm2p5: Some(2.0),
                ..Default::default()
            }),
        });
        assert_eq!(app.conn_status, ConnectionStatus::Connected);
        assert_eq!(app.history.len(), 1);
    }

    #[tokio::test]
    async fn test_reconnect_drops_responses_sequenced_after_the_restart() {
        let (tx, _rx) = mpsc::channel(16);
        let gateway = Arc::new(StubGateway::default());
        let (mut app, seq) = test_app(gateway, tx);

        let old_generation = app.fetcher.generation();
        app.connect();

        // An aborted poll loop can still be mid-tick and take its sequence
        // number after the restart; the generation stamp gives it away.
        let late = seq.next();
        app.apply_event(FetchEvent::Live {
            generation: old_generation,
            seq: late,
            result: Ok(SensorReading {
                pm2p5: Some(7.0),
                ..Default::default()
            }),
        });
        assert!(app.latest.is_none());
        assert!(app.history.is_empty());
        assert_eq!(app.conn_status, ConnectionStatus::Connecting);
    }

    #[tokio::test]
    async fn test_older_live_response_cannot_overwrite_newer() {
        let (tx, _rx) = mpsc::channel(16);
        let gateway = Arc::new(StubGateway::default());
        let (mut app, seq) = test_app(gateway, tx);

        let generation = app.fetcher.generation();
        let first = seq.next();
        let second = seq.next();

        app.apply_event(FetchEvent::Live {
            generation,
            seq: second,
            result: Ok(SensorReading {
                pm2p5: Some(9.0),
                ..Default::default()
            }),
        });
        app.apply_event(FetchEvent::Live {
            generation,
            seq: first,
            result: Ok(SensorReading {
                pm2p5: Some(1.0),
                ..Default::default()
            }),
        });

        assert_eq!(app.latest.as_ref().unwrap().pm2p5, Some(9.0));
        assert_eq!(app.history.len(), 1);
    }

    #[tokio::test]
    async fn test_live_error_keeps_last_reading() {
        let (tx, _rx) = mpsc::channel(16);
        let gateway = Arc::new(StubGateway::default());
        let (mut app, seq) = test_app(gateway, tx);

        let generation = app.fetcher.generation();
        let ok_seq = seq.next();
        app.apply_event(FetchEvent::Live {
            generation,
            seq: ok_seq,
            result: Ok(SensorReading {
                co2: Some(640.0),
                ..Default::default()
            }),
        });

        let err_seq = seq.next();
        app.apply_event(FetchEvent::Live {
            generation,
            seq: err_seq,
            result: Err(anyhow::anyhow!("timed out")),
        });

        // Cards keep showing the last good values under an error banner.
        assert_eq!(app.conn_status, ConnectionStatus::Error);
        assert_eq!(app.latest.as_ref().unwrap().co2, Some(640.0));
        assert_eq!(app.history.len(), 1);
    }
}
