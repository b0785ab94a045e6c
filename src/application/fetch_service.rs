// Fetch service - owns the live poll loop and one-shot device fetches
use crate::application::device_gateway::{DeviceGateway, FetchEvent, RequestSequence};
use crate::infrastructure::device_client::ApiEndpoint;
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Spawns fetch tasks and hands their completions to the UI loop over the
/// event channel. Tasks never touch dashboard state directly.
pub struct FetchService {
    gateway: Arc<dyn DeviceGateway>,
    events: mpsc::Sender<FetchEvent>,
    seq: RequestSequence,
    generation: u64,
    poll_task: Option<JoinHandle<()>>,
}

impl FetchService {
    pub fn new(
        gateway: Arc<dyn DeviceGateway>,
        events: mpsc::Sender<FetchEvent>,
        seq: RequestSequence,
    ) -> Self {
        Self {
            gateway,
            events,
            seq,
            generation: 0,
            poll_task: None,
        }
    }

    /// Generation of the current poll loop. Completions stamped with an
    /// older generation belong to a replaced connection.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// (Re)start the live poll loop against `endpoint`. The first tick fires
    /// immediately. The previous loop is aborted, and the generation bump
    /// orphans whatever it still had in flight, even a response that takes
    /// its sequence number after this call.
    pub fn restart_live_poll(&mut self, endpoint: ApiEndpoint, interval: Duration) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        self.generation += 1;

        // tokio's interval panics on a zero period.
        let interval = interval.max(Duration::from_millis(1));

        let gateway = self.gateway.clone();
        let events = self.events.clone();
        let seq = self.seq.clone();
        let generation = self.generation;
        tracing::debug!("Starting live poll against {} every {:?}", endpoint.base(), interval);

        self.poll_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;

                // One detached task per tick so a slow response cannot stall
                // the cadence; overlapping responses are ordered by sequence.
                let seq_no = seq.next();
                let gateway = gateway.clone();
                let events = events.clone();
                let endpoint = endpoint.clone();
                tokio::spawn(async move {
                    let result = gateway.fetch_live(&endpoint).await;
                    let _ = events
                        .send(FetchEvent::Live { generation, seq: seq_no, result })
                        .await;
                });
            }
        }));
    }

    /// One-shot fetch of the device-stored history array.
    pub fn request_history(&self, endpoint: ApiEndpoint) {
        let generation = self.generation;
        let seq_no = self.seq.next();
        let gateway = self.gateway.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            tracing::debug!("Fetching API history from {}", endpoint.history_url());
            let result = gateway.fetch_history(&endpoint).await;
            let _ = events
                .send(FetchEvent::History { generation, seq: seq_no, result })
                .await;
        });
    }

    /// Fetch the device's history CSV and save it next to the binary.
    pub fn request_csv_download(&self, endpoint: ApiEndpoint) {
        let gateway = self.gateway.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = download_csv(gateway.as_ref(), &endpoint).await;
            let _ = events.send(FetchEvent::CsvSaved { result }).await;
        });
    }
}

impl Drop for FetchService {
    fn drop(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }
}

async fn download_csv(
    gateway: &dyn DeviceGateway,
    endpoint: &ApiEndpoint,
) -> anyhow::Result<PathBuf> {
    let body = gateway.fetch_history_csv(endpoint).await?;
    let filename = format!(
        "ambient-history-{}.csv",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    );
    let path = PathBuf::from(filename);
    tokio::fs::write(&path, &body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
