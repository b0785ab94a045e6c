// Sensor reading domain models
use chrono::{DateTime, Local};
use serde::Deserialize;

/// One live snapshot as the device reports it. Every field is optional on
/// the wire; absent values stay None so the cards can show a placeholder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorReading {
    pub timestamp: Option<String>,
    pub pm2p5: Option<f64>,
    pub co2: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    #[serde(rename = "vocIndex")]
    pub voc_index: Option<f64>,
    #[serde(rename = "noxIndex")]
    pub nox_index: Option<f64>,
    pub pm1p0: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesId {
    Pm2p5,
    Co2,
    Temperature,
    Humidity,
    VocIndex,
    NoxIndex,
    Pm1p0,
}

/// A fully defaulted reading as stored in the chart buffers, together with
/// the label shown on the x axis and in the tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub time_label: String,
    pub pm2p5: f64,
    pub co2: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub voc_index: f64,
    pub nox_index: f64,
    pub pm1p0: f64,
}

impl HistoryRecord {
    /// Build a record from a live snapshot taken at `at`. Missing fields
    /// become 0; live labels carry seconds.
    pub fn from_live(reading: &SensorReading, at: DateTime<Local>) -> Self {
        Self {
            time_label: at.format("%H:%M:%S").to_string(),
            pm2p5: reading.pm2p5.unwrap_or(0.0),
            co2: reading.co2.unwrap_or(0.0),
            temperature: reading.temperature.unwrap_or(0.0),
            humidity: reading.humidity.unwrap_or(0.0),
            voc_index: reading.voc_index.unwrap_or(0.0),
            nox_index: reading.nox_index.unwrap_or(0.0),
            pm1p0: reading.pm1p0.unwrap_or(0.0),
        }
    }

    pub fn value(&self, series: SeriesId) -> f64 {
        match series {
            SeriesId::Pm2p5 => self.pm2p5,
            SeriesId::Co2 => self.co2,
            SeriesId::Temperature => self.temperature,
            SeriesId::Humidity => self.humidity,
            SeriesId::VocIndex => self.voc_index,
            SeriesId::NoxIndex => self.nox_index,
            SeriesId::Pm1p0 => self.pm1p0,
        }
    }
}

/// Timestamp attached to a stored history entry. Devices report either
/// epoch milliseconds or ISO-8601 text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntryTimestamp {
    Epoch(f64),
    Text(String),
}

// Offsetless timestamps are taken as local time.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

impl EntryTimestamp {
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        match self {
            EntryTimestamp::Epoch(ms) => {
                DateTime::from_timestamp_millis(*ms as i64).map(|utc| utc.with_timezone(&Local))
            }
            EntryTimestamp::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Local))
                .ok()
                .or_else(|| {
                    NAIVE_FORMATS
                        .iter()
                        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(text, fmt).ok())
                        .and_then(|naive| naive.and_local_timezone(Local).single())
                }),
        }
    }

    /// History labels carry hours and minutes only.
    pub fn time_label(&self) -> String {
        match self.to_local() {
            Some(dt) => dt.format("%H:%M").to_string(),
            None => "--".to_string(),
        }
    }
}
