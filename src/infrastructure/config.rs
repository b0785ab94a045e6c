use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub device: DeviceSettings,
    #[serde(default)]
    pub chart: ChartSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceSettings {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartSettings {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            address: default_address(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
        }
    }
}

fn default_address() -> String {
    "ambient.local".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_history_capacity() -> usize {
    120
}

/// Load `config/dashboard.{toml,...}` if present; every key has a default so
/// the dashboard runs without a file.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let raw = r#"
            [device]
            address = "192.168.4.22"
            poll_interval_ms = 500

            [chart]
            history_capacity = 60
        "#;
        let cfg: DashboardConfig = toml::from_str(raw).unwrap();

        assert_eq!(cfg.device.address, "192.168.4.22");
        assert_eq!(cfg.device.poll_interval_ms, 500);
        assert_eq!(cfg.chart.history_capacity, 60);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg: DashboardConfig = toml::from_str("").unwrap();

        assert_eq!(cfg.device.address, "ambient.local");
        assert_eq!(cfg.device.poll_interval_ms, 2000);
        assert_eq!(cfg.chart.history_capacity, 120);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let raw = "[device]\naddress = \"10.0.0.5\"\n";
        let cfg: DashboardConfig = toml::from_str(raw).unwrap();

        assert_eq!(cfg.device.address, "10.0.0.5");
        assert_eq!(cfg.device.poll_interval_ms, 2000);
        assert_eq!(cfg.chart.history_capacity, 120);
    }
}
