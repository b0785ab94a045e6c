// Axis scaling policy
//
// Each series is scaled independently so the chart compares trends, not
// magnitudes. The observed maximum is clamped to the series floor first,
// then headroom and rounding are applied.

pub fn pm_ceiling(max_pm: f64) -> f64 {
    (max_pm.max(10.0) * 1.25 / 5.0).ceil() * 5.0
}

pub fn co2_ceiling(max_co2: f64) -> f64 {
    (max_co2.max(500.0) * 1.15 / 50.0).ceil() * 50.0
}

/// Ceiling for the five secondary series; `floor` is the per-series minimum
/// scale (temp 10, humidity 50, voc 100, nox 10, pm1 5).
pub fn secondary_ceiling(max_value: f64, floor: f64) -> f64 {
    (max_value.max(floor) * 1.2 / 5.0).ceil() * 5.0
}
