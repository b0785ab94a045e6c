// Display formatting and level badges

/// Format a possibly absent value with a fixed number of decimals; absent
/// values render as the "--" placeholder.
pub fn fmt_value(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "--".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeLevel {
    Ok,
    Warn,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub level: BadgeLevel,
}

pub fn pm_badge(pm: Option<f64>) -> Option<Badge> {
    let pm = pm?;
    let badge = if pm < 12.0 {
        Badge { label: "Good", level: BadgeLevel::Ok }
    } else if pm < 35.0 {
        Badge { label: "Moderate", level: BadgeLevel::Warn }
    } else {
        Badge { label: "Unhealthy", level: BadgeLevel::Danger }
    };
    Some(badge)
}

pub fn co2_badge(co2: Option<f64>) -> Option<Badge> {
    let co2 = co2?;
    let badge = if co2 < 800.0 {
        Badge { label: "Good", level: BadgeLevel::Ok }
    } else if co2 < 1500.0 {
        Badge { label: "Moderate", level: BadgeLevel::Warn }
    } else {
        Badge { label: "High", level: BadgeLevel::Danger }
    };
    Some(badge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_value_placeholder() {
        assert_eq!(fmt_value(None, 1), "--");
        assert_eq!(fmt_value(None, 0), "--");
    }

    #[test]
    fn test_fmt_value_decimals() {
        assert_eq!(fmt_value(Some(3.14159), 1), "3.1");
        assert_eq!(fmt_value(Some(1500.0), 0), "1500");
        assert_eq!(fmt_value(Some(0.0), 1), "0.0");
    }

    #[test]
    fn test_pm_badge_tiers() {
        assert_eq!(pm_badge(Some(10.0)).unwrap().label, "Good");
        assert_eq!(pm_badge(Some(20.0)).unwrap().label, "Moderate");
        assert_eq!(pm_badge(Some(50.0)).unwrap().label, "Unhealthy");
        assert_eq!(pm_badge(None), None);
    }

    #[test]
    fn test_pm_badge_boundaries() {
        assert_eq!(pm_badge(Some(11.9)).unwrap().level, BadgeLevel::Ok);
        assert_eq!(pm_badge(Some(12.0)).unwrap().level, BadgeLevel::Warn);
        assert_eq!(pm_badge(Some(35.0)).unwrap().level, BadgeLevel::Danger);
    }

    #[test]
    fn test_co2_badge_tiers() {
        assert_eq!(co2_badge(Some(700.0)).unwrap().label, "Good");
        assert_eq!(co2_badge(Some(1000.0)).unwrap().label, "Moderate");
        assert_eq!(co2_badge(Some(2000.0)).unwrap().label, "High");
        assert_eq!(co2_badge(None), None);
    }

    #[test]
    fn test_co2_badge_boundaries() {
        assert_eq!(co2_badge(Some(800.0)).unwrap().level, BadgeLevel::Warn);
        assert_eq!(co2_badge(Some(1500.0)).unwrap().level, BadgeLevel::Danger);
    }
}
