//! Dashboard configuration, loaded from environment variables.

use std::str::FromStr;

/// Thresholds and exclusions for the part-life estimate.
#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleConfig {
    /// Fraction of the average interval after which a part turns yellow.
    pub warn_ratio: f64,
    /// Fraction of the average interval after which a part turns orange.
    pub alert_ratio: f64,
    /// Intervals at or below this distance do not count towards averages.
    pub min_interval_km: f64,
    /// IQR fence multiplier for outlier removal.
    pub iqr_factor: f64,
    /// Days of odometer history used to project daily distance.
    pub odometer_lookback_days: i64,
    pub excluded_groups: Vec<String>,
    pub excluded_subgroups: Vec<String>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            warn_ratio: 0.65,
            alert_ratio: 0.9,
            min_interval_km: 0.1,
            iqr_factor: 1.5,
            odometer_lookback_days: 90,
            excluded_groups: vec![
                "CONSUMO PARA FROTAS".to_string(),
                "MATERIAL DE CONSUMO".to_string(),
                "Pneumáticos".to_string(),
            ],
            excluded_subgroups: vec!["Parafusos".to_string(), "Tintas".to_string()],
        }
    }
}

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    /// Verbose logging.
    pub debug: bool,
    /// Log per-request latency.
    pub profile: bool,
    pub db_max_connections: usize,
    pub request_timeout_secs: u64,
    pub lifecycle: LifecycleConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            debug: true,
            profile: false,
            db_max_connections: 10,
            request_timeout_secs: 60,
            lifecycle: LifecycleConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparsable keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let lifecycle_defaults = defaults.lifecycle.clone();

        let lifecycle = LifecycleConfig {
            warn_ratio: parsed(&lookup, "LIFECYCLE_WARN_RATIO")
                .unwrap_or(lifecycle_defaults.warn_ratio),
            alert_ratio: parsed(&lookup, "LIFECYCLE_ALERT_RATIO")
                .unwrap_or(lifecycle_defaults.alert_ratio),
            min_interval_km: parsed(&lookup, "LIFECYCLE_MIN_INTERVAL_KM")
                .unwrap_or(lifecycle_defaults.min_interval_km),
            iqr_factor: parsed(&lookup, "LIFECYCLE_IQR_FACTOR")
                .unwrap_or(lifecycle_defaults.iqr_factor),
            odometer_lookback_days: parsed(&lookup, "ODOMETER_LOOKBACK_DAYS")
                .unwrap_or(lifecycle_defaults.odometer_lookback_days),
            excluded_groups: lookup("LIFECYCLE_EXCLUDED_GROUPS")
                .map(|raw| split_list(&raw))
                .unwrap_or(lifecycle_defaults.excluded_groups),
            excluded_subgroups: lookup("LIFECYCLE_EXCLUDED_SUBGROUPS")
                .map(|raw| split_list(&raw))
                .unwrap_or(lifecycle_defaults.excluded_subgroups),
        };

        if lifecycle.warn_ratio >= lifecycle.alert_ratio {
            tracing::warn!(
                warn_ratio = lifecycle.warn_ratio,
                alert_ratio = lifecycle.alert_ratio,
                "LIFECYCLE_WARN_RATIO >= LIFECYCLE_ALERT_RATIO -- yellow status will never be reported"
            );
        }

        Self {
            debug: lookup("DEBUG")
                .map(|v| env_flag(&v))
                .unwrap_or(defaults.debug),
            profile: lookup("PROFILE")
                .map(|v| env_flag(&v))
                .unwrap_or(defaults.profile),
            db_max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.db_max_connections),
            request_timeout_secs: parsed(&lookup, "REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            lifecycle,
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}

/// `true`, `1` and `yes` (any case) switch a flag on.
pub fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = DashboardConfig::from_lookup(|_| None);
        assert!(config.debug);
        assert!(!config.profile);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.lifecycle, LifecycleConfig::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            ("DEBUG", "false"),
            ("PROFILE", "1"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("LIFECYCLE_ALERT_RATIO", "0.8"),
            ("ODOMETER_LOOKBACK_DAYS", "30"),
            ("LIFECYCLE_EXCLUDED_SUBGROUPS", "Parafusos, Tintas ,Colas,"),
        ]));
        assert!(!config.debug);
        assert!(config.profile);
        assert_eq!(config.db_max_connections, 4);
        assert_eq!(config.lifecycle.alert_ratio, 0.8);
        assert_eq!(config.lifecycle.odometer_lookback_days, 30);
        assert_eq!(
            config.lifecycle.excluded_subgroups,
            vec!["Parafusos", "Tintas", "Colas"]
        );
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            ("DB_MAX_CONNECTIONS", "0"),
            ("LIFECYCLE_WARN_RATIO", "lots"),
        ]));
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.lifecycle.warn_ratio, 0.65);
    }

    #[test]
    fn empty_exclusion_list_disables_exclusions() {
        let config =
            DashboardConfig::from_lookup(lookup_from(&[("LIFECYCLE_EXCLUDED_GROUPS", "")]));
        assert!(config.lifecycle.excluded_groups.is_empty());
    }

    #[test]
    fn env_flag_accepts_common_spellings() {
        assert!(env_flag("TRUE"));
        assert!(env_flag("yes"));
        assert!(!env_flag("off"));
    }
}
