// ── Operating status ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::driving::DrivingMode;

/// Health level of a monitored component.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum HealthLevel {
    #[default]
    Unknown,
    Ok,
    Warn,
    Error,
    Fatal,
}

/// Partial component health report from the monitoring feed.
/// Entries are merged into [`Status::components`] key by key.
pub type ComponentStatusUpdate = BTreeMap<String, HealthLevel>;

/// The single shared record of the current operating state.
///
/// `current_launch` is only `Some` while `current_mode` is `Some` and the
/// launch belongs to that mode. The worker maintains this; the store
/// applies what it is told.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub current_mode: Option<String>,
    pub current_launch: Option<String>,
    pub current_map: Option<String>,
    pub current_vehicle: Option<String>,
    /// Last driving mode merged from chassis telemetry.
    pub driving_mode: DrivingMode,
    pub components: BTreeMap<String, HealthLevel>,
}

impl Status {
    /// Worst health level across all monitored components.
    pub fn worst_health(&self) -> Option<HealthLevel> {
        self.components.values().copied().max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_idle_manual() {
        let status = Status::default();
        assert!(status.current_mode.is_none());
        assert!(status.current_launch.is_none());
        assert_eq!(status.driving_mode, DrivingMode::Manual);
        assert_eq!(status.worst_health(), None);
    }

    #[test]
    fn worst_health_orders_by_severity() {
        let mut status = Status::default();
        status.components.insert("GPS".into(), HealthLevel::Ok);
        status.components.insert("Lidar".into(), HealthLevel::Error);
        status.components.insert("Radar".into(), HealthLevel::Warn);
        assert_eq!(status.worst_health(), Some(HealthLevel::Error));
    }
}
