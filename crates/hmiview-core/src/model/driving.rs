// ── Driving mode and chassis telemetry ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Control authority reported by the chassis.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DrivingMode {
    #[default]
    #[serde(alias = "COMPLETE_MANUAL")]
    #[strum(to_string = "MANUAL", serialize = "COMPLETE_MANUAL")]
    Manual,
    CompleteAutoDrive,
    #[serde(alias = "AUTO_STEER_ONLY")]
    #[strum(to_string = "AUTO_STEER", serialize = "AUTO_STEER_ONLY")]
    AutoSteer,
    #[serde(alias = "AUTO_SPEED_ONLY")]
    #[strum(to_string = "AUTO_SPEED", serialize = "AUTO_SPEED_ONLY")]
    AutoSpeed,
    #[serde(alias = "EMERGENCY_MODE")]
    #[strum(to_string = "EMERGENCY", serialize = "EMERGENCY_MODE")]
    Emergency,
}

impl DrivingMode {
    /// Whether a toggle to `target` is accepted while the chassis reports
    /// `self`. Only MANUAL and COMPLETE_AUTO_DRIVE can be requested.
    pub fn can_toggle_to(self, target: DrivingMode) -> bool {
        match target {
            Self::Manual => self != Self::Manual,
            Self::CompleteAutoDrive => self == Self::Manual,
            _ => false,
        }
    }
}

/// One chassis telemetry sample. Only the fields the engine consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChassisState {
    pub driving_mode: DrivingMode,
}

impl ChassisState {
    pub fn new(driving_mode: DrivingMode) -> Self {
        Self { driving_mode }
    }
}

/// Pad action understood by the vehicle controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PadAction {
    /// Engage autonomous driving.
    Start,
    /// Hand control back to the driver.
    Reset,
}

/// Control request published when the operator toggles the driving mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub action: PadAction,
    pub requested_mode: DrivingMode,
}

impl ControlCommand {
    /// Build the request for a toggle target, or `None` if the mode cannot
    /// be requested.
    pub fn for_mode(mode: DrivingMode) -> Option<Self> {
        let action = match mode {
            DrivingMode::CompleteAutoDrive => PadAction::Start,
            DrivingMode::Manual => PadAction::Reset,
            _ => return None,
        };
        Some(Self {
            action,
            requested_mode: mode,
        })
    }
}
