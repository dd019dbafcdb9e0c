// ── Worker options ──
//
// Runtime tuning handed in by the embedding process. Core never reads
// settings files; `hmiview-config` builds these.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What status records when a launch start fails.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LaunchFailurePolicy {
    /// Status reflects the last requested launch; failures are reported
    /// in the returned [`LaunchReport`](crate::LaunchReport).
    #[default]
    RecordRequested,
    /// A failed start leaves status untouched and returns
    /// [`HmiError::LaunchFailed`](crate::HmiError::LaunchFailed).
    RequireSuccess,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerOptions {
    pub launch_failure_policy: LaunchFailurePolicy,
}
