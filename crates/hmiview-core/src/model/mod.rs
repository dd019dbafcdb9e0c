// ── Domain model ──
//
// Plain data shared between the stores, the worker and its collaborators.

pub mod drive_event;
pub mod driving;
pub mod status;

pub use drive_event::DriveEvent;
pub use driving::{ChassisState, ControlCommand, DrivingMode, PadAction};
pub use status::{ComponentStatusUpdate, HealthLevel, Status};
