//! Coordination engine behind a vehicle control-panel backend.
//!
//! Tracks the active operating mode, launch, map, vehicle profile and
//! driving mode; validates and applies operator requests; and notifies
//! interested subsystems.
//!
//! - **[`HmiWorker`]**: The action dispatcher. [`trigger()`](HmiWorker::trigger)
//!   runs each [`Action`] through validate → mutate → notify. Cheaply
//!   cloneable; every clone shares the same state.
//!
//! - **[`ConfigStore`]**: The catalog of modes, launches, maps, vehicles
//!   and component commands, loaded from a directory tree
//!   ([`load_from_dir`]) and swapped atomically on reload.
//!
//! - **[`StatusStore`]**: The single shared [`Status`] record. Readers get
//!   value snapshots; each mutation is applied as one atomic step and
//!   published to `watch` subscribers.
//!
//! - **[`HandlerRegistry`]**: Ordered change handlers for mode, launch,
//!   map and vehicle changes.
//!
//! - **Collaborators** ([`CommandRunner`], [`Transport`]): Process launch
//!   and message-bus plumbing, supplied by the embedding process.

pub mod collaborator;
pub mod command;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod options;
pub mod store;
pub mod worker;

// ── Primary re-exports ──────────────────────────────────────────────
pub use collaborator::{
    ChassisCallback, CollaboratorError, CommandRunner, LaunchOp, MonitorCallback, Transport,
};
pub use command::{Action, ActionResult, LaunchReport};
pub use config::{
    ComponentConfig, ComponentKind, ConfigStore, HmiConfig, ModeConfig, load_from_dir, title_case,
};
pub use error::HmiError;
pub use handlers::{ChangeHandler, ChangeKind, HandlerError, HandlerRegistry};
pub use options::{LaunchFailurePolicy, WorkerOptions};
pub use store::StatusStore;
pub use worker::HmiWorker;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ChassisState, ComponentStatusUpdate, ControlCommand, DriveEvent, DrivingMode, HealthLevel,
    PadAction, Status,
};
