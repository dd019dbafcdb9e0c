// ── Status store ──
//
// Single-record store behind the read/write lock inside a `watch`
// channel. Readers copy the record out under a shared lock; each mutator
// applies its whole change under the exclusive lock, so no reader sees a
// half-applied update. Subscribers are woken on every committed change.

use tokio::sync::watch;
use tracing::debug;

use crate::model::{ComponentStatusUpdate, DrivingMode, Status};

/// Concurrently accessed operating status.
///
/// Enforces atomicity only. Which values are valid is the worker's
/// business; the store applies whatever it is given.
pub struct StatusStore {
    status: watch::Sender<Status>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::with_status(Status::default())
    }

    pub fn with_status(initial: Status) -> Self {
        let (status, _) = watch::channel(initial);
        Self { status }
    }

    /// Copy of the current record.
    pub fn read(&self) -> Status {
        self.status.borrow().clone()
    }

    /// Subscribe to committed changes.
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    // ── Mutators ─────────────────────────────────────────────────────

    /// Switch mode. The active launch belongs to the old mode, so it is
    /// cleared in the same step.
    pub fn set_mode(&self, mode: Option<String>) {
        self.modify(|s| {
            let changed = s.current_mode != mode || s.current_launch.is_some();
            s.current_mode = mode;
            s.current_launch = None;
            changed
        });
    }

    pub fn set_launch(&self, launch: Option<String>) {
        self.modify(|s| replace_if_changed(&mut s.current_launch, launch));
    }

    /// Select `launch` only if `mode` is still the current mode. Returns
    /// whether it was applied. Checked and written under one lock, so a
    /// concurrent mode switch cannot pair the new mode with an old launch.
    pub fn set_launch_in_mode(&self, mode: &str, launch: Option<String>) -> bool {
        let mut applied = false;
        self.modify(|s| {
            if s.current_mode.as_deref() != Some(mode) {
                return false;
            }
            applied = true;
            replace_if_changed(&mut s.current_launch, launch)
        });
        applied
    }

    pub fn set_map(&self, map: Option<String>) {
        self.modify(|s| replace_if_changed(&mut s.current_map, map));
    }

    pub fn set_vehicle(&self, vehicle: Option<String>) {
        self.modify(|s| replace_if_changed(&mut s.current_vehicle, vehicle));
    }

    pub fn set_driving_mode(&self, mode: DrivingMode) {
        self.modify(|s| replace_if_changed(&mut s.driving_mode, mode));
    }

    /// Merge a monitoring report. Components absent from `update` keep
    /// their previous level.
    pub fn merge_component_status(&self, update: ComponentStatusUpdate) {
        self.modify(|s| {
            let mut changed = false;
            for (name, level) in update {
                if s.components.insert(name, level) != Some(level) {
                    changed = true;
                }
            }
            changed
        });
    }

    fn modify(&self, apply: impl FnOnce(&mut Status) -> bool) {
        let changed = self.status.send_if_modified(apply);
        if changed {
            debug!("status changed");
        }
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
