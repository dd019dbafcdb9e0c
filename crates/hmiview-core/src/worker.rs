// ── HMI worker ──
//
// The action dispatcher. Each request is validated against the catalog,
// applied to the status store, handed to the external collaborators, and
// finally announced to registered handlers. Validation failures return
// before anything is mutated or announced.
//
// No lock is held across a whole action. Each status mutation is atomic
// on its own, so a reader may observe a new value before the handlers for
// it have run.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::collaborator::{CommandRunner, LaunchOp, Transport};
use crate::command::{Action, ActionResult, LaunchReport};
use crate::config::{ComponentKind, ConfigStore, HmiConfig};
use crate::error::HmiError;
use crate::handlers::{ChangeKind, HandlerError, HandlerRegistry};
use crate::model::{
    ChassisState, ComponentStatusUpdate, ControlCommand, DriveEvent, DrivingMode, Status,
};
use crate::options::{LaunchFailurePolicy, WorkerOptions};
use crate::store::StatusStore;

// ── HmiWorker ────────────────────────────────────────────────────

/// Service object owning the catalog, the status record and the handler
/// lists. Construct one per process and share clones; they all refer to
/// the same state.
#[derive(Clone)]
pub struct HmiWorker {
    inner: Arc<WorkerInner>,
}

struct WorkerInner {
    options: WorkerOptions,
    config: ConfigStore,
    status: StatusStore,
    handlers: HandlerRegistry,
    runner: Arc<dyn CommandRunner>,
    transport: Arc<dyn Transport>,
    /// Last chassis-reported driving mode. Guards the driving-mode toggle.
    observed_driving_mode: watch::Sender<DrivingMode>,
    handler_failures: AtomicUsize,
}

impl HmiWorker {
    /// Create a worker. Does not subscribe to telemetry; call
    /// [`attach()`](Self::attach) for that.
    pub fn new(
        config: HmiConfig,
        runner: Arc<dyn CommandRunner>,
        transport: Arc<dyn Transport>,
        options: WorkerOptions,
    ) -> Self {
        let (observed_driving_mode, _) = watch::channel(DrivingMode::default());
        Self {
            inner: Arc::new(WorkerInner {
                options,
                config: ConfigStore::new(config),
                status: StatusStore::new(),
                handlers: HandlerRegistry::new(),
                runner,
                transport,
                observed_driving_mode,
                handler_failures: AtomicUsize::new(0),
            }),
        }
    }

    /// Subscribe to chassis telemetry and the monitoring feed.
    ///
    /// Callbacks hold a weak reference, so the transport does not keep the
    /// worker alive.
    pub fn attach(&self) -> Result<(), HmiError> {
        let weak = Arc::downgrade(&self.inner);
        self.inner
            .transport
            .subscribe_chassis(Box::new(move |chassis: ChassisState| {
                if let Some(worker) = upgrade(&weak) {
                    worker.on_chassis(&chassis);
                }
            }))?;

        let weak = Arc::downgrade(&self.inner);
        self.inner
            .transport
            .subscribe_monitor(Box::new(move |update: ComponentStatusUpdate| {
                if let Some(worker) = upgrade(&weak) {
                    worker.update_component_status(update);
                }
            }))?;

        debug!("subscribed to chassis and monitor feeds");
        Ok(())
    }

    pub fn options(&self) -> &WorkerOptions {
        &self.inner.options
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Current catalog snapshot.
    pub fn config(&self) -> Arc<HmiConfig> {
        self.inner.config.get()
    }

    /// Current status snapshot.
    pub fn status(&self) -> Status {
        self.inner.status.read()
    }

    /// Subscribe to status changes.
    pub fn subscribe_status(&self) -> watch::Receiver<Status> {
        self.inner.status.subscribe()
    }

    /// Driving mode last reported by the chassis.
    pub fn observed_driving_mode(&self) -> DrivingMode {
        *self.inner.observed_driving_mode.borrow()
    }

    /// Handler calls that returned an error or panicked since the worker
    /// was created. The changes they were announcing stayed applied.
    pub fn handler_failures(&self) -> usize {
        self.inner.handler_failures.load(Ordering::Relaxed)
    }

    /// Re-read the catalog. On failure the previous catalog stays live.
    ///
    /// Status is not revalidated: it may name something the new catalog
    /// lacks until the next successful change.
    pub fn reload_config(&self, root: &Path) -> Result<Arc<HmiConfig>, HmiError> {
        self.inner.config.reload(root)
    }

    // ── Handler registration ─────────────────────────────────────

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.inner.handlers
    }

    pub fn on_mode_change<F>(&self, handler: F)
    where
        F: Fn(&str) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.inner.handlers.register(ChangeKind::Mode, handler);
    }

    pub fn on_launch_change<F>(&self, handler: F)
    where
        F: Fn(&str) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.inner.handlers.register(ChangeKind::Launch, handler);
    }

    pub fn on_map_change<F>(&self, handler: F)
    where
        F: Fn(&str) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.inner.handlers.register(ChangeKind::Map, handler);
    }

    pub fn on_vehicle_change<F>(&self, handler: F)
    where
        F: Fn(&str) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.inner.handlers.register(ChangeKind::Vehicle, handler);
    }

    // ── Dispatch ─────────────────────────────────────────────────

    /// Apply an action.
    pub fn trigger(&self, action: Action) -> Result<ActionResult, HmiError> {
        let label = action.label();
        let result = match action {
            Action::ChangeMode(name) => self.change_mode(&name),
            Action::ChangeLaunch(name) => self.change_launch(&name),
            Action::ChangeMap(name) => self.change_map(&name),
            Action::ChangeVehicle(name) => self.change_vehicle(&name),
            Action::ChangeDrivingMode(mode) => self.change_driving_mode(mode),
            Action::SetupMode => self.setup_mode(),
            Action::ResetMode => self.reset_mode(),
            Action::EnterAutoMode => self.change_driving_mode(DrivingMode::CompleteAutoDrive),
            Action::Disengage => self.change_driving_mode(DrivingMode::Manual),
            Action::RunCommand {
                kind,
                name,
                command,
            } => self
                .run_command(kind, &name, &command)
                .map(ActionResult::ExitCode),
            Action::SubmitDriveEvent(event) => {
                self.publish_drive_event(&event).map(|()| ActionResult::Ok)
            }
        };

        if let Err(ref e) = result {
            if e.is_validation() {
                warn!(action = label, error = %e, "action rejected");
            } else {
                warn!(action = label, error = %e, "action failed");
            }
        }
        result
    }

    /// Switch to `name`, tearing down the previous mode's launch and
    /// starting the new mode's default launch, if it has one.
    ///
    /// Handlers fire on every accepted call, including a switch to the mode
    /// that is already active.
    pub fn change_mode(&self, name: &str) -> Result<ActionResult, HmiError> {
        let config = self.config();
        let Some(mode) = config.mode(name) else {
            return Err(HmiError::UnknownMode { name: name.into() });
        };

        let previous = self.inner.status.read();
        let mut report = LaunchReport::default();

        if let (Some(old_mode), Some(old_launch)) = (&previous.current_mode, &previous.current_launch)
        {
            report.stopped = self.request_launch(LaunchOp::Stop, &config, old_mode, old_launch);
        }
        self.inner.status.set_mode(Some(name.to_owned()));
        info!(mode = name, previous = ?previous.current_mode, "mode changed");

        let mut started_launch = None;
        if let Some(default_launch) = &mode.default_launch {
            report.started = self.request_launch(LaunchOp::Start, &config, name, default_launch);
            let keep = report.started != Some(false)
                || self.inner.options.launch_failure_policy == LaunchFailurePolicy::RecordRequested;
            if keep
                && self
                    .inner
                    .status
                    .set_launch_in_mode(name, Some(default_launch.clone()))
            {
                started_launch = Some(default_launch.as_str());
            }
        }

        self.notify(ChangeKind::Mode, name);
        if let Some(launch) = started_launch {
            self.notify(ChangeKind::Launch, launch);
        }

        Ok(launch_result(report))
    }

    /// Select `name` within the current mode, stopping the active launch
    /// first.
    ///
    /// Under [`LaunchFailurePolicy::RecordRequested`] a failed stop or start
    /// is reported in the result while status still records `name`.
    pub fn change_launch(&self, name: &str) -> Result<ActionResult, HmiError> {
        let config = self.config();
        let current = self.inner.status.read();
        let Some(mode) = current.current_mode else {
            return Err(HmiError::NoActiveMode);
        };
        if config.launch_file(&mode, name).is_none() {
            return Err(HmiError::UnknownLaunch {
                mode,
                name: name.into(),
            });
        }

        let mut report = LaunchReport::default();
        if let Some(old_launch) = &current.current_launch {
            report.stopped = self.request_launch(LaunchOp::Stop, &config, &mode, old_launch);
        }
        report.started = self.request_launch(LaunchOp::Start, &config, &mode, name);

        if report.started == Some(false)
            && self.inner.options.launch_failure_policy == LaunchFailurePolicy::RequireSuccess
        {
            return Err(HmiError::LaunchFailed {
                launch: name.into(),
                op: LaunchOp::Start,
            });
        }

        if !self.inner.status.set_launch_in_mode(&mode, Some(name.to_owned())) {
            return Err(HmiError::Superseded {
                launch: name.into(),
                current: self.inner.status.read().current_mode,
            });
        }
        info!(mode = %mode, launch = name, succeeded = report.succeeded(), "launch changed");

        self.notify(ChangeKind::Launch, name);
        Ok(ActionResult::Launch(report))
    }

    pub fn change_map(&self, name: &str) -> Result<ActionResult, HmiError> {
        if !self.config().has_map(name) {
            return Err(HmiError::UnknownMap { name: name.into() });
        }
        self.inner.status.set_map(Some(name.to_owned()));
        info!(map = name, "map changed");
        self.notify(ChangeKind::Map, name);
        Ok(ActionResult::Ok)
    }

    pub fn change_vehicle(&self, name: &str) -> Result<ActionResult, HmiError> {
        if !self.config().has_vehicle(name) {
            return Err(HmiError::UnknownVehicle { name: name.into() });
        }
        self.inner.status.set_vehicle(Some(name.to_owned()));
        info!(vehicle = name, "vehicle changed");
        self.notify(ChangeKind::Vehicle, name);
        Ok(ActionResult::Ok)
    }

    /// Request a manual/autonomous toggle.
    ///
    /// Guarded by the chassis-reported mode, not by any earlier request:
    /// until telemetry confirms a change, repeating the same request is
    /// accepted and published again. Status is not touched here; its
    /// `driving_mode` follows telemetry.
    ///
    /// MANUAL is accepted from any other observed mode, including partial
    /// autonomy and EMERGENCY. COMPLETE_AUTO_DRIVE is only accepted from
    /// MANUAL.
    pub fn change_driving_mode(&self, target: DrivingMode) -> Result<ActionResult, HmiError> {
        let observed = self.observed_driving_mode();
        if !observed.can_toggle_to(target) {
            return Err(HmiError::DrivingModeRejected {
                observed,
                requested: target,
            });
        }
        let command = ControlCommand::for_mode(target)
            .ok_or_else(|| HmiError::Internal(format!("no control command for {target}")))?;

        self.inner.transport.publish_control_command(&command)?;
        info!(%observed, requested = %target, action = %command.action, "driving mode change requested");
        Ok(ActionResult::Ok)
    }

    /// Start the current launch again.
    pub fn setup_mode(&self) -> Result<ActionResult, HmiError> {
        let config = self.config();
        let current = self.inner.status.read();
        let Some(mode) = current.current_mode else {
            return Err(HmiError::NoActiveMode);
        };
        let Some(launch) = current.current_launch else {
            return Err(HmiError::NoActiveLaunch { mode });
        };
        if config.launch_file(&mode, &launch).is_none() {
            return Err(HmiError::UnknownLaunch { mode, name: launch });
        }

        let report = LaunchReport {
            stopped: None,
            started: self.request_launch(LaunchOp::Start, &config, &mode, &launch),
        };
        if report.started == Some(false)
            && self.inner.options.launch_failure_policy == LaunchFailurePolicy::RequireSuccess
        {
            return Err(HmiError::LaunchFailed {
                launch,
                op: LaunchOp::Start,
            });
        }
        Ok(ActionResult::Launch(report))
    }

    /// Stop the current launch and clear it. A no-op when nothing is
    /// selected.
    pub fn reset_mode(&self) -> Result<ActionResult, HmiError> {
        let config = self.config();
        let current = self.inner.status.read();
        let (Some(mode), Some(launch)) = (current.current_mode, current.current_launch) else {
            return Ok(ActionResult::Ok);
        };

        let report = LaunchReport {
            stopped: self.request_launch(LaunchOp::Stop, &config, &mode, &launch),
            started: None,
        };
        if report.stopped == Some(false)
            && self.inner.options.launch_failure_policy == LaunchFailurePolicy::RequireSuccess
        {
            return Err(HmiError::LaunchFailed {
                launch,
                op: LaunchOp::Stop,
            });
        }

        if self.inner.status.set_launch_in_mode(&mode, None) {
            info!(mode = %mode, launch = %launch, "launch reset");
            self.notify(ChangeKind::Launch, "");
        }
        Ok(ActionResult::Launch(report))
    }

    /// Run `command` on a module, hardware device or tool and return its
    /// exit code. The command string is passed through untouched.
    pub fn run_command(
        &self,
        kind: ComponentKind,
        name: &str,
        command: &str,
    ) -> Result<i32, HmiError> {
        if !self.config().components(kind).contains_key(name) {
            return Err(HmiError::UnknownComponent {
                kind,
                name: name.into(),
            });
        }
        let code = self.inner.runner.run_command(kind, name, command)?;
        if code == 0 {
            info!(%kind, name, command, "command finished");
        } else {
            warn!(%kind, name, command, code, "command exited with failure");
        }
        Ok(code)
    }

    pub fn run_module_command(&self, module: &str, command: &str) -> Result<i32, HmiError> {
        self.run_command(ComponentKind::Module, module, command)
    }

    pub fn run_hardware_command(&self, hardware: &str, command: &str) -> Result<i32, HmiError> {
        self.run_command(ComponentKind::Hardware, hardware, command)
    }

    pub fn run_tool_command(&self, tool: &str, command: &str) -> Result<i32, HmiError> {
        self.run_command(ComponentKind::Tool, tool, command)
    }

    /// Publish a drive event once. Failures are returned, never retried.
    pub fn submit_drive_event(
        &self,
        timestamp_ms: u64,
        message: &str,
        tags: &[String],
    ) -> Result<(), HmiError> {
        self.publish_drive_event(&DriveEvent::new(timestamp_ms, message, tags.to_vec()))
    }

    // ── Telemetry ────────────────────────────────────────────────

    /// Record a chassis sample: it becomes the driving-mode guard's
    /// reference and is merged into status.
    pub fn on_chassis(&self, chassis: &ChassisState) {
        let mode = chassis.driving_mode;
        let previous = self.inner.observed_driving_mode.send_replace(mode);
        if previous != mode {
            info!(from = %previous, to = %mode, "chassis driving mode changed");
        }
        self.inner.status.set_driving_mode(mode);
    }

    /// Merge a monitoring report into status.
    pub fn update_component_status(&self, update: ComponentStatusUpdate) {
        debug!(components = update.len(), "merging component status");
        self.inner.status.merge_component_status(update);
    }

    // ── Private helpers ──────────────────────────────────────────

    fn notify(&self, kind: ChangeKind, value: &str) {
        let failed = self.inner.handlers.notify(kind, value);
        if failed > 0 {
            self.inner
                .handler_failures
                .fetch_add(failed, Ordering::Relaxed);
        }
    }

    fn publish_drive_event(&self, event: &DriveEvent) -> Result<(), HmiError> {
        self.inner.transport.publish_drive_event(event)?;
        info!(
            timestamp_ms = event.timestamp_ms,
            message = %event.message,
            tags = ?event.tags,
            "drive event published"
        );
        Ok(())
    }

    /// Ask the runner to start/stop a launch. `None` if the launch has no
    /// file in the catalog (e.g. it disappeared in a reload).
    fn request_launch(
        &self,
        op: LaunchOp,
        config: &HmiConfig,
        mode: &str,
        launch: &str,
    ) -> Option<bool> {
        let Some(file) = config.launch_file(mode, launch) else {
            warn!(%op, mode, launch, "launch not in catalog, skipping");
            return None;
        };
        let ok = self.inner.runner.run_launch(op, launch, file);
        if ok {
            debug!(%op, launch, "launch request succeeded");
        } else {
            warn!(%op, launch, file = %file.display(), "launch request failed");
        }
        Some(ok)
    }
}

fn upgrade(weak: &Weak<WorkerInner>) -> Option<HmiWorker> {
    weak.upgrade().map(|inner| HmiWorker { inner })
}

fn launch_result(report: LaunchReport) -> ActionResult {
    if report == LaunchReport::default() {
        ActionResult::Ok
    } else {
        ActionResult::Launch(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;
    use crate::collaborator::{ChassisCallback, CollaboratorError, MonitorCallback};
    use crate::config::ModeConfig;

    #[derive(Default)]
    struct NullRunner;

    impl CommandRunner for NullRunner {
        fn run_command(&self, _: ComponentKind, _: &str, _: &str) -> Result<i32, CollaboratorError> {
            Ok(0)
        }

        fn run_launch(&self, _: LaunchOp, _: &str, _: &Path) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct LoopbackTransport {
        chassis: Mutex<Vec<ChassisCallback>>,
        monitor: Mutex<Vec<MonitorCallback>>,
    }

    impl Transport for LoopbackTransport {
        fn publish_control_command(&self, _: &ControlCommand) -> Result<(), CollaboratorError> {
            Ok(())
        }

        fn publish_drive_event(&self, _: &DriveEvent) -> Result<(), CollaboratorError> {
            Ok(())
        }

        fn subscribe_chassis(&self, callback: ChassisCallback) -> Result<(), CollaboratorError> {
            self.chassis.lock().unwrap().push(callback);
            Ok(())
        }

        fn subscribe_monitor(&self, callback: MonitorCallback) -> Result<(), CollaboratorError> {
            self.monitor.lock().unwrap().push(callback);
            Ok(())
        }
    }

    fn catalog() -> HmiConfig {
        let mut config = HmiConfig::default();
        let mut mode = ModeConfig::default();
        mode.launches
            .insert("Close Loop".into(), "/modes/m/close_loop.launch".into());
        config.modes.insert("Mkz Standard".into(), mode);
        config
    }

    #[test]
    fn attach_routes_telemetry_into_status() {
        let transport = Arc::new(LoopbackTransport::default());
        let worker = HmiWorker::new(
            catalog(),
            Arc::new(NullRunner),
            transport.clone(),
            WorkerOptions::default(),
        );
        worker.attach().unwrap();

        for callback in transport.chassis.lock().unwrap().iter() {
            callback(ChassisState::new(DrivingMode::CompleteAutoDrive));
        }
        for callback in transport.monitor.lock().unwrap().iter() {
            callback(BTreeMap::from([(
                "GPS".to_string(),
                crate::model::HealthLevel::Warn,
            )]));
        }

        let status = worker.status();
        assert_eq!(status.driving_mode, DrivingMode::CompleteAutoDrive);
        assert_eq!(worker.observed_driving_mode(), DrivingMode::CompleteAutoDrive);
        assert_eq!(status.components.len(), 1);
    }

    #[test]
    fn callbacks_do_not_keep_worker_alive() {
        let transport = Arc::new(LoopbackTransport::default());
        let worker = HmiWorker::new(
            catalog(),
            Arc::new(NullRunner),
            transport.clone(),
            WorkerOptions::default(),
        );
        worker.attach().unwrap();
        drop(worker);

        // Worker is gone; the callback is a no-op rather than a panic.
        for callback in transport.chassis.lock().unwrap().iter() {
            callback(ChassisState::new(DrivingMode::Manual));
        }
    }

    #[test]
    fn reset_without_launch_is_a_no_op() {
        let worker = HmiWorker::new(
            catalog(),
            Arc::new(NullRunner),
            Arc::new(LoopbackTransport::default()),
            WorkerOptions::default(),
        );
        assert_eq!(worker.reset_mode().unwrap(), ActionResult::Ok);
        assert_eq!(worker.status(), Status::default());
    }
}
