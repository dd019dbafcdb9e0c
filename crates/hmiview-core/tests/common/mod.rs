// Shared fixtures for worker integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hmiview_core::{
    ChassisCallback, ChassisState, CollaboratorError, CommandRunner, ComponentConfig,
    ComponentKind, ComponentStatusUpdate, ControlCommand, DriveEvent, HmiConfig, HmiWorker,
    LaunchFailurePolicy, LaunchOp, ModeConfig, MonitorCallback, Transport, WorkerOptions,
};

// ── Command runner ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerCall {
    Launch(LaunchOp, String),
    Command(ComponentKind, String, String),
}

/// Records every request; launches succeed unless listed in `failing`.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<RunnerCall>>,
    failing: Mutex<HashSet<(LaunchOp, String)>>,
    exit_codes: Mutex<HashMap<String, i32>>,
}

impl RecordingRunner {
    pub fn calls(&self) -> Vec<RunnerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail_launch(&self, op: LaunchOp, launch: &str) {
        self.failing.lock().unwrap().insert((op, launch.to_owned()));
    }

    pub fn exit_with(&self, command: &str, code: i32) {
        self.exit_codes
            .lock()
            .unwrap()
            .insert(command.to_owned(), code);
    }
}

impl CommandRunner for RecordingRunner {
    fn run_command(
        &self,
        kind: ComponentKind,
        name: &str,
        command: &str,
    ) -> Result<i32, CollaboratorError> {
        self.calls.lock().unwrap().push(RunnerCall::Command(
            kind,
            name.to_owned(),
            command.to_owned(),
        ));
        Ok(self
            .exit_codes
            .lock()
            .unwrap()
            .get(command)
            .copied()
            .unwrap_or(0))
    }

    fn run_launch(&self, op: LaunchOp, launch_name: &str, _launch_file: &Path) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push(RunnerCall::Launch(op, launch_name.to_owned()));
        !self
            .failing
            .lock()
            .unwrap()
            .contains(&(op, launch_name.to_owned()))
    }
}

// ── Transport ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingTransport {
    pub control_commands: Mutex<Vec<ControlCommand>>,
    pub drive_events: Mutex<Vec<DriveEvent>>,
    pub publish_attempts: AtomicUsize,
    pub fail_publish: AtomicBool,
    chassis: Mutex<Vec<ChassisCallback>>,
    monitor: Mutex<Vec<MonitorCallback>>,
}

impl RecordingTransport {
    pub fn control_commands(&self) -> Vec<ControlCommand> {
        self.control_commands.lock().unwrap().clone()
    }

    pub fn drive_events(&self) -> Vec<DriveEvent> {
        self.drive_events.lock().unwrap().clone()
    }

    /// Deliver a chassis sample to every subscriber.
    pub fn emit_chassis(&self, chassis: &ChassisState) {
        for callback in self.chassis.lock().unwrap().iter() {
            callback(chassis.clone());
        }
    }

    pub fn emit_monitor(&self, update: &ComponentStatusUpdate) {
        for callback in self.monitor.lock().unwrap().iter() {
            callback(update.clone());
        }
    }

    fn attempt(&self) -> Result<(), CollaboratorError> {
        self.publish_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_publish.load(Ordering::SeqCst) {
            Err(CollaboratorError::Publish("writer closed".into()))
        } else {
            Ok(())
        }
    }
}

impl Transport for RecordingTransport {
    fn publish_control_command(&self, command: &ControlCommand) -> Result<(), CollaboratorError> {
        self.attempt()?;
        self.control_commands.lock().unwrap().push(command.clone());
        Ok(())
    }

    fn publish_drive_event(&self, event: &DriveEvent) -> Result<(), CollaboratorError> {
        self.attempt()?;
        self.drive_events.lock().unwrap().push(event.clone());
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

// ── Catalog ─────────────────────────────────────────────────────────

fn mode(dir: &str, launches: &[&str], default_launch: Option<&str>) -> ModeConfig {
    let path = PathBuf::from(format!("/modes/{dir}"));
    let launches = launches
        .iter()
        .map(|name| {
            let file = path.join(format!("{}.launch", name.to_lowercase().replace(' ', "_")));
            ((*name).to_owned(), file)
        })
        .collect();
    ModeConfig {
        path,
        launches,
        default_launch: default_launch.map(str::to_owned),
    }
}

/// Two modes, one with a default launch; two maps; two vehicles; one of
/// each component kind.
pub fn catalog() -> HmiConfig {
    let mut config = HmiConfig::default();
    config.modes.insert(
        "Mkz Standard".into(),
        mode("mkz_standard", &["Close Loop", "Map Collection"], None),
    );
    config.modes.insert(
        "Dev Kit".into(),
        mode("dev_kit", &["Navigation", "Calibration"], Some("Navigation")),
    );
    config
        .maps
        .insert("Sunnyvale".into(), "/maps/sunnyvale".into());
    config
        .maps
        .insert("San Mateo".into(), "/maps/san_mateo".into());
    config
        .vehicles
        .insert("Mkz Example".into(), "/vehicles/mkz_example".into());
    config
        .vehicles
        .insert("Dev Kit Car".into(), "/vehicles/dev_kit_car".into());

    let planning = ComponentConfig {
        supported_commands: BTreeMap::from([("start".into(), "planning.sh start".into())]),
    };
    config.modules.insert("Planning".into(), planning);
    config
        .hardware
        .insert("GPS".into(), ComponentConfig::default());
    config
        .tools
        .insert("Recorder".into(), ComponentConfig::default());
    config
}

pub struct Harness {
    pub worker: HmiWorker,
    pub runner: Arc<RecordingRunner>,
    pub transport: Arc<RecordingTransport>,
}

pub fn harness() -> Harness {
    harness_with(LaunchFailurePolicy::RecordRequested)
}

pub fn harness_with(policy: LaunchFailurePolicy) -> Harness {
    let runner = Arc::new(RecordingRunner::default());
    let transport = Arc::new(RecordingTransport::default());
    let worker = HmiWorker::new(
        catalog(),
        runner.clone(),
        transport.clone(),
        WorkerOptions {
            launch_failure_policy: policy,
        },
    );
    worker.attach().unwrap();
    Harness {
        worker,
        runner,
        transport,
    }
}

/// Handler that appends `tag:value` to a shared log.
pub fn recorder(
    log: &Arc<Mutex<Vec<String>>>,
    tag: &'static str,
) -> impl Fn(&str) -> Result<(), hmiview_core::HandlerError> + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |value: &str| {
        log.lock().unwrap().push(format!("{tag}:{value}"));
        Ok(())
    }
}
