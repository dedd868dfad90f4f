use std::sync::Arc;

use tracing::{debug, info};

use crate::analysis::search_model::SearchOutcome;
use crate::cli::config::{AppConfig, Targets};
use crate::console::{
    command::DeviceCommand,
    group::{DeviceGroup, MirroredDevice},
    progress::{LogProgress, NoProgress, ProgressSink},
};
use crate::device::{
    adb::{AdbBridge, list_devices},
    device_model::AdbSettings,
};
use crate::parser::dump_parser::try_parse_file;
use crate::trace::logger::TraceLogger;
use crate::tree::{identity::UniqueId, snapshot::Snapshot};
use crate::view::manager::ViewTreeManager;

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

// ============================================================================
// Shared setup
// ============================================================================

/// Trace logger from `--trace`, falling back to the config file.
pub fn build_tracer(config: &AppConfig, cli_path: Option<&str>) -> Option<Arc<TraceLogger>> {
    let path = cli_path.or(config.trace.path.as_deref())?;
    let logger = TraceLogger::new(path);
    logger.is_enabled().then(|| Arc::new(logger))
}

/// `serial`, or the only attached device when none is given.
fn resolve_serial(adb: &AdbSettings, serial: Option<&str>) -> CmdResult<String> {
    if let Some(serial) = serial {
        return Ok(serial.to_string());
    }
    let mut attached = list_devices(adb)?;
    match attached.len() {
        0 => Err("no devices attached".into()),
        1 => Ok(attached.remove(0)),
        n => Err(format!("{} devices attached, pick one with --serial", n).into()),
    }
}

fn open_device(
    config: &AppConfig,
    serial: &str,
    tracer: Option<&Arc<TraceLogger>>,
) -> ViewTreeManager {
    let bridge = Arc::new(AdbBridge::new(serial, config.adb.clone()));
    let manager = ViewTreeManager::new(bridge, config.search.clone());
    match tracer {
        Some(t) => manager.with_tracer(Arc::clone(t)),
        None => manager,
    }
}

fn fresh_snapshot(manager: &ViewTreeManager) -> CmdResult<Arc<Snapshot>> {
    manager
        .wait_for_fresh_snapshot()
        .ok_or_else(|| format!("no widget hierarchy from {}", manager.serial()).into())
}

fn print_snapshot(snapshot: &Snapshot) {
    print!("{}", snapshot.render());
    println!("{} nodes, fingerprint {}", snapshot.len(), snapshot.fingerprint());
}

// ============================================================================
// devices subcommand
// ============================================================================

pub fn cmd_devices(adb: &AdbSettings) -> CmdResult<()> {
    let serials = list_devices(adb)?;
    if serials.is_empty() {
        eprintln!("No devices attached");
    }
    for serial in serials {
        println!("{}", serial);
    }
    Ok(())
}

// ============================================================================
// Single-device queries
// ============================================================================

pub fn cmd_dump(config: &AppConfig, serial: Option<&str>, file: Option<&str>) -> CmdResult<()> {
    if let Some(path) = file {
        print_snapshot(&try_parse_file(path)?);
        return Ok(());
    }

    let serial = resolve_serial(&config.adb, serial)?;
    let manager = open_device(config, &serial, None);
    let snapshot = fresh_snapshot(&manager)?;
    print_snapshot(&snapshot);
    Ok(())
}

pub fn cmd_locate(config: &AppConfig, serial: Option<&str>, x: i32, y: i32) -> CmdResult<bool> {
    let serial = resolve_serial(&config.adb, serial)?;
    let manager = open_device(config, &serial, None);
    fresh_snapshot(&manager)?;

    match manager.view_at_location(x, y) {
        Some(hit) => {
            let node = hit.node();
            println!("{} {} {}", node.unique_id(), node.class_name(), node.bounds());
            Ok(true)
        }
        None => {
            println!("Nothing at ({}, {})", x, y);
            Ok(false)
        }
    }
}

pub fn cmd_occluded(config: &AppConfig, serial: Option<&str>, id: &str) -> CmdResult<bool> {
    let id: UniqueId = id.parse()?;
    let serial = resolve_serial(&config.adb, serial)?;
    let manager = open_device(config, &serial, None);
    fresh_snapshot(&manager)?;

    let Some(occluders) = manager.occluders(&id) else {
        println!("{} is not on screen", id);
        return Ok(false);
    };
    if occluders.is_empty() {
        println!("{} is not occluded", id);
    } else {
        println!("{} is occluded by:", id);
        for o in &occluders {
            println!("  {}", o);
        }
    }
    Ok(occluders.is_empty())
}

/// Returns whether the widget ended up visible and uncovered.
pub fn cmd_visible(
    config: &AppConfig,
    serial: Option<&str>,
    id: &str,
    tracer: Option<&Arc<TraceLogger>>,
) -> CmdResult<bool> {
    let id: UniqueId = id.parse()?;
    let serial = resolve_serial(&config.adb, serial)?;
    let manager = open_device(config, &serial, tracer);
    fresh_snapshot(&manager)?;

    let outcome = manager.make_node_visible(&id);
    match &outcome {
        SearchOutcome::Visible(node) => {
            let center = node.node().clickable_center();
            println!("{} visible at ({}, {})", id, center.x, center.y);
        }
        SearchOutcome::StillOccluded(node) => {
            println!("{} still occluded at {}", id, node.node().bounds());
        }
        SearchOutcome::NotFound => println!("{} not found", id),
    }
    Ok(outcome.is_visible())
}

// ============================================================================
// Mirrored commands
// ============================================================================

/// Build the device group for `targets`, with muted devices not receiving input.
pub fn build_group(
    config: &AppConfig,
    targets: &Targets,
    tracer: Option<&Arc<TraceLogger>>,
) -> CmdResult<DeviceGroup> {
    let serials = if targets.devices.is_empty() {
        list_devices(&config.adb)?
    } else {
        targets.devices.clone()
    };
    if serials.is_empty() {
        return Err("no devices attached".into());
    }

    let mut group = DeviceGroup::new();
    for serial in &serials {
        let mut device = MirroredDevice::new(open_device(config, serial, tracer));
        if targets.muted.contains(serial) {
            device.set_receiving_input(false);
        }
        group.add(device);
    }
    for muted in targets.muted.iter().filter(|m| !serials.contains(m)) {
        debug!(serial = %muted, "muted device is not in the group");
    }
    Ok(group)
}

/// Run `command` on the group and print the per-device report as JSON.
/// Returns false if any device failed.
pub fn cmd_broadcast(
    config: &AppConfig,
    targets: &Targets,
    command: DeviceCommand,
    tracer: Option<&Arc<TraceLogger>>,
) -> CmdResult<bool> {
    let group = build_group(config, targets, tracer)?;

    // Widget taps resolve against a hierarchy; start the dumps up front.
    if matches!(command, DeviceCommand::Tap { widget: Some(_), .. }) {
        for device in group.devices().iter().filter(|d| d.is_receiving_input()) {
            device.manager().refresh();
        }
    }

    let progress: &dyn ProgressSink = if command.is_long_running() {
        &LogProgress
    } else {
        &NoProgress
    };
    info!(command = %command, devices = group.len(), "broadcasting");
    let reports = group.broadcast(&command, progress);

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(!reports.iter().any(|r| r.outcome.is_failure()))
}
