use serde::Serialize;
use tracing::{debug, warn};

use crate::console::{
    command::{CommandOutput, DeviceCommand},
    error::CommandError,
    progress::{ProgressSink, percent},
};
use crate::view::manager::ViewTreeManager;

/// One device in the group, with its input switch.
pub struct MirroredDevice {
    manager: ViewTreeManager,
    receiving_input: bool,
}

impl MirroredDevice {
    pub fn new(manager: ViewTreeManager) -> Self {
        Self {
            manager,
            receiving_input: true,
        }
    }

    pub fn serial(&self) -> &str {
        self.manager.serial()
    }

    pub fn manager(&self) -> &ViewTreeManager {
        &self.manager
    }

    pub fn is_receiving_input(&self) -> bool {
        self.receiving_input
    }

    /// Stop or resume mirroring commands to this device.
    pub fn set_receiving_input(&mut self, receiving: bool) {
        self.receiving_input = receiving;
    }

    /// Run `command`, then start a fresh hierarchy dump so the next command
    /// resolves widgets against the screen it produced. Restarts skip the dump.
    pub fn execute(&self, command: &DeviceCommand) -> Result<CommandOutput, CommandError> {
        let result = command.execute(&self.manager);
        if command.refreshes_hierarchy() && self.manager.supports_automation() {
            // One dump at a time per device: let the pending one land first.
            self.manager.snapshot();
            self.manager.refresh();
        }
        result
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeviceOutcome {
    Completed(CommandOutput),
    Failed { error: String },
    /// Input to the device is switched off.
    Skipped,
}

impl DeviceOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DeviceOutcome::Failed { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct DeviceReport {
    pub serial: String,
    pub outcome: DeviceOutcome,
}

/// Every device driven from one console.
#[derive(Default)]
pub struct DeviceGroup {
    devices: Vec<MirroredDevice>,
}

impl DeviceGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, device: MirroredDevice) {
        self.devices.push(device);
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn devices(&self) -> &[MirroredDevice] {
        &self.devices
    }

    pub fn device_mut(&mut self, serial: &str) -> Option<&mut MirroredDevice> {
        self.devices.iter_mut().find(|d| d.serial() == serial)
    }

    /// Switch input for one device. Returns false for an unknown serial.
    pub fn set_receiving_input(&mut self, serial: &str, receiving: bool) -> bool {
        match self.device_mut(serial) {
            Some(device) => {
                device.set_receiving_input(receiving);
                true
            }
            None => false,
        }
    }

    /// Run `command` on every device that receives input, one after another.
    ///
    /// A failing device is reported and the rest still run.
    pub fn broadcast(&self, command: &DeviceCommand, progress: &dyn ProgressSink) -> Vec<DeviceReport> {
        let label = command.to_string();
        let total = self.devices.len();
        progress.started(&label, total);

        let mut reports = Vec::with_capacity(total);
        for (done, device) in self.devices.iter().enumerate() {
            let outcome = if !device.is_receiving_input() {
                debug!(serial = %device.serial(), "input suppressed, skipping");
                DeviceOutcome::Skipped
            } else {
                match device.execute(command) {
                    Ok(output) => DeviceOutcome::Completed(output),
                    Err(e) => {
                        warn!(serial = %device.serial(), command = %label, error = %e, "command failed");
                        DeviceOutcome::Failed { error: e.to_string() }
                    }
                }
            };
            progress.advanced(device.serial(), percent(done + 1, total));
            reports.push(DeviceReport {
                serial: device.serial().to_string(),
                outcome,
            });
        }

        progress.finished(&label);
        reports
    }
}
