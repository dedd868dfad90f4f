use std::process::Command;

use tracing::{debug, trace};

use crate::device::{
    bridge::DeviceBridge,
    device_model::{ActivityIntent, AdbSettings, DragGesture},
    error::DeviceError,
};
use crate::tree::geometry::Point;

/// On-device automation binary. Present from API level 16.
pub const UIAUTOMATOR_PATH: &str = "/system/bin/uiautomator";

/// Fragment of uiautomator's acknowledgement after a successful dump.
const DUMP_ACK: &str = "dumped to";

/// A device reached through the `adb` command line tool.
///
/// Every call spawns one `adb -s <serial> ...` process and waits for it.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    serial: String,
    settings: AdbSettings,
}

impl AdbBridge {
    pub fn new(serial: &str, settings: AdbSettings) -> Self {
        Self {
            serial: serial.to_string(),
            settings,
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, DeviceError> {
        let command_line = format!("adb -s {} {}", self.serial, args.join(" "));
        trace!(command = %command_line, "running");

        let output = Command::new(&self.settings.adb_path)
            .arg("-s")
            .arg(&self.serial)
            .args(args)
            .output()
            .map_err(|e| DeviceError::Spawn {
                program: self.settings.adb_path.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(DeviceError::CommandFailed {
                command: command_line,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn shell_args(&self, args: &[&str]) -> Result<String, DeviceError> {
        let mut full = vec!["shell"];
        full.extend_from_slice(args);
        self.run(&full)
    }
}

impl DeviceBridge for AdbBridge {
    fn serial(&self) -> &str {
        &self.serial
    }

    fn has_automation(&self) -> Result<bool, DeviceError> {
        let out = self.shell_args(&["ls", UIAUTOMATOR_PATH])?;
        Ok(out.trim() == UIAUTOMATOR_PATH)
    }

    fn request_dump(&self) -> Result<(), DeviceError> {
        let path = self.settings.device_dump_path.as_str();

        // A stale file would be pulled if the new dump silently failed.
        if let Err(e) = self.shell_args(&["rm", "-f", path]) {
            debug!(serial = %self.serial, error = %e, "could not remove previous dump");
        }

        let out = self.shell_args(&[UIAUTOMATOR_PATH, "dump", path])?;
        if out.contains(DUMP_ACK) {
            Ok(())
        } else {
            Err(DeviceError::UnexpectedOutput {
                command: format!("uiautomator dump {}", path),
                output: out.trim().to_string(),
            })
        }
    }

    fn pull_dump(&self) -> Result<String, DeviceError> {
        self.run(&["exec-out", "cat", self.settings.device_dump_path.as_str()])
    }

    fn screen_size(&self) -> Result<(i32, i32), DeviceError> {
        let out = self.shell_args(&["wm", "size"])?;
        parse_screen_size(&out).ok_or_else(|| DeviceError::UnexpectedOutput {
            command: "wm size".into(),
            output: out.trim().to_string(),
        })
    }

    fn drag(&self, gesture: &DragGesture) -> Result<(), DeviceError> {
        // `input swipe` interpolates on its own; the step count is advisory.
        let coords = [
            gesture.start.x.to_string(),
            gesture.start.y.to_string(),
            gesture.end.x.to_string(),
            gesture.end.y.to_string(),
            gesture.duration_ms.to_string(),
        ];
        let mut args = vec!["input", "swipe"];
        args.extend(coords.iter().map(String::as_str));
        self.shell_args(&args)?;
        Ok(())
    }

    fn tap(&self, at: Point) -> Result<(), DeviceError> {
        let (x, y) = (at.x.to_string(), at.y.to_string());
        self.shell_args(&["input", "tap", x.as_str(), y.as_str()])?;
        Ok(())
    }

    fn press_key(&self, keycode: &str) -> Result<(), DeviceError> {
        self.shell_args(&["input", "keyevent", keycode])?;
        Ok(())
    }

    fn input_text(&self, text: &str) -> Result<(), DeviceError> {
        let escaped = text.replace(' ', "%s");
        self.shell_args(&["input", "text", escaped.as_str()])?;
        Ok(())
    }

    fn shell(&self, command: &str) -> Result<String, DeviceError> {
        self.shell_args(&[command])
    }

    fn start_activity(&self, intent: &ActivityIntent) -> Result<(), DeviceError> {
        let options = intent.am_start_args();
        let mut args = vec!["am", "start"];
        args.extend(options.iter().map(String::as_str));

        // `am` reports bad intents on stdout and still exits 0.
        let out = self.shell_args(&args)?;
        if out.contains("Error") {
            return Err(DeviceError::UnexpectedOutput {
                command: format!("am start {}", options.join(" ")),
                output: out.trim().to_string(),
            });
        }
        Ok(())
    }

    fn reboot(&self) -> Result<(), DeviceError> {
        debug!(serial = %self.serial, "rebooting");
        self.run(&["reboot"])?;
        Ok(())
    }
}

/// Serials of every attached device in the `device` state.
pub fn list_devices(settings: &AdbSettings) -> Result<Vec<String>, DeviceError> {
    let output = Command::new(&settings.adb_path)
        .arg("devices")
        .output()
        .map_err(|e| DeviceError::Spawn {
            program: settings.adb_path.clone(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(DeviceError::CommandFailed {
            command: "adb devices".into(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(parse_device_list(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `adb devices` output, keeping only ready devices.
pub fn parse_device_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip_while(|line| !line.starts_with("List of devices"))
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(serial), Some("device")) => Some(serial.to_string()),
                _ => None,
            }
        })
        .collect()
}

/// Parse `wm size` output. An override size wins over the physical one.
pub fn parse_screen_size(output: &str) -> Option<(i32, i32)> {
    let mut physical = None;
    let mut overridden = None;
    for line in output.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let Some((w, h)) = value.trim().split_once('x') else {
            continue;
        };
        let size = (w.trim().parse().ok()?, h.trim().parse().ok()?);
        if label.trim().starts_with("Override") {
            overridden = Some(size);
        } else {
            physical = Some(size);
        }
    }
    overridden.or(physical)
}
