use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::console::error::CommandError;
use crate::device::device_model::{ActivityIntent, DEFAULT_DRAG_DURATION_MS, DragGesture};
use crate::tree::{geometry::Point, identity::UniqueId};
use crate::view::manager::{ViewTreeManager, scaled_point};

/// A position given as fractions of the screen width and height, so one
/// command addresses the same spot on devices with different resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaledPoint {
    pub x: f64,
    pub y: f64,
}

impl ScaledPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn validate(&self) -> Result<(), CommandError> {
        for v in [self.x, self.y] {
            if !(0.0..=1.0).contains(&v) {
                return Err(CommandError::InvalidScale(v));
            }
        }
        Ok(())
    }
}

/// One operator action, replayed on every mirrored device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceCommand {
    /// Tap a widget by id when the device can resolve it, else the scaled spot.
    Tap {
        at: ScaledPoint,
        widget: Option<UniqueId>,
    },
    Drag {
        from: ScaledPoint,
        to: ScaledPoint,
        duration_ms: u64,
    },
    Key {
        keycode: String,
    },
    Text {
        text: String,
    },
    Shell {
        command: String,
    },
    StartActivity {
        intent: ActivityIntent,
    },
    /// Reboot. The device drops off until it is back up.
    Restart,
}

/// What a command did on one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutput {
    Tapped { at: Point, widget_resolved: bool },
    Dragged { gesture: DragGesture },
    KeyPressed,
    TextEntered,
    Shell { output: String },
    ActivityStarted,
    Restarted,
}

impl DeviceCommand {
    pub fn tap(x_scale: f64, y_scale: f64, widget: Option<UniqueId>) -> Self {
        DeviceCommand::Tap {
            at: ScaledPoint::new(x_scale, y_scale),
            widget,
        }
    }

    pub fn drag(from: ScaledPoint, to: ScaledPoint) -> Self {
        DeviceCommand::Drag {
            from,
            to,
            duration_ms: DEFAULT_DRAG_DURATION_MS,
        }
    }

    /// Commands slow enough to deserve a visible progress report.
    pub fn is_long_running(&self) -> bool {
        matches!(
            self,
            DeviceCommand::Drag { .. } | DeviceCommand::Shell { .. } | DeviceCommand::Restart
        )
    }

    /// Whether a fresh hierarchy dump should follow the command. A rebooting
    /// device cannot produce one.
    pub fn refreshes_hierarchy(&self) -> bool {
        !matches!(self, DeviceCommand::Restart)
    }

    /// Run on one device. The hierarchy is not refreshed here; see
    /// [`DeviceGroup::broadcast`](crate::console::group::DeviceGroup::broadcast).
    pub fn execute(&self, manager: &ViewTreeManager) -> Result<CommandOutput, CommandError> {
        let bridge = manager.bridge();
        match self {
            DeviceCommand::Tap { at, widget } => {
                at.validate()?;
                let resolved = widget.as_ref().and_then(|id| resolve_widget(manager, id));
                let point = match resolved {
                    Some(p) => p,
                    None => {
                        let (w, h) = screen_size(manager)?;
                        scaled_point(w, h, at.x, at.y)
                    }
                };
                bridge.tap(point)?;
                Ok(CommandOutput::Tapped {
                    at: point,
                    widget_resolved: resolved.is_some(),
                })
            }
            DeviceCommand::Drag { from, to, duration_ms } => {
                from.validate()?;
                to.validate()?;
                let (w, h) = screen_size(manager)?;
                let gesture = DragGesture::interpolated(
                    scaled_point(w, h, from.x, from.y),
                    scaled_point(w, h, to.x, to.y),
                    *duration_ms,
                );
                bridge.drag(&gesture)?;
                Ok(CommandOutput::Dragged { gesture })
            }
            DeviceCommand::Key { keycode } => {
                bridge.press_key(keycode)?;
                Ok(CommandOutput::KeyPressed)
            }
            DeviceCommand::Text { text } => {
                bridge.input_text(text)?;
                Ok(CommandOutput::TextEntered)
            }
            DeviceCommand::Shell { command } => Ok(CommandOutput::Shell {
                output: bridge.shell(command)?,
            }),
            DeviceCommand::StartActivity { intent } => {
                if intent.is_empty() {
                    return Err(CommandError::EmptyIntent);
                }
                bridge.start_activity(intent)?;
                Ok(CommandOutput::ActivityStarted)
            }
            DeviceCommand::Restart => {
                info!(serial = %manager.serial(), "restarting device");
                bridge.reboot()?;
                Ok(CommandOutput::Restarted)
            }
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCommand::Tap { at, widget: Some(id) } => {
                write!(f, "tap {} ({:.3}, {:.3})", id, at.x, at.y)
            }
            DeviceCommand::Tap { at, widget: None } => write!(f, "tap ({:.3}, {:.3})", at.x, at.y),
            DeviceCommand::Drag { from, to, .. } => write!(
                f,
                "drag ({:.3}, {:.3}) -> ({:.3}, {:.3})",
                from.x, from.y, to.x, to.y
            ),
            DeviceCommand::Key { keycode } => write!(f, "key {}", keycode),
            DeviceCommand::Text { text } => write!(f, "text {:?}", text),
            DeviceCommand::Shell { command } => write!(f, "shell {}", command),
            DeviceCommand::StartActivity { intent } => write!(f, "start {}", intent),
            DeviceCommand::Restart => f.write_str("restart"),
        }
    }
}

/// Clickable centre of `id` after making it visible. Occluded widgets are
/// still tapped at their best-known position.
fn resolve_widget(manager: &ViewTreeManager, id: &UniqueId) -> Option<Point> {
    if !manager.supports_automation() {
        debug!(serial = %manager.serial(), "no automation, tapping by scale");
        return None;
    }
    let node = manager.make_node_visible(id).into_node()?;
    let center = node.node().clickable_center();
    info!(serial = %manager.serial(), id = %id, x = center.x, y = center.y, "tapping widget");
    Some(center)
}

/// Screen size from the current hierarchy, or from the device itself when
/// there is no hierarchy.
fn screen_size(manager: &ViewTreeManager) -> Result<(i32, i32), CommandError> {
    let (w, h) = match manager.snapshot() {
        Some(snapshot) => {
            let bounds = snapshot.root().data().bounds();
            (bounds.width(), bounds.height())
        }
        None => manager.bridge().screen_size()?,
    };
    if w <= 0 || h <= 0 {
        return Err(CommandError::EmptyScreen(manager.serial().to_string()));
    }
    Ok((w, h))
}
