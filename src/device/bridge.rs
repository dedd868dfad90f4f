use crate::device::{
    device_model::{ActivityIntent, DragGesture},
    error::DeviceError,
};
use crate::tree::geometry::Point;

/// Blocking remote-procedure facility for one device.
///
/// Everything that crosses the wire to a device goes through this trait. The
/// widget-tree logic never talks to a transport directly.
pub trait DeviceBridge: Send + Sync {
    fn serial(&self) -> &str;

    /// Whether the on-device UI automation entry point exists.
    fn has_automation(&self) -> Result<bool, DeviceError>;

    /// Ask the device to write a fresh hierarchy dump.
    fn request_dump(&self) -> Result<(), DeviceError>;

    /// Fetch the most recently written dump payload.
    fn pull_dump(&self) -> Result<String, DeviceError>;

    /// Physical display size in pixels, as `(width, height)`.
    fn screen_size(&self) -> Result<(i32, i32), DeviceError>;

    fn drag(&self, gesture: &DragGesture) -> Result<(), DeviceError>;

    fn tap(&self, at: Point) -> Result<(), DeviceError>;

    fn press_key(&self, keycode: &str) -> Result<(), DeviceError>;

    fn input_text(&self, text: &str) -> Result<(), DeviceError>;

    fn shell(&self, command: &str) -> Result<String, DeviceError>;

    fn start_activity(&self, intent: &ActivityIntent) -> Result<(), DeviceError>;

    /// Reboot the device. The connection drops until it comes back.
    fn reboot(&self) -> Result<(), DeviceError>;
}
