use serde::{Deserialize, Serialize};

use crate::tree::geometry::Point;

/// Step count used by scroll-search drags.
pub const DEFAULT_DRAG_STEPS: u32 = 20;

/// Duration used by scroll-search drags.
pub const DEFAULT_DRAG_DURATION_MS: u64 = 1000;

/// A press-move-release gesture in device pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragGesture {
    pub start: Point,
    pub end: Point,
    pub steps: u32,
    pub duration_ms: u64,
}

impl DragGesture {
    pub fn new(start: Point, end: Point, steps: u32, duration_ms: u64) -> Self {
        Self {
            start,
            end,
            steps: steps.max(1),
            duration_ms,
        }
    }

    /// Step count proportional to the travelled distance (one step per four pixels).
    pub fn interpolated(start: Point, end: Point, duration_ms: u64) -> Self {
        let steps = (start.distance(&end) * 0.25) as u32;
        Self::new(start, end, steps, duration_ms)
    }
}

/// Activity launch request, mapped onto `am start` options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivityIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// `package/.Activity` component name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    #[serde(default)]
    pub flags: u32,
}

impl ActivityIntent {
    pub fn is_empty(&self) -> bool {
        self.action.is_none() && self.component.is_none() && self.data.is_none()
    }

    /// Arguments following `am start`. The component goes last, as `am` expects.
    pub fn am_start_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        let mut option = |flag: &str, value: &str| {
            args.push(flag.to_string());
            args.push(value.to_string());
        };
        if let Some(action) = &self.action {
            option("-a", action);
        }
        if let Some(data) = &self.data {
            option("-d", data);
        }
        if let Some(mime) = &self.mime_type {
            option("-t", mime);
        }
        for category in &self.categories {
            option("-c", category);
        }
        if self.flags != 0 {
            option("-f", &format!("0x{:x}", self.flags));
        }
        if let Some(component) = &self.component {
            option("-n", component);
        }
        args
    }
}

impl std::fmt::Display for ActivityIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.component, &self.action) {
            (Some(component), _) => f.write_str(component),
            (None, Some(action)) => f.write_str(action),
            (None, None) => f.write_str(self.data.as_deref().unwrap_or("<empty intent>")),
        }
    }
}

/// Where the device bridge lives and where dumps are written on the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdbSettings {
    #[serde(default = "default_adb_path")]
    pub adb_path: String,

    #[serde(default = "default_dump_path")]
    pub device_dump_path: String,
}

impl Default for AdbSettings {
    fn default() -> Self {
        Self {
            adb_path: default_adb_path(),
            device_dump_path: default_dump_path(),
        }
    }
}

fn default_adb_path() -> String { "adb".to_string() }
fn default_dump_path() -> String { "/sdcard/uidump.xml".to_string() }
