use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::analysis::search_model::SearchSettings;
use crate::device::device_model::{ActivityIntent, AdbSettings, DEFAULT_DRAG_DURATION_MS};

pub const DEFAULT_CONFIG_PATH: &str = "test-demux.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "test-demux",
    version,
    about = "Mirror input across Android devices and reason about their widget trees"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: test-demux.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Write a JSONL search trace to this file (overrides the config file)
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List attached devices
    Devices,

    /// Print the widget hierarchy of one device, or of a saved dump file
    Dump {
        #[arg(long)]
        serial: Option<String>,

        /// Parse a local uiautomator dump instead of asking a device
        #[arg(long, conflicts_with = "serial")]
        file: Option<String>,
    },

    /// Report the widget a tap at a device pixel would hit
    Locate {
        #[arg(long)]
        serial: Option<String>,

        #[arg(long)]
        x: i32,

        #[arg(long)]
        y: i32,
    },

    /// List the widgets covering a widget
    Occluded {
        #[arg(long)]
        serial: Option<String>,

        /// Widget id, dot-delimited (0.0.3)
        #[arg(long)]
        id: String,
    },

    /// Scroll until a widget is on screen and uncovered
    Visible {
        #[arg(long)]
        serial: Option<String>,

        #[arg(long)]
        id: String,
    },

    /// Tap on every device
    Tap {
        #[command(flatten)]
        targets: Targets,

        /// Horizontal position as a fraction of the screen width
        #[arg(long)]
        x: f64,

        /// Vertical position as a fraction of the screen height
        #[arg(long)]
        y: f64,

        /// Widget to tap where the device can resolve it
        #[arg(long)]
        id: Option<String>,
    },

    /// Drag on every device, positions as fractions of the screen size
    Drag {
        #[command(flatten)]
        targets: Targets,

        #[arg(long)]
        from_x: f64,

        #[arg(long)]
        from_y: f64,

        #[arg(long)]
        to_x: f64,

        #[arg(long)]
        to_y: f64,

        #[arg(long, default_value_t = DEFAULT_DRAG_DURATION_MS)]
        duration_ms: u64,
    },

    /// Press a key on every device (e.g. KEYCODE_BACK)
    Key {
        #[command(flatten)]
        targets: Targets,

        keycode: String,
    },

    /// Type text on every device
    Text {
        #[command(flatten)]
        targets: Targets,

        text: String,
    },

    /// Run a shell command on every device
    Shell {
        #[command(flatten)]
        targets: Targets,

        command: String,
    },

    /// Start an activity on every device
    Start {
        #[command(flatten)]
        targets: Targets,

        #[command(flatten)]
        intent: IntentArgs,
    },

    /// Reboot every device
    Restart {
        #[command(flatten)]
        targets: Targets,
    },
}

/// Intent options, as `am start` takes them.
#[derive(Args, Debug, Default, Clone)]
pub struct IntentArgs {
    /// Intent action (e.g. android.intent.action.VIEW)
    #[arg(long)]
    pub action: Option<String>,

    /// Component to launch, as package/.Activity
    #[arg(long)]
    pub component: Option<String>,

    /// Data uri
    #[arg(long)]
    pub data: Option<String>,

    #[arg(long)]
    pub mime_type: Option<String>,

    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Intent flags, decimal or 0x-prefixed hex
    #[arg(long, default_value = "0", value_parser = parse_flags)]
    pub flags: u32,
}

impl From<IntentArgs> for ActivityIntent {
    fn from(args: IntentArgs) -> Self {
        ActivityIntent {
            action: args.action,
            component: args.component,
            data: args.data,
            mime_type: args.mime_type,
            categories: args.categories,
            flags: args.flags,
        }
    }
}

fn parse_flags(raw: &str) -> Result<u32, String> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| format!("invalid intent flags '{}': {}", raw, e))
}

/// Which devices a mirrored command goes to.
#[derive(Args, Debug, Default, Clone)]
pub struct Targets {
    /// Only these devices (default: every attached device)
    #[arg(long = "device")]
    pub devices: Vec<String>,

    /// Keep these devices in the group but do not send them input
    #[arg(long = "mute")]
    pub muted: Vec<String>,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `test-demux.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub adb: AdbSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    /// JSONL file for scroll search traces. Disabled when unset.
    pub path: Option<String>,
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => match serde_yaml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %config_path, error = %e, "malformed config, using defaults");
                AppConfig::default()
            }
        },
        Err(_) => AppConfig::default(),
    }
}
