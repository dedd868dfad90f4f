use tracing::{debug, info};

/// Receives progress while a command is fanned out across devices.
///
/// Passed explicitly to [`DeviceGroup::broadcast`](crate::console::group::DeviceGroup::broadcast)
/// so callers decide how (and whether) progress is shown.
pub trait ProgressSink {
    fn started(&self, label: &str, devices: usize);

    /// `percent` counts skipped devices as done.
    fn advanced(&self, serial: &str, percent: u8);

    fn finished(&self, label: &str);
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn started(&self, _label: &str, _devices: usize) {}
    fn advanced(&self, _serial: &str, _percent: u8) {}
    fn finished(&self, _label: &str) {}
}

/// Reports progress through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn started(&self, label: &str, devices: usize) {
        info!(command = %label, devices, "executing");
    }

    fn advanced(&self, serial: &str, percent: u8) {
        debug!(serial = %serial, percent, "device done");
    }

    fn finished(&self, label: &str) {
        info!(command = %label, "finished on all devices");
    }
}

/// Whole-number percentage of `done` out of `total`.
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}
