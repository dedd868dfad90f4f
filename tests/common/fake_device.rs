use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use test_demux::device::{
    bridge::DeviceBridge,
    device_model::{ActivityIntent, DragGesture},
    error::DeviceError,
};
use test_demux::tree::geometry::Point;

/// In-memory device serving a scripted sequence of dumps.
///
/// Each pull returns the next dump; the last one repeats forever. Every
/// input call is recorded.
pub struct FakeDevice {
    serial: String,
    automation: bool,
    failing_input: bool,
    screen: (i32, i32),
    pull_delay: Duration,
    dumps: Mutex<VecDeque<String>>,
    pub pulls: Mutex<usize>,
    pub drags: Mutex<Vec<DragGesture>>,
    pub taps: Mutex<Vec<Point>>,
    pub keys: Mutex<Vec<String>>,
    pub texts: Mutex<Vec<String>>,
    pub shells: Mutex<Vec<String>>,
    pub activities: Mutex<Vec<ActivityIntent>>,
    pub reboots: Mutex<usize>,
}

impl FakeDevice {
    pub fn new(serial: &str, dumps: Vec<String>) -> Self {
        Self {
            serial: serial.to_string(),
            automation: true,
            failing_input: false,
            screen: (1080, 1920),
            pull_delay: Duration::ZERO,
            dumps: Mutex::new(dumps.into()),
            pulls: Mutex::new(0),
            drags: Mutex::new(Vec::new()),
            taps: Mutex::new(Vec::new()),
            keys: Mutex::new(Vec::new()),
            texts: Mutex::new(Vec::new()),
            shells: Mutex::new(Vec::new()),
            activities: Mutex::new(Vec::new()),
            reboots: Mutex::new(0),
        }
    }

    pub fn without_automation(mut self) -> Self {
        self.automation = false;
        self
    }

    /// Every input call fails with a transport error.
    pub fn failing_input(mut self) -> Self {
        self.failing_input = true;
        self
    }

    pub fn with_pull_delay(mut self, delay: Duration) -> Self {
        self.pull_delay = delay;
        self
    }

    pub fn drag_count(&self) -> usize {
        self.drags.lock().len()
    }

    pub fn pull_count(&self) -> usize {
        *self.pulls.lock()
    }

    fn check_input(&self, command: &str) -> Result<(), DeviceError> {
        if self.failing_input {
            return Err(DeviceError::CommandFailed {
                command: command.to_string(),
                status: "exit status: 1".into(),
                stderr: "error: device offline".into(),
            });
        }
        Ok(())
    }
}

impl DeviceBridge for FakeDevice {
    fn serial(&self) -> &str {
        &self.serial
    }

    fn has_automation(&self) -> Result<bool, DeviceError> {
        Ok(self.automation)
    }

    fn request_dump(&self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn pull_dump(&self) -> Result<String, DeviceError> {
        if !self.pull_delay.is_zero() {
            thread::sleep(self.pull_delay);
        }
        *self.pulls.lock() += 1;

        let mut dumps = self.dumps.lock();
        let payload = if dumps.len() > 1 {
            dumps.pop_front()
        } else {
            dumps.front().cloned()
        };
        payload.ok_or_else(|| DeviceError::UnexpectedOutput {
            command: "cat".into(),
            output: String::new(),
        })
    }

    fn screen_size(&self) -> Result<(i32, i32), DeviceError> {
        Ok(self.screen)
    }

    fn drag(&self, gesture: &DragGesture) -> Result<(), DeviceError> {
        self.check_input("input swipe")?;
        self.drags.lock().push(gesture.clone());
        Ok(())
    }

    fn tap(&self, at: Point) -> Result<(), DeviceError> {
        self.check_input("input tap")?;
        self.taps.lock().push(at);
        Ok(())
    }

    fn press_key(&self, keycode: &str) -> Result<(), DeviceError> {
        self.check_input("input keyevent")?;
        self.keys.lock().push(keycode.to_string());
        Ok(())
    }

    fn input_text(&self, text: &str) -> Result<(), DeviceError> {
        self.check_input("input text")?;
        self.texts.lock().push(text.to_string());
        Ok(())
    }

    fn shell(&self, command: &str) -> Result<String, DeviceError> {
        self.check_input(command)?;
        self.shells.lock().push(command.to_string());
        Ok(format!("ran {}", command))
    }

    fn start_activity(&self, intent: &ActivityIntent) -> Result<(), DeviceError> {
        self.check_input("am start")?;
        self.activities.lock().push(intent.clone());
        Ok(())
    }

    fn reboot(&self) -> Result<(), DeviceError> {
        self.check_input("reboot")?;
        *self.reboots.lock() += 1;
        Ok(())
    }
}
