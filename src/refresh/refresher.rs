use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};

use crate::device::{bridge::DeviceBridge, error::DeviceError};
use crate::parser::dump_parser::{ParseError, try_parse};
use crate::refresh::source::SnapshotSource;
use crate::tree::snapshot::Snapshot;

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("no snapshot published within {0:?}")]
    TimedOut(Duration),
}

/// Publish-once slot shared between the refresher and its worker thread.
#[derive(Default)]
struct Slot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

#[derive(Default)]
struct SlotState {
    /// Ticket of the newest refresh request.
    requested: u64,
    /// Ticket whose result is currently published.
    published: u64,
    in_flight: bool,
    snapshot: Option<Arc<Snapshot>>,
}

impl SlotState {
    fn is_ready(&self) -> bool {
        self.published == self.requested
    }
}

/// Runs the dump, pull and parse cycle for one device in the background.
///
/// At most one cycle runs at a time. Requests that arrive while a cycle is
/// running are coalesced: the running result is discarded and a single new
/// cycle runs for the newest request. Readers only ever see a complete
/// generation, swapped in atomically behind an `Arc`.
pub struct SnapshotRefresher {
    bridge: Arc<dyn DeviceBridge>,
    slot: Arc<Slot>,
}

impl SnapshotRefresher {
    pub fn new(bridge: Arc<dyn DeviceBridge>) -> Self {
        Self {
            bridge,
            slot: Arc::new(Slot::default()),
        }
    }

    pub fn serial(&self) -> &str {
        self.bridge.serial()
    }

    /// Start a new refresh cycle, superseding any cycle still running.
    pub fn refresh(&self) {
        let mut state = self.slot.state.lock();
        state.requested += 1;
        let ticket = state.requested;

        if state.in_flight {
            debug!(serial = %self.serial(), ticket, "refresh supersedes running cycle");
            return;
        }
        state.in_flight = true;
        drop(state);

        let bridge = Arc::clone(&self.bridge);
        let slot = Arc::clone(&self.slot);
        let spawned = thread::Builder::new()
            .name(format!("snapshot-{}", self.serial()))
            .spawn(move || run_worker(bridge.as_ref(), &slot));

        if let Err(e) = spawned {
            error!(serial = %self.serial(), error = %e, "could not start refresh worker");
            let mut state = self.slot.state.lock();
            state.in_flight = false;
            state.snapshot = None;
            state.published = state.requested;
            self.slot.ready.notify_all();
        }
    }

    pub fn is_ready(&self) -> bool {
        self.slot.state.lock().is_ready()
    }

    /// Block until the newest requested generation is published.
    ///
    /// Returns `None` when that generation failed (no automation, transport
    /// error, unparseable dump) or when nothing was ever requested.
    pub fn wait_until_ready(&self) -> Option<Arc<Snapshot>> {
        let mut state = self.slot.state.lock();
        while !state.is_ready() {
            self.slot.ready.wait(&mut state);
        }
        state.snapshot.clone()
    }

    /// Like [`wait_until_ready`](Self::wait_until_ready) but gives up after `timeout`.
    pub fn wait_until_ready_for(
        &self,
        timeout: Duration,
    ) -> Result<Option<Arc<Snapshot>>, RefreshError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.slot.state.lock();
        while !state.is_ready() {
            if self.slot.ready.wait_until(&mut state, deadline).timed_out() && !state.is_ready() {
                return Err(RefreshError::TimedOut(timeout));
            }
        }
        Ok(state.snapshot.clone())
    }

    /// Last published generation, without waiting.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.slot.state.lock().snapshot.clone()
    }
}

impl SnapshotSource for SnapshotRefresher {
    fn current(&self) -> Option<Arc<Snapshot>> {
        self.wait_until_ready()
    }

    fn refresh_and_wait(&self) -> Option<Arc<Snapshot>> {
        self.refresh();
        self.wait_until_ready()
    }
}

fn run_worker(bridge: &dyn DeviceBridge, slot: &Slot) {
    loop {
        let ticket = slot.state.lock().requested;
        let snapshot = capture(bridge, ticket).map(Arc::new);

        let mut state = slot.state.lock();
        if state.requested == ticket {
            state.snapshot = snapshot;
            state.published = ticket;
            state.in_flight = false;
            slot.ready.notify_all();
            return;
        }
        debug!(serial = %bridge.serial(), ticket, "discarding superseded snapshot");
    }
}

/// One complete cycle. Failures are logged and reported as `None`.
pub fn capture(bridge: &dyn DeviceBridge, generation: u64) -> Option<Snapshot> {
    match try_capture(bridge) {
        Ok(snapshot) => {
            info!(
                serial = %bridge.serial(),
                generation,
                nodes = snapshot.len(),
                "hierarchy snapshot ready"
            );
            Some(snapshot.with_generation(generation))
        }
        Err(e) => {
            warn!(serial = %bridge.serial(), generation, error = %e, "hierarchy refresh failed");
            None
        }
    }
}

pub fn try_capture(bridge: &dyn DeviceBridge) -> Result<Snapshot, RefreshError> {
    if !bridge.has_automation()? {
        return Err(DeviceError::AutomationUnavailable(bridge.serial().to_string()).into());
    }
    bridge.request_dump()?;
    let payload = bridge.pull_dump()?;
    Ok(try_parse(&payload)?)
}
