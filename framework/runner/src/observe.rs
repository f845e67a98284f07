use std::time::Duration;

use fio_control_core::prelude::{StopListener, StoppedError};
use tokio::time::MissedTickBehavior;

use crate::poller::Poller;
use crate::status::RunStatus;
use crate::types::RunHandle;

/// Poll a run every `interval` until it reaches a terminal status or a stop is requested.
///
/// `on_tick` sees every status, including the terminal one. A run that is not registered ends the
/// loop straight away with [RunStatus::Unknown]. Stopping does not cancel the run, that is left to
/// the caller.
pub async fn observe(
    poller: &Poller,
    handle: &RunHandle,
    interval: Duration,
    mut stop: StopListener,
    mut on_tick: impl FnMut(&RunStatus),
) -> Result<RunStatus, StoppedError> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            reason = stop.wait_for_stop() => {
                log::debug!("Stopped observing run {}: {reason}", handle.run_id);
                return Err(StoppedError { reason });
            }
            _ = ticker.tick() => {}
        }

        let status = poller.poll(handle);
        on_tick(&status);

        if !matches!(status, RunStatus::Running { .. }) {
            return Ok(status);
        }
    }
}
