use std::time::Duration;

use fio_control_core::prelude::{StopHandle, StopReason};
use tokio::signal;

/// Ask observers to stop when the user presses Ctrl-C.
///
/// Must be called from within a Tokio runtime.
pub fn stop_on_interrupt(handle: StopHandle) {
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Received interrupt, stopping...");
                handle.stop(StopReason::Interrupted);
            }
            Err(e) => log::error!("Failed to listen for Ctrl-C: {e}"),
        }
    });
}

/// Ask observers to stop once `timeout` has elapsed.
///
/// Must be called from within a Tokio runtime.
pub fn stop_after(handle: StopHandle, timeout: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        log::info!("Timeout of {}s reached, stopping...", timeout.as_secs());
        handle.stop(StopReason::TimedOut);
    });
}
