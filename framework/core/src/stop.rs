use std::sync::Arc;

use tokio::sync::broadcast::{error::TryRecvError, Receiver, Sender};
use tokio::sync::Mutex;

/// Why an observer loop was asked to stop watching a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum StopReason {
    /// The user interrupted the observer, usually with Ctrl-C.
    #[display("interrupted")]
    Interrupted,
    /// A caller-imposed hard timeout elapsed before the run finished.
    #[display("timed out")]
    TimedOut,
}

/// Broadcasts a stop request to every [StopListener] created from it.
///
/// The handle is cheap to clone, so the signal handler, the timeout task and the observer loop can
/// all hold one.
#[derive(Debug, Clone)]
pub struct StopHandle {
    sender: Sender<StopReason>,
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StopHandle {
    pub fn new() -> Self {
        Self {
            sender: tokio::sync::broadcast::channel(4).0,
        }
    }

    pub fn stop(&self, reason: StopReason) {
        if let Err(e) = self.sender.send(reason) {
            // Nobody is observing a run, so there is nothing to stop.
            log::debug!("Stop request ({reason}) had no listeners: {e:?}");
        }
    }

    pub fn new_listener(&self) -> StopListener {
        StopListener::new(self.sender.subscribe())
    }
}

#[derive(Clone, Debug)]
pub struct StopListener {
    receiver: Arc<Mutex<Receiver<StopReason>>>,
}

impl StopListener {
    pub(crate) fn new(receiver: Receiver<StopReason>) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Point in time check for a stop request. Returns the reason if one has been received.
    pub fn should_stop(&mut self) -> Option<StopReason> {
        let Ok(mut guard) = self.receiver.try_lock() else {
            return None;
        };

        match guard.try_recv() {
            Ok(reason) => Some(reason),
            // Every handle is gone, nothing can ask us to stop any more.
            Err(TryRecvError::Closed) => None,
            Err(TryRecvError::Lagged(_)) => Some(StopReason::Interrupted),
            Err(TryRecvError::Empty) => None,
        }
    }

    /// Wait until a stop request is received. Safe to race with other futures in a
    /// `tokio::select!`.
    ///
    /// If every [StopHandle] is dropped this future never resolves.
    pub async fn wait_for_stop(&mut self) -> StopReason {
        let mut guard = self.receiver.lock().await;
        loop {
            match guard.recv().await {
                Ok(reason) => return reason,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}

/// Returned when observation of a run ended because of a stop request rather than the run
/// reaching a terminal state.
#[derive(derive_more::Error, derive_more::Display, Debug)]
#[display("Observation stopped: {reason}")]
pub struct StoppedError {
    pub reason: StopReason,
}
