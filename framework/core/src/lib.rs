mod stop;

pub mod prelude {
    pub use crate::stop::{StopHandle, StopListener, StopReason, StoppedError};
}
