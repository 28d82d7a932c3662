//! Client-side reconciliation engine for the TrailBack operator console.
//!
//! A [`ConsoleSession`] polls the remote agent through a [`RemoteController`], folds each
//! status sample into a [`ConsoleState`] and forwards mode toggles through a [`ModeCommander`].

pub mod commander;
pub mod display;
pub mod error;
pub mod poller;
pub mod session;
pub mod state;
pub mod timeline;
pub mod transport;

pub use commander::{ModeCommander, ModeRequest};
pub use display::{GaugeBand, SignalStrength, StatusDisplay, StatusTone};
pub use error::{ConsoleError, FailureKind};
pub use poller::{PollerHandle, StatusPoller, StatusSink, DEFAULT_POLL_INTERVAL};
pub use session::{ConsoleEvent, ConsoleSession, SessionOptions};
pub use state::{ConsoleState, LinkState, SampleApplied, DEFAULT_LINK_LOSS_THRESHOLD};
pub use timeline::{reconcile, Reconciliation, Timeline, TimelineEntry};
pub use transport::{HttpRemoteController, RemoteController, DEFAULT_REQUEST_TIMEOUT};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
