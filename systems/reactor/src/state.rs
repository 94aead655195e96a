//! Persisted reactor progress.

use serde::{Deserialize, Serialize};

/// Persisted progress of a single reactor.
///
/// Only these three fields survive a save; absent fields read back as
/// `false` and `0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactorState {
    /// The reactor passed the activation gate.
    pub initialized: bool,
    /// The reactor completed its countdown.
    pub finished: bool,
    /// Ticks processed since activation.
    pub progress: i16,
}

impl ReactorState {
    /// Reports whether the reactor is counting down.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.initialized && !self.finished
    }
}
