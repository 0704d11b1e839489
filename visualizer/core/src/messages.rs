//! Engine Messages
//!
//! Lifecycle notifications sent from the engine to renderers over `mpsc`.
//! Frame-by-frame state does not travel here; it goes through the snapshot
//! `watch` channel, which only ever holds the latest snapshot.

use serde::{Deserialize, Serialize};

use crate::generators::Algorithm;
use crate::intents::IgnoreReason;

/// Messages from the engine to a renderer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineMessage {
    /// A run started
    RunStarted {
        /// Algorithm being played
        algorithm: Algorithm,
        /// Run epoch
        epoch: u64,
    },

    /// A run completed without being reset
    RunFinished {
        /// Algorithm that was played
        algorithm: Algorithm,
        /// Final visited / called order
        order: Vec<String>,
        /// Mutation counter at completion
        mutations: u64,
    },

    /// An intent was dropped
    IntentIgnored {
        /// Intent name, e.g. `step_back`
        intent: String,
        /// Why it was dropped
        reason: IgnoreReason,
    },

    /// An intent was rejected as a configuration error
    ConfigurationRejected {
        /// Intent name
        intent: String,
        /// Error description
        reason: String,
    },
}
