//! Run context handed to cooperative traversals.
//!
//! A traversal never touches the stage directly. Each transition goes
//! through [`StepContext::apply`], which takes the lock, checks the run
//! token, mutates, counts the mutation and publishes a snapshot before the
//! lock is released. Each suspension goes through [`StepContext::pause`],
//! which checks the token on both sides of the timer.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use super::{pacing, Beat, Phase, RunToken, SharedStage, Stage};
use crate::entities::EntityModel;
use crate::generators::SortEvent;
use crate::messages::EngineMessage;
use crate::projector::Snapshot;

/// The run was superseded by a reset or a newer run
///
/// Propagated with `?` through every level of a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("run superseded")]
pub struct Cancelled;

// ============================================
// Publisher
// ============================================

/// Outbound side of the engine: latest snapshot plus lifecycle messages
///
/// The `watch` side coalesces; taps receive every published snapshot in
/// order, up to their capacity.
#[derive(Clone, Debug)]
pub struct Publisher {
    snapshots: Arc<watch::Sender<Snapshot>>,
    taps: Arc<Mutex<Vec<mpsc::Sender<Snapshot>>>>,
    messages: mpsc::Sender<EngineMessage>,
}

impl Publisher {
    /// Publisher seeded with `initial`
    #[must_use]
    pub fn new(initial: Snapshot, messages: mpsc::Sender<EngineMessage>) -> Self {
        let (snapshots, _) = watch::channel(initial);
        Self {
            snapshots: Arc::new(snapshots),
            taps: Arc::new(Mutex::new(Vec::new())),
            messages,
        }
    }

    /// Receiver of every snapshot published from now on
    ///
    /// Holds up to `capacity` unread snapshots; further snapshots are
    /// dropped for this tap until it catches up.
    #[must_use]
    pub fn tap(&self, capacity: usize) -> mpsc::Receiver<Snapshot> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.taps.lock().push(tx);
        rx
    }

    /// Receiver that always holds the latest snapshot
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Copy of the latest snapshot
    #[must_use]
    pub fn latest(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Project `stage` and replace the latest snapshot
    pub fn publish(&self, stage: &Stage) {
        let snapshot = Snapshot::project(stage);
        let mut taps = self.taps.lock();
        if !taps.is_empty() {
            taps.retain(|tap| match tap.try_send(snapshot.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(mutations = snapshot.mutations, "Snapshot tap full, dropping");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            });
        }
        drop(taps);
        self.snapshots.send_replace(snapshot);
    }

    /// Send a lifecycle message without waiting
    pub fn notify(&self, message: EngineMessage) {
        match self.messages.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(message)) => {
                tracing::warn!(?message, "Message channel full, dropping");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("No receiver for engine messages");
            }
        }
    }
}

// ============================================
// StepContext
// ============================================

/// Capability of one run to mutate the stage
pub struct StepContext {
    stage: SharedStage,
    token: RunToken,
    publisher: Publisher,
}

impl StepContext {
    /// Context for the run identified by `token`
    #[must_use]
    pub fn new(stage: SharedStage, token: RunToken, publisher: Publisher) -> Self {
        Self {
            stage,
            token,
            publisher,
        }
    }

    /// Token of the run this context belongs to
    #[must_use]
    pub fn token(&self) -> RunToken {
        self.token
    }

    /// Fail if the run has been superseded
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the stage epoch has moved on.
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        self.with_stage(|_| ())
    }

    /// Read the entity model
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the stage epoch has moved on.
    pub fn read<R>(&self, f: impl FnOnce(&EntityModel) -> R) -> Result<R, Cancelled> {
        self.with_stage(|stage| f(&stage.model))
    }

    /// Apply one transition to the entity model and publish it
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] without calling `f` when the stage epoch has
    /// moved on.
    pub fn apply<R>(&self, f: impl FnOnce(&mut EntityModel) -> R) -> Result<R, Cancelled> {
        self.with_stage(|stage| {
            let result = f(&mut stage.model);
            stage.mutations += 1;
            self.publisher.publish(stage);
            result
        })
    }

    /// Whether the precomputed sequence has events left
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the stage epoch has moved on.
    pub fn has_pending_events(&self) -> Result<bool, Cancelled> {
        self.with_stage(|stage| stage.cursor.as_ref().is_some_and(|c| !c.is_finished()))
    }

    /// Apply the next precomputed event and publish it
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the stage epoch has moved on.
    pub fn advance_cursor(&self) -> Result<Option<SortEvent>, Cancelled> {
        self.with_stage(|stage| {
            let event = stage.advance_cursor();
            if let Some(event) = event {
                tracing::debug!(?event, "Applied sort event");
                self.publisher.publish(stage);
            }
            event
        })
    }

    /// Suspend for one beat at the current speed
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the run was superseded before or during the
    /// suspension.
    pub async fn pause(&self, beat: Beat) -> Result<(), Cancelled> {
        let duration = self.with_stage(|stage| stage.pacing().beat(stage.speed, beat))?;
        pacing::wait(duration).await;
        self.checkpoint()
    }

    /// Suspend for the fixed lead-in before a cooperative run's first
    /// transition
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the run was superseded meanwhile.
    pub async fn lead_in(&self) -> Result<(), Cancelled> {
        self.checkpoint()?;
        pacing::wait(pacing::LEAD_IN).await;
        self.checkpoint()
    }

    /// Mark the run complete and return to idle
    ///
    /// Returns false if the run had already been superseded, in which case
    /// nothing changes.
    pub fn finish(&self) -> bool {
        let finished = self.with_stage(|stage| {
            stage.phase = Phase::Idle;
            self.publisher.publish(stage);
            EngineMessage::RunFinished {
                algorithm: stage.algorithm,
                order: stage.model.order.clone(),
                mutations: stage.mutations,
            }
        });
        match finished {
            Ok(message) => {
                tracing::info!(epoch = self.token.epoch(), "Run finished");
                self.publisher.notify(message);
                true
            }
            Err(Cancelled) => false,
        }
    }

    fn with_stage<R>(&self, f: impl FnOnce(&mut Stage) -> R) -> Result<R, Cancelled> {
        let mut stage = self.stage.lock();
        if !stage.is_current(self.token) {
            tracing::debug!(
                run = self.token.epoch(),
                current = stage.epoch(),
                "Suppressed continuation of superseded run"
            );
            return Err(Cancelled);
        }
        Ok(f(&mut stage))
    }
}
