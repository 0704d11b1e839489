//! The Engine
//!
//! Owns the stage and turns renderer intents into runs. At most one run is
//! alive per engine; it is a spawned task holding a [`StepContext`] for the
//! epoch it was started under.
//!
//! Every intent other than play, pause and reset is idle-only: while a run
//! is in progress it is ignored with [`IgnoreReason::Busy`], never queued.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::entities::{ArraySpec, Bars, EntityModel, Graph, SearchTree};
use crate::error::EngineError;
use crate::generators::{self, Algorithm, Family, Mode, RecursionAlgorithm};
use crate::intents::{IgnoreReason, Intent, Outcome};
use crate::messages::EngineMessage;
use crate::playback::{
    Beat, Cancelled, EventCursor, ModeInputs, Phase, Publisher, SharedStage, Speed, Stage,
    StepContext,
};
use crate::projector::Snapshot;

/// The algorithm-to-animation engine
pub struct Engine {
    /// Shared with the active run
    stage: SharedStage,
    /// Snapshot and message outlet
    publisher: Publisher,
    /// Demo array source
    rng: StdRng,
    /// Task of the most recent run
    run: Option<JoinHandle<()>>,
}

impl Engine {
    /// Build the default entities and an idle stage from `config`
    ///
    /// Lifecycle messages go to `tx`; snapshots are available through
    /// [`Engine::subscribe`].
    pub fn new(config: &EngineConfig, tx: mpsc::Sender<EngineMessage>) -> Self {
        let mut rng = config.rng();
        let mut model = EntityModel::build_default(&mut rng, &config.array);
        if let Err(e) = model
            .graph
            .set_endpoints(&config.graph_start, &config.graph_end)
        {
            tracing::warn!(error = %e, "Keeping default graph endpoints");
        }

        let stage = Stage::new(
            model,
            config.initial_algorithm(),
            config.speed,
            config.array,
            config.inputs,
        );
        let publisher = Publisher::new(Snapshot::project(&stage), tx);
        tracing::debug!(algorithm = %stage.algorithm, speed = stage.speed.get(), "Engine ready");

        Self {
            stage: Arc::new(Mutex::new(stage)),
            publisher,
            rng,
            run: None,
        }
    }

    // ============================================
    // Observation
    // ============================================

    /// Receiver that always holds the latest snapshot
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    /// Receiver of every snapshot published from now on, in order
    ///
    /// Unlike [`Engine::subscribe`] nothing is coalesced; at most
    /// `capacity` snapshots wait unread before newer ones are dropped.
    #[must_use]
    pub fn tap_snapshots(&self, capacity: usize) -> mpsc::Receiver<Snapshot> {
        self.publisher.tap(capacity)
    }

    /// Latest published snapshot
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.publisher.latest()
    }

    /// Current scheduler state
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.stage.lock().phase
    }

    /// Selected algorithm
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.stage.lock().algorithm
    }

    /// Current speed
    #[must_use]
    pub fn speed(&self) -> Speed {
        self.stage.lock().speed
    }

    /// Wait until the most recent run has ended
    pub async fn wait_idle(&mut self) {
        if let Some(run) = self.run.as_mut() {
            if let Err(e) = run.await {
                if !e.is_cancelled() {
                    tracing::error!(error = %e, "Run task failed");
                }
            }
            self.run = None;
        }
    }

    // ============================================
    // Intents
    // ============================================

    /// Dispatch a renderer intent
    ///
    /// # Errors
    ///
    /// Returns the configuration error of the intent, if any. The engine
    /// stays in its current phase.
    pub fn handle_intent(&mut self, intent: Intent) -> Result<Outcome, EngineError> {
        tracing::debug!(intent = intent.name(), "Handling intent");
        match intent {
            Intent::Play => self.play(),
            Intent::Pause => Ok(self.pause()),
            Intent::Reset => Ok(self.reset()),
            Intent::StepForward => self.step_forward(),
            Intent::StepBack => Ok(self.step_back()),
            Intent::SetSpeed { speed } => Ok(self.set_speed(speed)),
            Intent::SetAlgorithm { id } => self.set_algorithm(&id),
            Intent::SetInput { value } => self.set_input(value),
            Intent::SetEndpoints { start, end } => self.set_endpoints(&start, &end),
            Intent::Shuffle => Ok(self.shuffle()),
            Intent::Regenerate => Ok(self.regenerate()),
        }
    }

    /// Start a run of the selected algorithm
    ///
    /// Ignored while a run is in progress. Must be called within a tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GeneratorUnavailable`] for a reserved sort.
    pub fn play(&mut self) -> Result<Outcome, EngineError> {
        let (ctx, algorithm, inputs) = {
            let mut stage = self.stage.lock();
            if stage.phase == Phase::Running {
                tracing::trace!("Play while running");
                return Ok(Outcome::Ignored(IgnoreReason::AlreadyRunning));
            }

            let algorithm = stage.algorithm;
            let events = match algorithm {
                Algorithm::Sort(sort) => match sort.generator() {
                    Some(generate) => Some(generate(&stage.model.bars.values())),
                    None => {
                        drop(stage);
                        return Err(self.reject("play", EngineError::GeneratorUnavailable(sort)));
                    }
                },
                _ => None,
            };

            let token = stage.begin_run();
            if let Some(events) = events {
                stage.cursor = Some(EventCursor::new(events));
            }
            self.publisher.publish(&stage);
            tracing::info!(%algorithm, epoch = token.epoch(), "Run started");
            self.publisher.notify(EngineMessage::RunStarted {
                algorithm,
                epoch: token.epoch(),
            });
            let ctx = StepContext::new(Arc::clone(&self.stage), token, self.publisher.clone());
            (ctx, algorithm, stage.inputs)
        };

        if let Some(previous) = self.run.take() {
            previous.abort();
        }
        self.run = Some(tokio::spawn(drive(ctx, algorithm, inputs)));
        Ok(Outcome::Applied)
    }

    /// Stop the run; runs cannot be resumed, so this is [`Engine::reset`]
    pub fn pause(&mut self) -> Outcome {
        self.reset()
    }

    /// Invalidate any run and restore resting visual state
    pub fn reset(&mut self) -> Outcome {
        {
            let mut stage = self.stage.lock();
            stage.reset();
            self.publisher.publish(&stage);
            tracing::info!(epoch = stage.epoch(), "Reset");
        }
        if let Some(run) = self.run.take() {
            run.abort();
        }
        Outcome::Applied
    }

    /// Apply the next precomputed event by hand
    ///
    /// The first step of a fresh sequence generates it from the current
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GeneratorUnavailable`] for a reserved sort.
    pub fn step_forward(&mut self) -> Result<Outcome, EngineError> {
        let mut stage = self.stage.lock();
        if let Some(reason) = step_blocker(&stage) {
            drop(stage);
            return Ok(self.ignored("step_forward", reason));
        }

        if stage.cursor.is_none() {
            let Algorithm::Sort(sort) = stage.algorithm else {
                drop(stage);
                return Ok(self.ignored("step_forward", IgnoreReason::NotSteppable));
            };
            let Some(generate) = sort.generator() else {
                drop(stage);
                return Err(self.reject(
                    "step_forward",
                    EngineError::GeneratorUnavailable(sort),
                ));
            };
            let events = generate(&stage.model.bars.values());
            stage.reset();
            stage.cursor = Some(EventCursor::new(events));
        }

        if stage.advance_cursor().is_none() {
            drop(stage);
            return Ok(self.ignored("step_forward", IgnoreReason::CursorAtEnd));
        }
        let finished = stage.cursor.as_ref().is_some_and(EventCursor::is_finished);
        stage.phase = if finished { Phase::Idle } else { Phase::Stepping };
        self.publisher.publish(&stage);
        Ok(Outcome::Applied)
    }

    /// Move the cursor back one event
    ///
    /// Only the cursor moves; the visual effect of the event stays applied.
    pub fn step_back(&mut self) -> Outcome {
        let mut stage = self.stage.lock();
        if let Some(reason) = step_blocker(&stage) {
            drop(stage);
            return self.ignored("step_back", reason);
        }

        let moved = stage.cursor.as_mut().is_some_and(EventCursor::retreat);
        if !moved {
            drop(stage);
            return self.ignored("step_back", IgnoreReason::CursorAtStart);
        }
        stage.phase = Phase::Stepping;
        self.publisher.publish(&stage);
        Outcome::Applied
    }

    /// Change playback speed, clamped to 1..=100
    pub fn set_speed(&mut self, speed: i64) -> Outcome {
        let mut stage = self.stage.lock();
        if stage.phase == Phase::Running {
            drop(stage);
            return self.ignored("set_speed", IgnoreReason::Busy);
        }
        stage.speed = Speed::clamped(speed);
        self.publisher.publish(&stage);
        Outcome::Applied
    }

    /// Select an algorithm by identifier
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownAlgorithm`] for an unknown identifier.
    pub fn set_algorithm(&mut self, id: &str) -> Result<Outcome, EngineError> {
        let algorithm: Algorithm = match id.parse() {
            Ok(algorithm) => algorithm,
            Err(e) => return Err(self.reject("set_algorithm", e)),
        };

        let mut stage = self.stage.lock();
        if stage.phase == Phase::Running {
            drop(stage);
            return Ok(self.ignored("set_algorithm", IgnoreReason::Busy));
        }
        stage.reset();
        stage.algorithm = algorithm;
        self.publisher.publish(&stage);
        tracing::info!(%algorithm, "Algorithm selected");
        Ok(Outcome::Applied)
    }

    /// Set the numeric input of the selected algorithm's mode
    ///
    /// Sorting takes the array size and regenerates the array, tree takes
    /// the search key, recursion takes the root argument.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InputOutOfRange`] or
    /// [`EngineError::InputNotApplicable`].
    pub fn set_input(&mut self, value: i64) -> Result<Outcome, EngineError> {
        let mut stage = self.stage.lock();
        if stage.phase == Phase::Running {
            drop(stage);
            return Ok(self.ignored("set_input", IgnoreReason::Busy));
        }

        let mode = stage.algorithm.mode();
        let out_of_range = |min: i64, max: i64| EngineError::InputOutOfRange {
            mode,
            value,
            min,
            max,
        };
        let checked = match stage.algorithm {
            Algorithm::Sort(_) => {
                let (min, max) = (ArraySpec::MIN_SIZE, ArraySpec::MAX_SIZE);
                match usize::try_from(value) {
                    Ok(size) if (min..=max).contains(&size) => {
                        stage.array.size = size;
                        stage.model.bars = Bars::random(&mut self.rng, &stage.array);
                        Ok(())
                    }
                    _ => Err(out_of_range(
                        i64::try_from(min).unwrap_or(i64::MAX),
                        i64::try_from(max).unwrap_or(i64::MAX),
                    )),
                }
            }
            Algorithm::Tree(_) => {
                let (min, max) = (ModeInputs::SEARCH_KEY_MIN, ModeInputs::SEARCH_KEY_MAX);
                if (min..=max).contains(&value) {
                    stage.inputs.search_key = value;
                    Ok(())
                } else {
                    Err(out_of_range(min, max))
                }
            }
            Algorithm::Recursion(recursion) => {
                let (min, max) = (RecursionAlgorithm::MIN_INPUT, recursion.max_input());
                match u32::try_from(value) {
                    Ok(n) if (min..=max).contains(&n) => {
                        stage.inputs.recursion = n;
                        Ok(())
                    }
                    _ => Err(out_of_range(i64::from(min), i64::from(max))),
                }
            }
            Algorithm::Graph(_) => Err(EngineError::InputNotApplicable(Mode::Graph)),
        };

        if let Err(e) = checked {
            drop(stage);
            return Err(self.reject("set_input", e));
        }
        stage.reset();
        self.publisher.publish(&stage);
        tracing::info!(%mode, value, "Input set");
        Ok(Outcome::Applied)
    }

    /// Move the graph search endpoints
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownNode`] if either id is not a node.
    pub fn set_endpoints(&mut self, start: &str, end: &str) -> Result<Outcome, EngineError> {
        let mut stage = self.stage.lock();
        if stage.phase == Phase::Running {
            drop(stage);
            return Ok(self.ignored("set_endpoints", IgnoreReason::Busy));
        }
        if let Err(e) = stage.model.graph.set_endpoints(start, end) {
            drop(stage);
            return Err(self.reject("set_endpoints", e));
        }
        stage.reset();
        self.publisher.publish(&stage);
        tracing::info!(start, end, "Graph endpoints moved");
        Ok(Outcome::Applied)
    }

    /// Draw a fresh array, or rebuild the active mode's demo entities
    pub fn shuffle(&mut self) -> Outcome {
        self.rebuild("shuffle")
    }

    /// Same as [`Engine::shuffle`]
    pub fn regenerate(&mut self) -> Outcome {
        self.rebuild("regenerate")
    }

    fn rebuild(&mut self, intent: &'static str) -> Outcome {
        let mut stage = self.stage.lock();
        if stage.phase == Phase::Running {
            drop(stage);
            return self.ignored(intent, IgnoreReason::Busy);
        }

        let mode = stage.algorithm.mode();
        match mode {
            Mode::Sorting => stage.model.bars = Bars::random(&mut self.rng, &stage.array),
            Mode::Graph => {
                let mut graph = Graph::demo();
                let (start, end) = (stage.model.graph.start(), stage.model.graph.end());
                if let Err(e) = graph.set_endpoints(start, end) {
                    tracing::warn!(error = %e, "Rebuilt graph uses default endpoints");
                }
                stage.model.graph = graph;
            }
            Mode::Tree => stage.model.tree = SearchTree::demo(),
            // Call nodes are discarded by the reset below
            Mode::Recursion => {}
        }
        stage.reset();
        self.publisher.publish(&stage);
        tracing::info!(%mode, "Entities rebuilt");
        Outcome::Applied
    }

    // ============================================
    // Reporting
    // ============================================

    fn ignored(&self, intent: &'static str, reason: IgnoreReason) -> Outcome {
        tracing::debug!(intent, reason = reason.description(), "Intent ignored");
        self.publisher.notify(EngineMessage::IntentIgnored {
            intent: intent.to_string(),
            reason,
        });
        Outcome::Ignored(reason)
    }

    fn reject(&self, intent: &'static str, error: EngineError) -> EngineError {
        tracing::warn!(intent, error = %error, "Rejected configuration");
        self.publisher.notify(EngineMessage::ConfigurationRejected {
            intent: intent.to_string(),
            reason: error.to_string(),
        });
        error
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stage.lock().reset();
        if let Some(run) = self.run.take() {
            run.abort();
        }
    }
}

/// Why stepping is not possible right now, if it isn't
fn step_blocker(stage: &Stage) -> Option<IgnoreReason> {
    if stage.phase == Phase::Running {
        Some(IgnoreReason::Busy)
    } else if stage.algorithm.family() != Family::Precomputed {
        Some(IgnoreReason::NotSteppable)
    } else {
        None
    }
}

/// Body of a run task
async fn drive(ctx: StepContext, algorithm: Algorithm, inputs: ModeInputs) {
    let epoch = ctx.token().epoch();
    match run(&ctx, algorithm, inputs).await {
        Ok(()) => {
            ctx.finish();
        }
        Err(Cancelled) => tracing::debug!(epoch, "Run cancelled"),
    }
}

async fn run(ctx: &StepContext, algorithm: Algorithm, inputs: ModeInputs) -> Result<(), Cancelled> {
    match algorithm {
        Algorithm::Sort(_) => {
            while ctx.has_pending_events()? {
                ctx.pause(Beat::Full).await?;
                ctx.advance_cursor()?;
            }
            Ok(())
        }
        Algorithm::Graph(graph) => {
            ctx.lead_in().await?;
            generators::graph::run(ctx, graph).await
        }
        Algorithm::Tree(tree) => {
            ctx.lead_in().await?;
            generators::tree::run(ctx, tree, inputs.search_key).await
        }
        Algorithm::Recursion(recursion) => {
            ctx.lead_in().await?;
            generators::recursion::run(ctx, recursion, inputs.recursion).await
        }
    }
}
