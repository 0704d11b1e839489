//! Visualizer Core - Headless Algorithm-to-Animation Engine
//!
//! This crate turns the execution of sorting, graph-search, tree-traversal
//! and recursion algorithms into a timeline of visual-state transitions,
//! completely independent of any rendering technology. A renderer (web
//! canvas, SVG, terminal, or nothing at all for tests) subscribes to
//! snapshots and sends intents back.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Renderers                              │
//! │   ┌──────────┐   ┌──────────┐   ┌──────────────────────────┐    │
//! │   │   SVG    │   │ Terminal │   │  Headless (JSON lines)   │    │
//! │   └────┬─────┘   └────┬─────┘   └────────────┬─────────────┘    │
//! │        └──────────────┴──────────────────────┘                  │
//! │                           │                                     │
//! │               Intent (up)   Snapshot / EngineMessage (down)     │
//! └───────────────────────────┼─────────────────────────────────────┘
//!                             │
//! ┌───────────────────────────┼─────────────────────────────────────┐
//! │                    VISUALIZER CORE                              │
//! │  ┌────────────────────────┴──────────────────────────────────┐  │
//! │  │                        Engine                             │  │
//! │  │  ┌───────────┐  ┌────────────┐  ┌──────────┐  ┌─────────┐ │  │
//! │  │  │ Playback  │  │ Generators │  │ Entities │  │Projector│ │  │
//! │  │  │ (epochs)  │  │            │  │          │  │         │ │  │
//! │  │  └───────────┘  └────────────┘  └──────────┘  └─────────┘ │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Engine`]: owns the stage and turns intents into runs
//! - [`Intent`]: what a renderer may ask for
//! - [`Snapshot`]: render-ready copy of the engine state
//! - [`EngineMessage`]: run lifecycle notifications
//! - [`Algorithm`]: every selectable algorithm, by family
//!
//! # Quick Start
//!
//! ```ignore
//! use visualizer_core::{load_config, Engine, Intent};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = load_config().unwrap();
//!     let (tx, mut rx) = mpsc::channel(64);
//!     let mut engine = Engine::new(&config, tx);
//!     let mut snapshots = engine.subscribe();
//!
//!     engine.handle_intent(Intent::SetAlgorithm { id: "dijkstra".into() }).unwrap();
//!     engine.handle_intent(Intent::Play).unwrap();
//!
//!     while snapshots.changed().await.is_ok() {
//!         let snapshot = snapshots.borrow_and_update().clone();
//!         // paint snapshot
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`entities`]: bars, graph, search tree and call tree, with visual state
//! - [`generators`]: algorithm identifiers, sort event generators and the
//!   cooperative traversals
//! - [`playback`]: run epochs, pacing, the event cursor and the shared stage
//! - [`engine`]: the play / reset / step state machine
//! - [`projector`]: snapshot projection and color keys
//! - [`intents`]: renderer intents and their outcomes
//! - [`messages`]: lifecycle messages to renderers
//! - [`config`]: TOML / environment configuration
//! - [`error`]: engine errors
//!
//! # No Renderer Dependencies
//!
//! Nothing here draws. Colors are semantic keys; mapping them to pixels is
//! the renderer's job.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod generators;
pub mod intents;
pub mod messages;
pub mod playback;
pub mod projector;

// Re-exports for convenience
pub use engine::Engine;
pub use entities::{ArraySpec, EntityModel, Point};
pub use error::EngineError;
pub use generators::{
    Algorithm, Family, GraphAlgorithm, Mode, RecursionAlgorithm, SortAlgorithm, SortEvent,
    TreeAlgorithm,
};
pub use intents::{IgnoreReason, Intent, Outcome};
pub use messages::EngineMessage;
pub use playback::{Phase, Speed};
pub use projector::{
    BarView, CallView, ColorKey, CursorView, GraphEdgeView, GraphNodeView, Scene, Snapshot,
    TreeNodeView,
};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_with_env,
    ConfigError, ConfigField, ConfigOverrides, ConfigSource, EngineConfig, EngineToml,
};
