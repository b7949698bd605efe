//! Recovery Arcade: a falling-item shooter where temptations are shot down
//! and recovery tools are caught before a one-minute clock runs out.
//!
//! The library is headless.  [`engine::Engine`] runs the simulation and
//! reports scoring events to an [`events::EngineObserver`], such as the
//! persistent [`progress::Progression`] tracker.  The terminal front end in
//! `main.rs` is one possible host.

pub mod catalog;
pub mod compute;
pub mod config;
pub mod engine;
pub mod entities;
pub mod events;
pub mod progress;

pub use config::GameConfig;
pub use engine::{Engine, FrameRequest, FrameScheduler, ManualScheduler};
pub use events::{EngineObserver, GameEvent};
