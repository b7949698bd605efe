//! The simulation loop engine.
//!
//! [`Engine`] owns one [`SimulationState`] and drives it through the session
//! state machine:
//!
//! ```text
//! Idle ──start──▶ Running ──pause──▶ Paused
//!                  ▲   │  ◀──resume──┘
//!                  │   └──clock hits zero──▶ Completed ──reset──▶ Idle
//!                  └──────────── start (from any state) ──────────┘
//! ```
//!
//! The engine does not own time.  The host hands out [`FrameRequest`] tokens
//! through a [`FrameScheduler`] and calls [`Engine::on_frame`] when one is
//! due.  At most one request is outstanding at any moment, so calling
//! `start` or `resume` repeatedly never produces two tick streams.

use rand::Rng;
use tracing::{debug, trace};

use crate::compute;
use crate::config::{ConfigError, GameConfig};
use crate::entities::{Direction, SessionStatus, SimulationState};
use crate::events::{EngineObserver, GameEvent};

// ── Frame scheduling ─────────────────────────────────────────────────────────

/// Token identifying one requested frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequest(pub u64);

/// Host-side source of frame callbacks (an animation-frame queue, a timer,
/// or a test harness stepping by hand).
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Scheduler that simply queues requests until the host drains them.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    outstanding: Vec<FrameRequest>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet drained or cancelled.
    pub fn outstanding(&self) -> &[FrameRequest] {
        &self.outstanding
    }

    /// Hand every outstanding request to the caller.
    pub fn take_due(&mut self) -> Vec<FrameRequest> {
        std::mem::take(&mut self.outstanding)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next += 1;
        let request = FrameRequest(self.next);
        self.outstanding.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.outstanding.retain(|r| *r != request);
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

pub struct Engine<R: Rng, S: FrameScheduler = ManualScheduler> {
    config: GameConfig,
    state: SimulationState,
    rng: R,
    scheduler: S,
    pending_frame: Option<FrameRequest>,
}

impl<R: Rng, S: FrameScheduler> Engine<R, S> {
    /// Create an idle engine for a `width` × `height` play area.
    pub fn new(
        config: GameConfig,
        width: f32,
        height: f32,
        rng: R,
        scheduler: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut state = compute::init_state(&config, width, height);
        state.status = SessionStatus::Idle;
        Ok(Self {
            config,
            state,
            rng,
            scheduler,
            pending_frame: None,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read-only view for renderers.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending_frame
    }

    // ── Controls ─────────────────────────────────────────────────────────────

    /// Begin a fresh session, discarding whatever the previous one left.
    pub fn start(&mut self) {
        let (width, height) = (self.state.width, self.state.height);
        self.state = compute::init_state(&self.config, width, height);
        debug!(width, height, "session started");
        self.ensure_frame_requested();
    }

    pub fn pause(&mut self) {
        if self.state.status != SessionStatus::Running {
            return;
        }
        self.state.status = SessionStatus::Paused;
        self.state.held = Default::default();
        self.cancel_pending_frame();
        debug!(time_remaining = self.state.time_remaining, "session paused");
    }

    pub fn resume(&mut self) {
        if self.state.status != SessionStatus::Paused {
            return;
        }
        self.state.status = SessionStatus::Running;
        self.ensure_frame_requested();
        debug!(time_remaining = self.state.time_remaining, "session resumed");
    }

    /// Go back to `Idle`, dropping the current session.
    pub fn reset(&mut self) {
        self.cancel_pending_frame();
        let (width, height) = (self.state.width, self.state.height);
        self.state = compute::init_state(&self.config, width, height);
        self.state.status = SessionStatus::Idle;
    }

    /// Stop requesting frames for good (the host is tearing down).  The last
    /// state stays readable.
    pub fn shutdown(&mut self) {
        self.cancel_pending_frame();
        self.state.held = Default::default();
        if matches!(
            self.state.status,
            SessionStatus::Running | SessionStatus::Paused
        ) {
            self.state.status = SessionStatus::Idle;
        }
        debug!("engine shut down");
    }

    pub fn fire(&mut self) {
        compute::fire(&mut self.state, &self.config);
    }

    pub fn move_player(&mut self, direction: Direction) {
        compute::nudge_player(&mut self.state, &self.config, direction);
    }

    /// Record a held or released direction, integrated on every tick.
    pub fn set_held(&mut self, direction: Direction, held: bool) {
        if self.state.status != SessionStatus::Running {
            return;
        }
        self.state.held.set(direction, held);
    }

    /// Adopt a new play-area size.  The session carries on; only the player
    /// is pulled back inside the new bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.width = width;
        self.state.height = height;
        compute::clamp_player(&mut self.state);
        debug!(width, height, "play area resized");
    }

    // ── Ticking ──────────────────────────────────────────────────────────────

    /// Advance one frame by `delta_seconds`, outside of the frame-request
    /// cycle.  Returns the events the frame produced.
    pub fn tick(&mut self, delta_seconds: f64) -> Vec<GameEvent> {
        let events = compute::tick(&mut self.state, &self.config, delta_seconds, &mut self.rng);
        if self.state.status != SessionStatus::Running {
            self.cancel_pending_frame();
        }
        events
    }

    /// Advance one fixed frame interval.
    pub fn step(&mut self) -> Vec<GameEvent> {
        self.tick(self.config.frame_interval)
    }

    /// Service a due frame: tick once, report events and the new snapshot to
    /// `observer`, then request the next frame if the session is still
    /// running.  Stale or cancelled requests are ignored.  Returns whether a
    /// tick happened.
    pub fn on_frame<O: EngineObserver + ?Sized>(
        &mut self,
        request: FrameRequest,
        delta_seconds: f64,
        observer: &mut O,
    ) -> bool {
        if self.pending_frame != Some(request) {
            trace!(?request, "ignoring stale frame");
            return false;
        }
        self.pending_frame = None;
        if self.state.status != SessionStatus::Running {
            return false;
        }

        let events = compute::tick(&mut self.state, &self.config, delta_seconds, &mut self.rng);
        for event in &events {
            event.dispatch(observer);
        }
        observer.on_frame(&self.state);

        if self.state.status == SessionStatus::Running {
            self.ensure_frame_requested();
        }
        true
    }

    fn ensure_frame_requested(&mut self) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.scheduler.request_frame());
        }
    }

    fn cancel_pending_frame(&mut self) {
        if let Some(request) = self.pending_frame.take() {
            self.scheduler.cancel_frame(request);
        }
    }
}

impl<R: Rng, S: FrameScheduler> Drop for Engine<R, S> {
    fn drop(&mut self) {
        self.cancel_pending_frame();
    }
}
