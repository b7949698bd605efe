//! Simulation events and the observer the engine reports them to.

use crate::entities::SimulationState;

/// Something worth telling the embedding context about, produced by a tick.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// A hazard was shot down or a benefit was caught.
    ChallengeCompleted { label: String, points: u32 },
    /// A benefit was caught; `name` is its catalog name.
    ToolCollected { name: String },
    /// The clock ran out. Emitted exactly once per session.
    SessionCompleted {
        label: String,
        bonus: u32,
        difficulty_level: u32,
    },
}

impl GameEvent {
    /// Points this event is worth to a progression tracker.
    pub fn points(&self) -> u32 {
        match self {
            GameEvent::ChallengeCompleted { points, .. } => *points,
            GameEvent::SessionCompleted { bonus, .. } => *bonus,
            GameEvent::ToolCollected { .. } => 0,
        }
    }

    /// Forward this event to the matching observer callback.
    ///
    /// Session completion is reported through `on_challenge_complete` with
    /// the closing bonus, followed by `on_session_complete`.
    pub fn dispatch<O: EngineObserver + ?Sized>(&self, observer: &mut O) {
        match self {
            GameEvent::ChallengeCompleted { label, points } => {
                observer.on_challenge_complete(label, *points);
            }
            GameEvent::ToolCollected { name } => observer.on_tool_collect(name),
            GameEvent::SessionCompleted {
                label,
                bonus,
                difficulty_level,
            } => {
                observer.on_challenge_complete(label, *bonus);
                observer.on_session_complete(label, *bonus, *difficulty_level);
            }
        }
    }
}

/// Callbacks invoked by [`crate::engine::Engine`] while frames are serviced.
///
/// All methods default to no-ops so observers implement only what they use.
pub trait EngineObserver {
    /// Every scoring event, including the closing session bonus.
    fn on_challenge_complete(&mut self, _label: &str, _points: u32) {}

    /// Once per benefit caught. Deduplication is the observer's business.
    fn on_tool_collect(&mut self, _name: &str) {}

    /// Once, after the closing bonus has been reported.
    fn on_session_complete(&mut self, _label: &str, _bonus: u32, _difficulty_level: u32) {}

    /// Read-only view of the simulation after each ticked frame.
    fn on_frame(&mut self, _state: &SimulationState) {}
}

/// Observer that ignores everything.
impl EngineObserver for () {}

/// Records every callback in order; handy for hosts that batch and for tests.
///
/// A finished session shows up twice: once as the `ChallengeCompleted`
/// carrying the closing bonus, then as the matching `SessionCompleted`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
    pub frames: u64,
}

impl EngineObserver for EventLog {
    fn on_challenge_complete(&mut self, label: &str, points: u32) {
        self.events.push(GameEvent::ChallengeCompleted {
            label: label.to_string(),
            points,
        });
    }

    fn on_tool_collect(&mut self, name: &str) {
        self.events.push(GameEvent::ToolCollected {
            name: name.to_string(),
        });
    }

    fn on_session_complete(&mut self, label: &str, bonus: u32, difficulty_level: u32) {
        self.events.push(GameEvent::SessionCompleted {
            label: label.to_string(),
            bonus,
            difficulty_level,
        });
    }

    fn on_frame(&mut self, _state: &SimulationState) {
        self.frames += 1;
    }
}
