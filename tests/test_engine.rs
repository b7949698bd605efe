use std::cell::RefCell;
use std::rc::Rc;

use recovery_arcade::config::{ConfigError, GameConfig};
use recovery_arcade::engine::{Engine, FrameRequest, FrameScheduler, ManualScheduler};
use recovery_arcade::entities::{Direction, SessionStatus};
use recovery_arcade::events::{EventLog, GameEvent};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn engine_with(config: GameConfig) -> Engine<StdRng> {
    Engine::new(
        config,
        800.0,
        600.0,
        StdRng::seed_from_u64(7),
        ManualScheduler::new(),
    )
    .expect("valid config")
}

fn engine() -> Engine<StdRng> {
    engine_with(GameConfig::default())
}

/// Service every due frame once.  Returns how many frames ticked.
fn pump(engine: &mut Engine<StdRng>, log: &mut EventLog) -> usize {
    let interval = engine.config().frame_interval;
    let due = engine.scheduler_mut().take_due();
    due.into_iter()
        .filter(|req| engine.on_frame(*req, interval, &mut *log))
        .count()
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn new_engine_is_idle() {
    let e = engine();
    assert_eq!(e.status(), SessionStatus::Idle);
    assert!(e.pending_frame().is_none());
    assert!(e.scheduler().outstanding().is_empty());
}

#[test]
fn new_engine_rejects_invalid_config() {
    let config = GameConfig {
        hazard_probability: 2.0,
        ..GameConfig::default()
    };
    let result = Engine::new(
        config,
        800.0,
        600.0,
        StdRng::seed_from_u64(7),
        ManualScheduler::new(),
    );
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            field: "hazard_probability",
            ..
        })
    ));
}

#[test]
fn idle_engine_ignores_input() {
    let mut e = engine();
    e.fire();
    e.move_player(Direction::Left);
    e.set_held(Direction::Right, true);
    assert!(e.state().projectiles.is_empty());
    assert_eq!(e.state().player.x, 400.0);
    assert!(!e.state().held.any());
}

// ── Frame requests ────────────────────────────────────────────────────────────

#[test]
fn start_requests_one_frame() {
    let mut e = engine();
    e.start();
    assert_eq!(e.status(), SessionStatus::Running);
    assert_eq!(e.scheduler().outstanding().len(), 1);
}

#[test]
fn repeated_start_keeps_single_tick_stream() {
    let mut e = engine();
    e.start();
    e.start();
    e.start();
    assert_eq!(e.scheduler().outstanding().len(), 1);

    let mut log = EventLog::default();
    assert_eq!(pump(&mut e, &mut log), 1);
    assert_eq!(e.scheduler().outstanding().len(), 1);
}

#[test]
fn resume_while_running_keeps_single_tick_stream() {
    let mut e = engine();
    e.start();
    e.resume();
    e.resume();
    assert_eq!(e.scheduler().outstanding().len(), 1);
}

#[test]
fn pause_cancels_and_resume_rerequests() {
    let mut e = engine();
    e.start();
    e.pause();
    assert_eq!(e.status(), SessionStatus::Paused);
    assert!(e.scheduler().outstanding().is_empty());

    e.resume();
    e.resume();
    assert_eq!(e.status(), SessionStatus::Running);
    assert_eq!(e.scheduler().outstanding().len(), 1);
}

#[test]
fn paused_engine_ignores_input_and_keeps_state() {
    let mut e = engine();
    e.start();
    e.step();
    let time = e.state().time_remaining;
    e.pause();
    e.fire();
    e.move_player(Direction::Left);
    assert!(e.state().projectiles.is_empty());
    assert_eq!(e.state().player.x, 400.0);

    e.resume();
    assert_eq!(e.state().time_remaining, time);
}

#[test]
fn stale_frame_is_ignored() {
    let mut e = engine();
    e.start();
    let first = e.pending_frame().expect("requested");
    e.pause();
    e.resume();
    let mut log = EventLog::default();
    assert!(!e.on_frame(first, 1.0 / 60.0, &mut log));
    assert!(!e.on_frame(FrameRequest(9999), 1.0 / 60.0, &mut log));
    assert_eq!(e.state().frame, 0);
    assert_eq!(log.frames, 0);
}

#[test]
fn on_frame_ticks_and_publishes_snapshot() {
    let mut e = engine();
    e.start();
    let mut log = EventLog::default();
    for _ in 0..5 {
        assert_eq!(pump(&mut e, &mut log), 1);
    }
    assert_eq!(e.state().frame, 5);
    assert_eq!(log.frames, 5);
}

#[test]
fn shutdown_releases_pending_frame() {
    let mut e = engine();
    e.start();
    e.shutdown();
    assert!(e.scheduler().outstanding().is_empty());
    assert!(e.pending_frame().is_none());
    assert_eq!(e.status(), SessionStatus::Idle);
}

#[test]
fn reset_returns_to_idle() {
    let mut e = engine();
    e.start();
    e.fire();
    e.reset();
    assert_eq!(e.status(), SessionStatus::Idle);
    assert!(e.state().projectiles.is_empty());
    assert!(e.scheduler().outstanding().is_empty());
}

#[derive(Clone, Default)]
struct SharedScheduler(Rc<RefCell<ManualScheduler>>);

impl FrameScheduler for SharedScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.0.borrow_mut().request_frame()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.0.borrow_mut().cancel_frame(request);
    }
}

#[test]
fn dropping_engine_cancels_pending_frame() {
    let scheduler = SharedScheduler::default();
    let mut e = Engine::new(
        GameConfig::default(),
        800.0,
        600.0,
        StdRng::seed_from_u64(7),
        scheduler.clone(),
    )
    .expect("valid config");
    e.start();
    assert_eq!(scheduler.0.borrow().outstanding().len(), 1);
    drop(e);
    assert!(scheduler.0.borrow().outstanding().is_empty());
}

// ── Sessions ──────────────────────────────────────────────────────────────────

#[test]
fn start_twice_clears_previous_session() {
    let mut e = engine_with(GameConfig {
        base_spawn_rate: 1.0,
        spawn_rate_cap: 1.0,
        ..GameConfig::default()
    });
    e.start();
    for _ in 0..30 {
        e.fire();
        e.step();
    }
    assert!(!e.state().entities.is_empty());
    assert!(!e.state().projectiles.is_empty());

    e.start();
    let s = e.state();
    assert!(s.entities.is_empty());
    assert!(s.projectiles.is_empty());
    assert_eq!(s.score, 0);
    assert_eq!(s.time_remaining, 60.0);
    assert_eq!(s.difficulty_level, 1);
    assert_eq!(s.frame, 0);
}

#[test]
fn full_session_through_scheduler() {
    let mut e = engine();
    e.start();
    let mut log = EventLog::default();
    let mut frames = 0;
    while !e.scheduler().outstanding().is_empty() && frames < 10_000 {
        frames += pump(&mut e, &mut log);
    }

    assert!((3599..=3601).contains(&frames), "frames = {frames}");
    assert_eq!(e.status(), SessionStatus::Completed);
    assert!(e.pending_frame().is_none());

    let completions: Vec<_> = log
        .events
        .iter()
        .filter(|ev| matches!(ev, GameEvent::ChallengeCompleted { label, .. } if label.starts_with("Recovery session complete")))
        .collect();
    assert_eq!(completions.len(), 1);

    let sessions: Vec<_> = log
        .events
        .iter()
        .filter(|ev| matches!(ev, GameEvent::SessionCompleted { .. }))
        .collect();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].points(), completions[0].points());
    assert!(matches!(
        log.events.last(),
        Some(GameEvent::SessionCompleted { difficulty_level: 6, .. })
    ));

    // Nothing left to tick.
    assert_eq!(pump(&mut e, &mut log), 0);
}

#[test]
fn completed_session_restarts_with_start() {
    let mut e = engine_with(GameConfig {
        total_duration: 1.0,
        ..GameConfig::default()
    });
    e.start();
    while e.status() == SessionStatus::Running {
        e.step();
    }
    assert_eq!(e.status(), SessionStatus::Completed);
    assert!(e.scheduler().outstanding().is_empty());

    e.start();
    assert_eq!(e.status(), SessionStatus::Running);
    assert_eq!(e.scheduler().outstanding().len(), 1);
}

// ── Input & resize ────────────────────────────────────────────────────────────

#[test]
fn move_and_fire_while_running() {
    let mut e = engine();
    e.start();
    e.move_player(Direction::Left);
    assert_eq!(e.state().player.x, 380.0);
    e.fire();
    assert_eq!(e.state().projectiles.len(), 1);
    assert_eq!(e.state().projectiles[0].x, 380.0);
}

#[test]
fn held_direction_moves_every_tick() {
    let mut e = engine();
    e.start();
    e.set_held(Direction::Left, true);
    e.step();
    e.step();
    assert_eq!(e.state().player.x, 390.0);
    e.set_held(Direction::Left, false);
    e.step();
    assert_eq!(e.state().player.x, 390.0);
}

#[test]
fn pause_releases_held_directions() {
    let mut e = engine();
    e.start();
    e.set_held(Direction::Right, true);
    e.pause();
    e.resume();
    e.step();
    assert_eq!(e.state().player.x, 400.0);
}

#[test]
fn resize_reclamps_without_resetting() {
    let mut e = engine();
    e.start();
    for _ in 0..10 {
        e.move_player(Direction::Right);
    }
    assert_eq!(e.state().player.x, 600.0);
    e.step();
    let time = e.state().time_remaining;
    let frame = e.state().frame;

    e.resize(400.0, 300.0);

    let s = e.state();
    assert_eq!(s.player.x, 380.0);
    assert_eq!(s.player.y, 280.0);
    assert_eq!(s.time_remaining, time);
    assert_eq!(s.frame, frame);
    assert_eq!(s.status, SessionStatus::Running);
    assert_eq!(e.scheduler().outstanding().len(), 1);
}
