mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, stdout, BufWriter, Write};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::ThreadRng;
use rand::thread_rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use recovery_arcade::entities::{Direction, SessionStatus, SimulationState};
use recovery_arcade::progress::Progression;
use recovery_arcade::{Engine, EngineObserver, GameConfig, ManualScheduler};

use display::Screen;

type GameEngine = Engine<ThreadRng, ManualScheduler>;

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// Min frames between shots while Space is held.
/// 12 frames @ 60 FPS = 5 shots/sec.
const SHOOT_COOLDOWN: u32 = 12;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Frames a scoring message stays on screen.
const MESSAGE_FRAMES: u64 = 90;

const LOG_FILE: &str = "recovery_arcade.log";

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

fn direction_keys(direction: Direction) -> [KeyCode; 3] {
    match direction {
        Direction::Left => [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')],
        Direction::Right => [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')],
        Direction::Up => [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')],
        Direction::Down => [KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')],
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// Log to a file in the temp directory; stdout belongs to the game screen.
fn init_logging() {
    let path = std::env::temp_dir().join(LOG_FILE);
    let Ok(file) = File::create(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Feeds engine callbacks into the progression tracker and keeps the latest
/// label around for the HUD.
struct HostObserver<'a> {
    progress: &'a mut Progression,
    message: &'a mut Option<(String, u64)>,
    frame: u64,
    session_finished: bool,
}

impl EngineObserver for HostObserver<'_> {
    fn on_challenge_complete(&mut self, label: &str, points: u32) {
        self.progress.on_challenge_complete(label, points);
        *self.message = Some((format!("{label}  +{points}"), self.frame + MESSAGE_FRAMES));
    }

    fn on_tool_collect(&mut self, name: &str) {
        self.progress.on_tool_collect(name);
    }

    fn on_session_complete(&mut self, label: &str, bonus: u32, difficulty_level: u32) {
        self.progress
            .on_session_complete(label, bonus, difficulty_level);
        self.session_finished = true;
    }
}

fn save_progress(progress: &Progression) {
    let path = Progression::default_path();
    if let Err(e) = progress.save(&path) {
        warn!("Failed to save progression to {:?}: {}", path, e);
    }
}

fn in_session(state: &SimulationState) -> bool {
    matches!(state.status, SessionStatus::Running | SessionStatus::Paused)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which keys are still "fresh"
/// (within `HOLD_WINDOW` frames) and forward them to the engine as held
/// directions, so Space + a direction can be held at the same time.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events → keys are removed on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire naturally after `HOLD_WINDOW` frames of
///   silence.
fn game_loop<W: Write>(
    out: &mut W,
    engine: &mut GameEngine,
    progress: &mut Progression,
    rx: &mpsc::Receiver<Event>,
    mut screen: Screen,
) -> io::Result<()> {
    let frame_time = Duration::from_secs_f64(engine.config().frame_interval);
    let frame_interval = engine.config().frame_interval;

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut shoot_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let mut message: Option<(String, u64)> = None;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Resize(cols, rows) => {
                    screen = Screen { cols, rows };
                    let (w, h) = screen.play_area();
                    engine.resize(w, h);
                }
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(());
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(());
                            }
                            KeyCode::Char('p') | KeyCode::Char('P') => match engine.status() {
                                SessionStatus::Running => engine.pause(),
                                SessionStatus::Paused => engine.resume(),
                                _ => {}
                            },
                            KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter => {
                                if in_session(engine.state()) {
                                    progress.record_abandoned();
                                }
                                message = None;
                                engine.start();
                            }
                            _ => {}
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                _ => {}
            }
        }

        // ── Apply held-key actions every frame ────────────────────────────────
        if engine.status() == SessionStatus::Running {
            for direction in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
                let held = any_held(&key_frame, &direction_keys(direction), frame);
                engine.set_held(direction, held);
            }
            if shoot_cooldown == 0 && is_held(&key_frame, &KeyCode::Char(' '), frame) {
                engine.fire();
                shoot_cooldown = SHOOT_COOLDOWN;
            }
        }
        shoot_cooldown = shoot_cooldown.saturating_sub(1);

        // ── Service due frames ────────────────────────────────────────────────
        let due = engine.scheduler_mut().take_due();
        let mut observer = HostObserver {
            progress: &mut *progress,
            message: &mut message,
            frame,
            session_finished: false,
        };
        for request in due {
            engine.on_frame(request, frame_interval, &mut observer);
        }
        let session_finished = observer.session_finished;
        if session_finished {
            save_progress(progress);
        }

        if matches!(&message, Some((_, expires)) if *expires <= frame) {
            message = None;
        }

        display::render(
            out,
            screen,
            engine.state(),
            progress,
            message.as_ref().map(|(m, _)| m.as_str()),
        )?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    init_logging();

    let config = GameConfig::load().unwrap_or_else(|e| {
        warn!("Invalid game config, using defaults: {}", e);
        GameConfig::default()
    });
    let mut progress = Progression::load(Progression::default_path()).unwrap_or_else(|e| {
        warn!("Could not read progression, starting fresh: {}", e);
        Progression::default()
    });

    let (cols, rows) = terminal::size()?;
    let screen = Screen { cols, rows };
    let (width, height) = screen.play_area();
    let mut engine = Engine::new(config, width, height, thread_rng(), ManualScheduler::new())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    info!(width, height, "Recovery Arcade starting");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = game_loop(&mut out, &mut engine, &mut progress, &rx, screen);

    if in_session(engine.state()) {
        progress.record_abandoned();
    }
    engine.shutdown();
    save_progress(&progress);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
