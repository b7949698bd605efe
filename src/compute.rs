/// Game-logic functions.
///
/// Every public function works on a `SimulationState` owned by the caller and
/// mutates it in place.  Side effects are limited to that state, the returned
/// events and the injected RNG, so a seeded RNG replays a session exactly.

use rand::Rng;
use tracing::{info, trace};

use crate::catalog;
use crate::config::GameConfig;
use crate::entities::{
    Direction, Entity, EntityCategory, HeldDirections, Player, Projectile, SessionStatus,
    SimulationState,
};
use crate::events::GameEvent;

/// Slack used when comparing accumulated clock values.
pub const TIME_EPSILON: f64 = 1e-6;

// ── Difficulty curve ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Difficulty {
    pub level: u32,
    pub spawn_probability: f64,
    pub fall_speed_multiplier: f32,
}

/// Difficulty after `elapsed` seconds of play: one level per
/// `level_duration` seconds, starting at 1.
pub fn difficulty_at(config: &GameConfig, elapsed: f64) -> Difficulty {
    let elapsed = elapsed.max(0.0);
    let steps = ((elapsed + TIME_EPSILON) / config.level_duration).floor() as u32;
    let level = steps.saturating_add(1);
    let spawn_probability = (config.base_spawn_rate + level as f64 * config.spawn_rate_step)
        .min(config.spawn_rate_cap);
    Difficulty {
        level,
        spawn_probability,
        fall_speed_multiplier: 1.0 + level as f32 * config.speed_step,
    }
}

pub fn current_difficulty(state: &SimulationState, config: &GameConfig) -> Difficulty {
    difficulty_at(config, config.total_duration - state.time_remaining)
}

/// Points for shooting down a hazard worth `base` at `level`.
pub fn hazard_award(config: &GameConfig, base: u32, level: u32) -> u32 {
    base.saturating_add(level.saturating_mul(config.hazard_bonus_per_level))
}

/// Points for catching a benefit worth `base` at `level`.
pub fn benefit_award(config: &GameConfig, base: u32, level: u32) -> u32 {
    base.saturating_add(level.saturating_mul(config.benefit_bonus_per_level))
}

/// Closing bonus reported when the clock runs out.
pub fn session_bonus(config: &GameConfig, score: u32, level: u32) -> u32 {
    score.saturating_add(level.saturating_mul(config.session_bonus_per_level))
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build a fresh, running session for a play area of `width` × `height`
/// pixels.  The player starts centred on the bottom edge.
pub fn init_state(config: &GameConfig, width: f32, height: f32) -> SimulationState {
    let mut state = SimulationState {
        player: Player {
            x: width / 2.0,
            y: height - config.player_height / 2.0,
            width: config.player_width,
            height: config.player_height,
        },
        entities: Vec::new(),
        projectiles: Vec::new(),
        held: HeldDirections::default(),
        score: 0,
        time_remaining: config.total_duration,
        difficulty_level: 1,
        status: SessionStatus::Running,
        frame: 0,
        next_id: 0,
        width,
        height,
    };
    clamp_player(&mut state);
    state
}

// ── Player ───────────────────────────────────────────────────────────────────

/// Keep the player's hit box inside the play area.  When the area is smaller
/// than the hit box the player is pinned to the half-extent.
pub fn clamp_player(state: &mut SimulationState) {
    let hw = state.player.width / 2.0;
    let hh = state.player.height / 2.0;
    let max_x = (state.width - hw).max(hw);
    let max_y = (state.height - hh).max(hh);
    state.player.x = state.player.x.clamp(hw, max_x);
    state.player.y = state.player.y.clamp(hh, max_y);
}

/// Nudge the player one `move_step` in `direction`.  No-op unless running.
pub fn nudge_player(state: &mut SimulationState, config: &GameConfig, direction: Direction) {
    if state.status != SessionStatus::Running {
        return;
    }
    let (dx, dy) = direction.delta();
    state.player.x += dx * config.move_step;
    state.player.y += dy * config.move_step;
    clamp_player(state);
}

/// Launch a projectile from the player's position.  No-op unless running.
pub fn fire(state: &mut SimulationState, config: &GameConfig) {
    if state.status != SessionStatus::Running {
        return;
    }
    let id = state.allocate_id();
    state.projectiles.push(Projectile {
        id,
        x: state.player.x,
        y: state.player.y,
        vy: -config.projectile_speed,
        active: true,
    });
}

fn advance_player(state: &mut SimulationState, config: &GameConfig) {
    if !state.held.any() {
        return;
    }
    let (mut dx, mut dy) = (0.0, 0.0);
    for direction in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
        if state.held.is_held(direction) {
            let (ux, uy) = direction.delta();
            dx += ux;
            dy += uy;
        }
    }
    state.player.x += dx * config.player_speed;
    state.player.y += dy * config.player_speed;
    clamp_player(state);
}

// ── Physics ──────────────────────────────────────────────────────────────────

fn advance_projectiles(state: &mut SimulationState) {
    state.projectiles.retain(|p| p.active);
    for p in &mut state.projectiles {
        p.y += p.vy;
        if p.y < 0.0 {
            p.active = false;
        }
    }
}

fn advance_entities(state: &mut SimulationState, fall_speed_multiplier: f32) {
    state.entities.retain(|e| !e.collected);
    for e in &mut state.entities {
        e.x += e.vx;
        e.y += e.vy * fall_speed_multiplier;
    }
    let bottom = state.height;
    state.entities.retain(|e| e.y - e.radius <= bottom);
}

fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (ax - bx).hypot(ay - by)
}

// ── Collisions ───────────────────────────────────────────────────────────────

/// Projectiles against hazards.  Each projectile resolves at most one hazard
/// and each hazard is resolved by the first projectile that reaches it.
fn resolve_projectile_hits(
    state: &mut SimulationState,
    config: &GameConfig,
    level: u32,
    events: &mut Vec<GameEvent>,
) {
    let mut gained: u32 = 0;

    for p in state.projectiles.iter_mut().filter(|p| p.active) {
        for e in state.entities.iter_mut() {
            if e.collected || e.category != EntityCategory::Hazard {
                continue;
            }
            if distance(p.x, p.y, e.x, e.y) <= e.radius + config.hit_margin {
                e.collected = true;
                p.active = false;
                let points = hazard_award(config, e.points, level);
                gained = gained.saturating_add(points);
                trace!(entity = e.id, projectile = p.id, points, "hazard shot down");
                events.push(GameEvent::ChallengeCompleted {
                    label: format!("Shot down {} (Level {})", e.name, level),
                    points,
                });
                break;
            }
        }
    }

    state.score = state.score.saturating_add(gained);
}

/// Player against benefits.
fn resolve_pickups(
    state: &mut SimulationState,
    config: &GameConfig,
    level: u32,
    events: &mut Vec<GameEvent>,
) {
    let (px, py) = (state.player.x, state.player.y);
    let reach = state.player.width / 2.0 + config.pickup_margin;
    let mut gained: u32 = 0;

    for e in state.entities.iter_mut() {
        if e.collected || e.category != EntityCategory::Benefit {
            continue;
        }
        if distance(px, py, e.x, e.y) <= e.radius + reach {
            e.collected = true;
            let points = benefit_award(config, e.points, level);
            gained = gained.saturating_add(points);
            trace!(entity = e.id, points, "tool collected");
            events.push(GameEvent::ToolCollected {
                name: e.name.to_string(),
            });
            events.push(GameEvent::ChallengeCompleted {
                label: format!("Collected {} (Level {})", e.name, level),
                points,
            });
        }
    }

    state.score = state.score.saturating_add(gained);
}

// ── Spawning ─────────────────────────────────────────────────────────────────

/// Create one entity just above the visible area.  Returns its id.
pub fn spawn_entity(state: &mut SimulationState, config: &GameConfig, rng: &mut impl Rng) -> u64 {
    let category = if rng.gen_bool(config.hazard_probability) {
        EntityCategory::Hazard
    } else {
        EntityCategory::Benefit
    };
    let entries = catalog::entries(category);
    let pick = entries[rng.gen_range(0..entries.len())];

    let r = config.entity_radius;
    let max_x = (state.width - r).max(r);
    let x = rng.gen_range(r..=max_x);
    let vx = rng.gen_range(-config.max_drift..=config.max_drift);
    let vy = rng.gen_range(config.min_fall_speed..=config.max_fall_speed);

    let id = state.allocate_id();
    trace!(id, name = pick.name, ?category, x, "spawned entity");
    state.entities.push(Entity {
        id,
        x,
        y: -r,
        vx,
        vy,
        category,
        name: pick.name,
        glyph: pick.glyph,
        points: pick.points,
        radius: r,
        collected: false,
    });
    id
}

// ── Clock ────────────────────────────────────────────────────────────────────

fn advance_timer(
    state: &mut SimulationState,
    config: &GameConfig,
    delta_seconds: f64,
    level: u32,
    events: &mut Vec<GameEvent>,
) {
    state.time_remaining -= delta_seconds;
    if state.time_remaining > TIME_EPSILON {
        return;
    }
    state.time_remaining = 0.0;
    state.status = SessionStatus::Completed;

    let bonus = session_bonus(config, state.score, level);
    info!(
        score = state.score,
        level,
        bonus,
        frames = state.frame,
        "session completed"
    );
    events.push(GameEvent::SessionCompleted {
        label: format!("Recovery session complete (Level {})", level),
        bonus,
        difficulty_level: level,
    });
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame, consuming `delta_seconds` of the
/// session clock.  Does nothing unless the session is running.
///
/// Movement is integrated before any collision test, so hits are always
/// judged on this frame's positions.  All randomness comes through `rng`.
pub fn tick(
    state: &mut SimulationState,
    config: &GameConfig,
    delta_seconds: f64,
    rng: &mut impl Rng,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.status != SessionStatus::Running {
        return events;
    }

    // ── 1. Difficulty ────────────────────────────────────────────────────────
    let difficulty = current_difficulty(state, config);
    state.difficulty_level = state.difficulty_level.max(difficulty.level);
    let level = state.difficulty_level;
    state.frame += 1;

    // ── 2-4. Integrate ───────────────────────────────────────────────────────
    advance_player(state, config);
    advance_projectiles(state);
    advance_entities(state, difficulty.fall_speed_multiplier);

    // ── 5-6. Collide ─────────────────────────────────────────────────────────
    resolve_projectile_hits(state, config, level, &mut events);
    resolve_pickups(state, config, level, &mut events);

    // ── 7. Spawn ─────────────────────────────────────────────────────────────
    if rng.gen_bool(difficulty.spawn_probability) {
        spawn_entity(state, config, rng);
    }

    // ── 8. Clock ─────────────────────────────────────────────────────────────
    advance_timer(state, config, delta_seconds.max(0.0), level, &mut events);

    events
}
