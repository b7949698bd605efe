/// All simulation entity types — pure data, no logic.

// ── Falling items ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityCategory {
    /// A temptation: shoot it down for points.
    Hazard,
    /// A recovery tool: catch it with the player for points.
    Benefit,
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    /// Horizontal drift in pixels per tick.
    pub vx: f32,
    /// Base fall speed in pixels per tick, before the difficulty multiplier.
    pub vy: f32,
    pub category: EntityCategory,
    pub name: &'static str,
    pub glyph: &'static str,
    pub points: u32,
    pub radius: f32,
    /// Set once, when the entity is shot or caught. Collected entities are
    /// skipped by physics and collision and dropped on the following tick.
    pub collected: bool,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Projectile {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    /// Vertical velocity in pixels per tick (negative = upward).
    pub vy: f32,
    pub active: bool,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Unit vector in screen space (y grows downward).
    pub fn delta(self) -> (f32, f32) {
        match self {
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
        }
    }
}

/// Directions currently held down by the host's input layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldDirections {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl HeldDirections {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
        }
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    pub fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

// ── Master simulation state ───────────────────────────────────────────────────

/// Everything one playthrough needs.  Owned by the engine and mutated in
/// place every tick; renderers only ever see a shared reference.
#[derive(Clone, Debug)]
pub struct SimulationState {
    pub player: Player,
    pub entities: Vec<Entity>,
    pub projectiles: Vec<Projectile>,
    pub held: HeldDirections,
    pub score: u32,
    /// Seconds left in the session.
    pub time_remaining: f64,
    pub difficulty_level: u32,
    pub status: SessionStatus,
    /// Number of ticks advanced since the session started.
    pub frame: u64,
    /// Source of entity and projectile ids; never reused within a session.
    pub next_id: u64,
    pub width: f32,
    pub height: f32,
}

impl SimulationState {
    /// Allocate a fresh id for a new entity or projectile.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Entities still in play (not yet collected).
    pub fn live_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| !e.collected)
    }

    /// Projectiles still in flight.
    pub fn active_projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter().filter(|p| p.active)
    }
}
