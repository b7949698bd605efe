/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// simulation.  No game logic is performed; this module only translates
/// state into terminal commands.  The simulation works in pixels, so every
/// position is scaled down to character cells on the way out.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use recovery_arcade::entities::{
    Entity, EntityCategory, Projectile, SessionStatus, SimulationState,
};
use recovery_arcade::progress::Progression;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Pixels per terminal column.
pub const CELL_W: f32 = 10.0;
/// Pixels per terminal row.
pub const CELL_H: f32 = 20.0;

/// Rows above the play area: HUD + top border.
const TOP_ROWS: u16 = 2;
/// Rows below the play area: bottom border + hint.
const BOTTOM_ROWS: u16 = 2;

/// Terminal size in cells.
#[derive(Clone, Copy, Debug)]
pub struct Screen {
    pub cols: u16,
    pub rows: u16,
}

impl Screen {
    /// Play-area size in pixels for this terminal.
    pub fn play_area(self) -> (f32, f32) {
        let cols = self.cols.saturating_sub(2).max(1);
        let rows = self.rows.saturating_sub(TOP_ROWS + BOTTOM_ROWS).max(1);
        (cols as f32 * CELL_W, rows as f32 * CELL_H)
    }

    fn bottom_border(self) -> u16 {
        self.rows.saturating_sub(BOTTOM_ROWS)
    }

    /// Cell for a play-area pixel, or `None` when it falls off the board.
    fn cell(self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = 1 + (x / CELL_W) as u16;
        let row = TOP_ROWS + (y / CELL_H) as u16;
        if col >= self.cols.saturating_sub(1) || row >= self.bottom_border() {
            return None;
        }
        Some((col, row))
    }
}

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_TIME: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_HAZARD: Color = Color::Red;
const C_BENEFIT: Color = Color::Green;
const C_PROJECTILE: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;
const C_MESSAGE: Color = Color::Magenta;

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.  `message` is the latest scoring label, shown
/// under the HUD for a moment.
pub fn render<W: Write>(
    out: &mut W,
    screen: Screen,
    state: &SimulationState,
    progress: &Progression,
    message: Option<&str>,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, screen)?;
    draw_hud(out, screen, state)?;

    for entity in state.live_entities() {
        draw_entity(out, screen, entity)?;
    }
    for projectile in state.active_projectiles() {
        draw_projectile(out, screen, projectile)?;
    }

    draw_player(out, screen, state)?;
    draw_controls_hint(out, screen)?;

    if let Some(msg) = message {
        draw_centered(out, screen, TOP_ROWS, msg, C_MESSAGE)?;
    }

    match state.status {
        SessionStatus::Idle => draw_title(out, screen, progress)?,
        SessionStatus::Paused => draw_paused(out, screen)?,
        SessionStatus::Completed => draw_completed(out, screen, state, progress)?,
        SessionStatus::Running => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, screen.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, screen: Screen) -> std::io::Result<()> {
    let w = screen.cols as usize;
    let bottom = screen.bottom_border();

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, TOP_ROWS - 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, bottom))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in TOP_ROWS..bottom {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(screen.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, screen: Screen, state: &SimulationState) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}", state.score)))?;

    let level_str = format!("[ LEVEL {} ]", state.difficulty_level);
    let level_color = match state.difficulty_level {
        1 | 2 => Color::Green,
        3 | 4 => Color::Yellow,
        _ => Color::Red,
    };
    let lx = (screen.cols / 2).saturating_sub(level_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(level_color))?;
    out.queue(Print(&level_str))?;

    let time_str = format!("Time:{:>5.1}s", state.time_remaining);
    let rx = screen
        .cols
        .saturating_sub(time_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_TIME))?;
    out.queue(Print(&time_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, screen: Screen, state: &SimulationState) -> std::io::Result<()> {
    // Sprite (2 rows, 3 cols), anchored on the player's centre:
    //   ▲
    //  /█\
    let p = &state.player;
    out.queue(style::SetForegroundColor(C_PLAYER))?;

    if let Some((col, row)) = screen.cell(p.x, p.y - CELL_H / 2.0) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print("▲"))?;
    }
    if let Some((col, row)) = screen.cell(p.x, p.y + CELL_H / 2.0) {
        out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row))?;
        out.queue(Print("/█\\"))?;
    }

    Ok(())
}

fn draw_entity<W: Write>(out: &mut W, screen: Screen, entity: &Entity) -> std::io::Result<()> {
    let Some((col, row)) = screen.cell(entity.x, entity.y) else {
        return Ok(());
    };
    let color = match entity.category {
        EntityCategory::Hazard => C_HAZARD,
        EntityCategory::Benefit => C_BENEFIT,
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(entity.glyph))?;
    Ok(())
}

fn draw_projectile<W: Write>(
    out: &mut W,
    screen: Screen,
    projectile: &Projectile,
) -> std::io::Result<()> {
    if let Some((col, row)) = screen.cell(projectile.x, projectile.y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_PROJECTILE))?;
        out.queue(Print("║"))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, screen: Screen) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, screen.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "←↑→↓ / WASD : Move   SPACE : Shoot   P : Pause   R : Restart   Q : Quit",
    ))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    screen: Screen,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (screen.cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_lines<W: Write>(
    out: &mut W,
    screen: Screen,
    lines: &[(String, Color)],
) -> std::io::Result<()> {
    let start_row = (screen.rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (text, color)) in lines.iter().enumerate() {
        draw_centered(out, screen, start_row + i as u16, text, *color)?;
    }
    Ok(())
}

fn draw_title<W: Write>(out: &mut W, screen: Screen, progress: &Progression) -> std::io::Result<()> {
    let lines = [
        ("★  RECOVERY  ARCADE  ★".to_string(), Color::Cyan),
        (
            "Shoot down temptations, catch your recovery tools".to_string(),
            Color::White,
        ),
        (
            format!(
                "Level {}   Total {}   Tools {}   Streak {}",
                progress.level,
                progress.total_score,
                progress.tools.len(),
                progress.streak
            ),
            Color::Yellow,
        ),
        ("ENTER / R - Start   Q - Quit".to_string(), Color::DarkGrey),
    ];
    draw_lines(out, screen, &lines)
}

fn draw_paused<W: Write>(out: &mut W, screen: Screen) -> std::io::Result<()> {
    let lines = [
        ("╔════════════════════╗".to_string(), Color::Yellow),
        ("║       PAUSED       ║".to_string(), Color::Yellow),
        ("╚════════════════════╝".to_string(), Color::Yellow),
        ("P - Resume   Q - Quit".to_string(), Color::White),
    ];
    draw_lines(out, screen, &lines)
}

fn draw_completed<W: Write>(
    out: &mut W,
    screen: Screen,
    state: &SimulationState,
    progress: &Progression,
) -> std::io::Result<()> {
    let mut lines = vec![
        ("╔════════════════════╗".to_string(), Color::Green),
        ("║  SESSION COMPLETE  ║".to_string(), Color::Green),
        ("╚════════════════════╝".to_string(), Color::Green),
        (format!("Final Score: {:>6}", state.score), Color::Yellow),
        (
            format!(
                "Level {}   Total {}   Streak {}",
                progress.level, progress.total_score, progress.streak
            ),
            Color::White,
        ),
    ];
    if !progress.achievements.is_empty() {
        let names: Vec<&str> = progress.achievements.iter().map(String::as_str).collect();
        lines.push((format!("Achievements: {}", names.join(", ")), Color::Magenta));
    }
    lines.push(("R - Play Again  Q - Quit".to_string(), Color::White));
    draw_lines(out, screen, &lines)
}
