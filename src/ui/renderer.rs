/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The world is 32x32 sprite cells, y-up. Each sprite cell is drawn as two
/// terminal columns; world row `gy` lands on screen row `MAP_ROW + 31 - gy`.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Actor, ActorKind, Facing, Goodie};
use crate::domain::physics::{GRID_HEIGHT, GRID_WIDTH, SPRITE_HEIGHT, SPRITE_WIDTH};
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// inter-row gap color matches the cell color on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Sprite mapping ──

/// Terminal columns per sprite cell.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

/// Nearest grid cell for a pixel position, or None when off the grid.
fn pixel_to_cell(x: i32, y: i32) -> Option<(usize, usize)> {
    let gx = (x + SPRITE_WIDTH / 2).div_euclid(SPRITE_WIDTH);
    let gy = (y + SPRITE_HEIGHT / 2).div_euclid(SPRITE_HEIGHT);
    if gx < 0 || gy < 0 || gx >= GRID_WIDTH as i32 || gy >= GRID_HEIGHT as i32 {
        return None;
    }
    Some((gx as usize, gy as usize))
}

/// Two-column glyph and colors for an actor.
fn actor_glyph(actor: &Actor, tick: u32) -> ([char; 2], Color, Color) {
    let left = actor.facing == Facing::Left;
    match actor.kind {
        ActorKind::Block { goodie: None } => (['▓', '▓'], Color::Rgb { r: 180, g: 120, b: 60 }, Color::Rgb { r: 100, g: 65, b: 30 }),
        ActorKind::Block { goodie: Some(_) } => (['[', '?'], Color::Rgb { r: 255, g: 220, b: 50 }, Color::Rgb { r: 140, g: 90, b: 20 }),
        ActorKind::Pipe => (['▐', '▌'], Color::Rgb { r: 60, g: 200, b: 60 }, Color::Rgb { r: 0, g: 90, b: 0 }),
        ActorKind::Goomba => (if left { ['<', 'g'] } else { ['g', '>'] }, Color::Rgb { r: 200, g: 120, b: 60 }, Color::Reset),
        ActorKind::Koopa => (if left { ['<', 'k'] } else { ['k', '>'] }, Color::Rgb { r: 80, g: 220, b: 80 }, Color::Reset),
        ActorKind::Piranha { anim_frame, .. } => {
            let mouth = if (anim_frame / 4) % 2 == 0 { 'W' } else { 'V' };
            ([mouth, mouth], Color::Rgb { r: 255, g: 60, b: 60 }, Color::Reset)
        }
        ActorKind::Powerup(Goodie::Mushroom) => (['(', ')'], Color::Rgb { r: 255, g: 80, b: 80 }, Color::Reset),
        ActorKind::Powerup(Goodie::Flower) => (['*', '*'], Color::Rgb { r: 255, g: 150, b: 40 }, Color::Reset),
        ActorKind::Powerup(Goodie::Star) => {
            let fg = if (tick / 2) % 2 == 0 { Color::Rgb { r: 255, g: 255, b: 80 } } else { Color::White };
            (['<', '>'], fg, Color::Reset)
        }
        ActorKind::PiranhaFireball => (['o', ' '], Color::Rgb { r: 255, g: 60, b: 60 }, Color::Reset),
        ActorKind::PlayerFireball => (['o', ' '], Color::Rgb { r: 255, g: 180, b: 40 }, Color::Reset),
        ActorKind::Shell => (['(', ')'], Color::Rgb { r: 80, g: 220, b: 80 }, Color::Reset),
        ActorKind::Flag => (['|', '>'], Color::White, Color::Reset),
        ActorKind::Mario => (['M', '!'], Color::Rgb { r: 255, g: 60, b: 60 }, Color::Reset),
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();

        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Playing => self.compose_game(world),
            Phase::Dying => {
                self.compose_game(world);
                self.compose_banner("Ouch!", Color::Rgb { r: 255, g: 60, b: 60 });
            }
            Phase::LevelComplete => {
                self.compose_game(world);
                self.compose_banner("Level complete!", Color::Rgb { r: 80, g: 255, b: 80 });
            }
            Phase::GameOver => self.compose_game_over(world),
            Phase::GameComplete => self.compose_game_complete(world),
            Phase::LevelError => self.compose_level_error(world),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(1, HUD_ROW, &w.status_text, Color::White, HUD_BG);

        // Back to front: terrain, then projectiles and level enders, then enemies.
        let mut order: Vec<&Actor> = w.actors.iter().filter(|a| a.alive).collect();
        order.sort_by_key(|a| std::cmp::Reverse(a.depth()));
        for actor in order {
            if let Some((gx, gy)) = pixel_to_cell(actor.x, actor.y) {
                let (chars, fg, bg) = actor_glyph(actor, w.anim_tick);
                self.put_sprite(gx, gy, chars, fg, bg);
            }
        }

        if let Some((gx, gy)) = pixel_to_cell(w.player.x, w.player.y) {
            let p = &w.player;
            let blink = p.invincible_ticks > 0 && (w.anim_tick / 2) % 2 == 1;
            if !blink {
                let fg = if p.has_star_power() {
                    Color::Rgb { r: 255, g: 255, b: 80 }
                } else {
                    Color::Rgb { r: 255, g: 150, b: 200 }
                };
                let chars = if p.facing == Facing::Left { ['<', 'P'] } else { ['P', '>'] };
                self.put_sprite(gx, gy, chars, fg, Color::Reset);
            }
        }

        let help_row = MAP_ROW + GRID_HEIGHT + 1;
        let help = " ←→/AD:Walk  ↑/W:Jump  Space/Z:Fire  ESC:Title";
        self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
    }

    fn put_sprite(&mut self, gx: usize, gy: usize, chars: [char; 2], fg: Color, bg: Color) {
        let row = MAP_ROW + (GRID_HEIGHT - 1 - gy);
        let col = gx * CELL_W;
        self.front.set(col, row, Cell::new(chars[0], fg, bg));
        self.front.set(col + 1, row, Cell::new(chars[1], fg, bg));
    }

    fn compose_banner(&mut self, text: &str, fg: Color) {
        let row = MAP_ROW + GRID_HEIGHT / 2;
        let label = format!("  {}  ", text);
        let x = (GRID_WIDTH * CELL_W).saturating_sub(label.chars().count()) / 2;
        self.front.put_str(x, row, &label, fg, Color::Rgb { r: 40, g: 40, b: 40 });
    }

    // ── Static screens (title, game over, etc.) ──

    fn compose_title(&mut self, w: &WorldState) {
        let title = [
            r"  ___                        ___          _    ",
            r" / __| _  _  _ __  ___  _ _ | _ \ ___  __ _ __| |_  ",
            r" \__ \| || || '_ \/ -_)| '_||  _// -_)/ _` / _| ' \ ",
            r" |___/ \_,_|| .__/\___||_|  |_|  \___|\__,_\__|_||_|",
            r"            |_|                                    ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, Color::Rgb { r: 255, g: 150, b: 200 }, Color::Reset);
        }
        self.front.put_str(14, 8, "━━━  S I S T E R S  ━━━", Color::Rgb { r: 255, g: 220, b: 50 }, Color::Reset);

        let hi = Color::Rgb { r: 80, g: 255, b: 80 };
        self.front.put_str(8, 11, "ENTER   New Game", hi, Color::Reset);
        self.front.put_str(8, 12, "  ESC   Quit", Color::White, Color::Reset);

        let help = [
            "Controls",
            "  ←→ / AD      Walk",
            "  ↑ / W        Jump",
            "  Space / Z    Fire (with a flower)",
            "  Pad: D-pad walk, A jump, B/X fire",
        ];
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { Color::Rgb { r: 255, g: 200, b: 50 } } else { Color::White };
            self.front.put_str(8, 15 + i, line, color, Color::Reset);
        }

        if !w.message.is_empty() {
            let row = self.front.height.saturating_sub(1);
            self.front.fill_row(row, MSG_BG);
            self.front.put_str(1, row, &w.message, Color::Black, MSG_BG);
        }
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        let box_art = [
            "╔══════════════════════════════╗",
            "║          GAME  OVER          ║",
            "╚══════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(6, 4 + i, l, Color::Rgb { r: 255, g: 60, b: 60 }, Color::Reset);
        }
        self.front.put_str(8, 9, &format!("Final score: {}", w.score), Color::White, Color::Reset);
        self.front.put_str(8, 10, &format!("Reached level: {:02}", w.level), Color::White, Color::Reset);
        self.front.put_str(8, 12, "ENTER: Retry from level 01", Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
        self.front.put_str(8, 13, "ESC:   Back to title", Color::DarkGrey, Color::Reset);
    }

    fn compose_game_complete(&mut self, w: &WorldState) {
        let box_art = [
            "╔══════════════════════════════════════╗",
            "║  ★ THANK YOU, PEACH! YOU WON! ★      ║",
            "╚══════════════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(4, 4 + i, l, Color::Rgb { r: 255, g: 220, b: 50 }, Color::Reset);
        }
        self.front.put_str(6, 9, &format!("Final score: {}", w.score), Color::White, Color::Reset);
        self.front.put_str(6, 11, "ENTER / ESC: Back to title", Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
    }

    fn compose_level_error(&mut self, w: &WorldState) {
        let red = Color::Rgb { r: 255, g: 60, b: 60 };
        self.front.put_str(4, 4, &format!("Could not load level {:02}", w.level), red, Color::Reset);
        self.front.put_str(4, 6, &w.message, Color::White, Color::Reset);
        self.front.put_str(4, 8, "ENTER / ESC: Back to title", Color::DarkGrey, Color::Reset);
    }
}
