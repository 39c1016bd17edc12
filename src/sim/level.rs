/// Level loader and world construction.
///
/// ## Sources (priority order):
///   1. `levels_dir/levelNN.txt` when the directory exists
///   2. Built-in embedded levels
///
/// ## File format (`levelNN.txt`):
///   Exactly 32 rows, top row first. Each row holds at most 32 cells;
///   shorter rows are padded with empty cells. Exactly one player start.
///
/// ## Tile legend:
///   '@' = Player start          '#' = Block
///   'p' = Pipe                  'l' = Flag (ends the level)
///   'g' = Goomba                'M' = Mario (ends the game)
///   'k' = Koopa                 'm' = Mushroom block
///   'r' = Piranha               'f' = Flower block
///   ' ' / '.' = Empty           's' = Star block
///
/// File row 0 is the top of the world: grid row `y = 31 - file_row`, since
/// world coordinates are y-up.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::entity::{ActorKind, Facing, Player};
use crate::domain::physics::{cell_to_pixel, GRID_HEIGHT, GRID_WIDTH};
use crate::domain::tile::Tile;
use super::world::{InitStatus, WorldState};

#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("level file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level: {reason}")]
    BadFormat { reason: String },
}

fn bad_format(reason: String) -> LevelLoadError {
    LevelLoadError::BadFormat { reason }
}

/// A parsed level: `tiles[y][x]`, y-up.
#[derive(Clone, Debug)]
pub struct LevelGrid {
    tiles: Vec<Vec<Tile>>,
}

impl LevelGrid {
    /// Tile at grid cell (x, y). Out of range reads as empty.
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        self.tiles.get(y).and_then(|row| row.get(x)).copied().unwrap_or_default()
    }
}

/// Where level grids come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelSource {
    Directory(PathBuf),
    Embedded,
}

impl LevelSource {
    /// Use `dir` if it exists, else the built-in set.
    pub fn from_dir(dir: &Path) -> Self {
        if dir.is_dir() {
            LevelSource::Directory(dir.to_path_buf())
        } else {
            log::warn!("levels dir {} not found, using built-in levels", dir.display());
            LevelSource::Embedded
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// `level01.txt`, `level02.txt`, ... (three digits past 99).
pub fn level_file_name(level: u32) -> String {
    format!("level{:02}.txt", level)
}

/// Build the world for `world.level`. On failure the world is left empty.
pub fn init_level(world: &mut WorldState, source: &LevelSource) -> InitStatus {
    world.teardown();

    match load_grid(source, world.level) {
        Ok(grid) => {
            build_world(world, &grid);
            world.refresh_status_text();
            log::info!("level {} loaded with {} actors", world.level, world.actors.len());
            InitStatus::Continue
        }
        Err(e) => {
            log::error!("level {}: {}", world.level, e);
            world.set_message(&e.to_string());
            InitStatus::LevelError
        }
    }
}

pub fn load_grid(source: &LevelSource, level: u32) -> Result<LevelGrid, LevelLoadError> {
    match source {
        LevelSource::Directory(dir) => {
            let path = dir.join(level_file_name(level));
            let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => LevelLoadError::NotFound { path: path.clone() },
                _ => LevelLoadError::Io { path: path.clone(), source: e },
            })?;
            parse_level(&content)
        }
        LevelSource::Embedded => {
            let rows = level.checked_sub(1)
                .and_then(|i| EMBEDDED_LEVELS.get(i as usize))
                .ok_or_else(|| LevelLoadError::NotFound {
                    path: PathBuf::from(format!("<built-in>/{}", level_file_name(level))),
                })?;
            parse_level(&rows.join("\n"))
        }
    }
}

/// Parse level text into a grid.
pub fn parse_level(content: &str) -> Result<LevelGrid, LevelLoadError> {
    let mut rows: Vec<&str> = content.lines().collect();
    while rows.last().map_or(false, |r| r.trim().is_empty()) && rows.len() > GRID_HEIGHT {
        rows.pop();
    }
    if rows.len() != GRID_HEIGHT {
        return Err(bad_format(format!("expected {} rows, found {}", GRID_HEIGHT, rows.len())));
    }

    let mut tiles = vec![vec![Tile::Empty; GRID_WIDTH]; GRID_HEIGHT];
    let mut starts = 0;

    for (file_row, line) in rows.iter().enumerate() {
        let line = line.trim_end();
        let width = line.chars().count();
        if width > GRID_WIDTH {
            return Err(bad_format(format!("row {} is {} cells wide (max {})", file_row + 1, width, GRID_WIDTH)));
        }
        let y = GRID_HEIGHT - 1 - file_row;
        for (x, ch) in line.chars().enumerate() {
            let tile = Tile::from_char(ch).ok_or_else(|| {
                bad_format(format!("unknown tile {:?} at row {}, column {}", ch, file_row + 1, x + 1))
            })?;
            if tile == Tile::PlayerStart {
                starts += 1;
            }
            tiles[y][x] = tile;
        }
    }

    if starts != 1 {
        return Err(bad_format(format!("expected one player start, found {}", starts)));
    }

    Ok(LevelGrid { tiles })
}

/// Populate the world from a grid: columns outer, rows inner, both
/// ascending. That visiting order is the actor collection order.
pub fn build_world(world: &mut WorldState, grid: &LevelGrid) {
    for x in 0..GRID_WIDTH {
        for y in 0..GRID_HEIGHT {
            let tile = grid.tile_at(x, y);
            let (px, py) = cell_to_pixel(x, y);

            let kind = match tile {
                Tile::Empty => continue,
                Tile::PlayerStart => {
                    world.player = Player::new(px, py);
                    continue;
                }
                Tile::Block | Tile::MushroomBlock | Tile::FlowerBlock | Tile::StarBlock => {
                    ActorKind::Block { goodie: tile.goodie() }
                }
                Tile::Pipe => ActorKind::Pipe,
                Tile::Goomba => ActorKind::Goomba,
                Tile::Koopa => ActorKind::Koopa,
                Tile::Piranha => ActorKind::Piranha { firing_delay: 0, anim_frame: 0 },
                Tile::Flag => ActorKind::Flag,
                Tile::Mario => ActorKind::Mario,
            };

            let facing = if tile.is_enemy() { world.random_facing() } else { Facing::Right };
            world.spawn(kind, px, py, facing);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

const EMBEDDED_LEVELS: [&[&str]; 2] = [
    // Level 1: ends at a flag
    &[
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "          m   s   m             ",
        "                                ",
        "                                ",
        "                                ",
        "      #mf#           ####       ",
        "                                ",
        "                                ",
        "                  p       r     ",
        "                  p       p     ",
        "  @     g     k   p   g   p   l ",
        "################################",
        "################################",
    ],
    // Level 2: ends at Mario
    &[
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "                                ",
        "             M                  ",
        "           #####                ",
        "                                ",
        "                                ",
        "      #f#          k            ",
        "                 #######        ",
        "                                ",
        "                                ",
        "   ####       s             r   ",
        "                            p   ",
        "              g             p   ",
        "          ######   g        p   ",
        "                 #####      p   ",
        " @   k     g            g   p   ",
        "################################",
        "################################",
    ],
];

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
