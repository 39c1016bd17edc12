/// Spatial query layer: single source of truth for "who is at (x, y)".
///
/// ## Geometry
///
/// Every entity is an axis-aligned box of `SPRITE_WIDTH` x `SPRITE_HEIGHT`
/// pixels anchored at its bottom-left corner. World coordinates are y-up
/// integer pixels; one grid cell is one sprite.
///
/// Two boxes overlap iff, on each axis independently, either edge of the
/// query box falls inside the target's inclusive span.
///
/// ## Query modes
///
/// ┌────────────────────┬──────────────┬─────────────────────────────┐
/// │ Mode               │ Player?      │ Actors scanned              │
/// ├────────────────────┼──────────────┼─────────────────────────────┤
/// │ Collidable         │ never        │ terrain only (movement)     │
/// │ Contact            │ never        │ all, collection order       │
/// │ ContactWithPlayer  │ tested first │ all, collection order       │
/// └────────────────────┴──────────────┴─────────────────────────────┘
///
/// First match wins. Liveness is NOT filtered here: an actor killed earlier
/// in the tick is still found until the end-of-tick sweep, and callers
/// check `alive` themselves.

use super::entity::{Actor, Player};

pub const SPRITE_WIDTH: i32 = 8;
pub const SPRITE_HEIGHT: i32 = 8;
pub const GRID_WIDTH: usize = 32;
pub const GRID_HEIGHT: usize = 32;

/// Who occupies a queried position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Occupant {
    Player,
    /// Index into the actor collection; valid until the end-of-tick sweep.
    Actor(usize),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Query {
    Collidable,
    Contact,
    ContactWithPlayer,
}

impl Query {
    pub fn contact(include_player: bool) -> Query {
        if include_player { Query::ContactWithPlayer } else { Query::Contact }
    }
}

/// Does a span of `size` starting at `q` touch the span starting at `t`?
/// Tests both edges of the query span against the target's inclusive span.
#[inline]
fn span_touches(q: i32, t: i32, size: i32) -> bool {
    let near = q >= t && q <= t + size - 1;
    let far = q + size - 1 >= t && q + size - 1 <= t + size - 1;
    near || far
}

/// Box overlap between a query box at (qx, qy) and a target box at (tx, ty).
#[inline]
pub fn overlaps(qx: i32, qy: i32, tx: i32, ty: i32) -> bool {
    span_touches(qx, tx, SPRITE_WIDTH) && span_touches(qy, ty, SPRITE_HEIGHT)
}

/// Find the occupant of the box at (x, y).
pub fn find_occupant(player: &Player, actors: &[Actor], x: i32, y: i32, query: Query) -> Option<Occupant> {
    if query == Query::ContactWithPlayer && overlaps(x, y, player.x, player.y) {
        return Some(Occupant::Player);
    }

    actors.iter()
        .enumerate()
        .filter(|(_, a)| query != Query::Collidable || a.is_collidable())
        .find(|(_, a)| overlaps(x, y, a.x, a.y))
        .map(|(i, _)| Occupant::Actor(i))
}

/// Grid cell (column, row-from-bottom) → pixel origin.
#[inline]
pub fn cell_to_pixel(col: usize, row: usize) -> (i32, i32) {
    (col as i32 * SPRITE_WIDTH, row as i32 * SPRITE_HEIGHT)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
