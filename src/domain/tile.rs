/// Level tile codes and their text legend.
/// A tile is only a construction-time code: each non-empty tile becomes an
/// actor when the world is built, so there is no runtime tile layer.

use super::entity::Goodie;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    PlayerStart,
    Block,
    Pipe,
    Goomba,
    Koopa,
    Piranha,
    MushroomBlock,
    FlowerBlock,
    StarBlock,
    Flag,
    Mario,
}

impl Tile {
    /// Decode one level-file character. Unknown characters yield `None`.
    pub fn from_char(c: char) -> Option<Tile> {
        let tile = match c {
            ' ' | '.' => Tile::Empty,
            '@' => Tile::PlayerStart,
            '#' => Tile::Block,
            'p' => Tile::Pipe,
            'g' => Tile::Goomba,
            'k' => Tile::Koopa,
            'r' => Tile::Piranha,
            'm' => Tile::MushroomBlock,
            'f' => Tile::FlowerBlock,
            's' => Tile::StarBlock,
            'l' => Tile::Flag,
            'M' => Tile::Mario,
            _ => return None,
        };
        Some(tile)
    }

    /// Goodie carried by a goodie block, if this is one.
    pub fn goodie(self) -> Option<Goodie> {
        match self {
            Tile::MushroomBlock => Some(Goodie::Mushroom),
            Tile::FlowerBlock => Some(Goodie::Flower),
            Tile::StarBlock => Some(Goodie::Star),
            _ => None,
        }
    }

    /// Does this tile spawn an enemy?
    pub fn is_enemy(self) -> bool {
        matches!(self, Tile::Goomba | Tile::Koopa | Tile::Piranha)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_round_trip_for_known_chars() {
        assert_eq!(Tile::from_char('@'), Some(Tile::PlayerStart));
        assert_eq!(Tile::from_char('M'), Some(Tile::Mario));
        assert_eq!(Tile::from_char('.'), Some(Tile::Empty));
        assert_eq!(Tile::from_char('?'), None);
    }

    #[test]
    fn only_goodie_blocks_carry_goodies() {
        assert_eq!(Tile::StarBlock.goodie(), Some(Goodie::Star));
        assert_eq!(Tile::Block.goodie(), None);
        assert!(Tile::Koopa.is_enemy());
        assert!(!Tile::Pipe.is_enemy());
    }
}
