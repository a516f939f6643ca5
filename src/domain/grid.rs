//! Static per-level tile occupancy plus bounds.
//!
//! The grid is immutable once a level is loaded; dynamic obstacles
//! (pebbles) live in their own population and are composed at query
//! time by the collision resolver.

use super::tile::{Tile, TilePos};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Vec<Tile>>,
}

impl Grid {
    /// Build from row-major tiles. Short rows are padded with Walkable
    /// so the grid is always rectangular.
    pub fn new(mut tiles: Vec<Vec<Tile>>) -> Self {
        let height = tiles.len();
        let width = tiles.iter().map(|r| r.len()).max().unwrap_or(0);
        for row in &mut tiles {
            row.resize(width, Tile::Walkable);
        }
        Grid { width, height, tiles }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Tile at `pos`. Out of bounds reads as Solid.
    #[inline]
    pub fn tile_at(&self, pos: TilePos) -> Tile {
        if self.in_bounds(pos) {
            self.tiles[pos.y as usize][pos.x as usize]
        } else {
            Tile::Solid
        }
    }

    #[inline]
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.tile_at(pos).is_walkable()
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.tiles
    }
}

#[cfg(test)]
pub(crate) fn grid_from(rows: &[&str]) -> Grid {
    Grid::new(
        rows.iter()
            .map(|row| {
                row.chars()
                    .map(|ch| if ch == '#' { Tile::Solid } else { Tile::Walkable })
                    .collect()
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_solid() {
        let g = grid_from(&["..", ".."]);
        assert!(g.is_walkable(TilePos::new(1, 1)));
        assert!(!g.is_walkable(TilePos::new(-1, 0)));
        assert!(!g.is_walkable(TilePos::new(2, 0)));
        assert!(!g.is_walkable(TilePos::new(0, 2)));
    }

    #[test]
    fn ragged_rows_are_padded() {
        let g = Grid::new(vec![vec![Tile::Solid], vec![Tile::Solid, Tile::Solid, Tile::Solid]]);
        assert_eq!(g.width(), 3);
        assert_eq!(g.tile_at(TilePos::new(2, 0)), Tile::Walkable);
    }

    #[test]
    fn wall_is_solid() {
        let g = grid_from(&[".#"]);
        assert_eq!(g.tile_at(TilePos::new(1, 0)), Tile::Solid);
    }
}
