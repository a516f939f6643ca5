//! Tile types, tile coordinates and the pixel <-> tile mapping.
//! Tile semantics are queried via methods, not stored as flags,
//! so they stay centralized here.

/// Edge length of one tile in pixels.
pub const TILE_SIZE: f32 = 32.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Walkable,
    Solid,
}

impl Tile {
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Solid)
    }

    pub fn is_walkable(self) -> bool {
        !self.is_solid()
    }
}

/// Integer grid coordinate. Signed so neighbor arithmetic can step off the
/// map and be rejected by bounds checks instead of wrapping.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        TilePos { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        TilePos { x: self.x + dx, y: self.y + dy }
    }

    /// Tile containing the pixel point. Floors, so negative pixels land on
    /// negative tiles (out of bounds) rather than truncating toward 0.
    pub fn from_pixel(px: f32, py: f32) -> Self {
        TilePos {
            x: (px / TILE_SIZE).floor() as i32,
            y: (py / TILE_SIZE).floor() as i32,
        }
    }

    /// Top-left pixel corner of this tile.
    pub fn to_pixel(self) -> (f32, f32) {
        (self.x as f32 * TILE_SIZE, self.y as f32 * TILE_SIZE)
    }

    pub fn manhattan(self, other: TilePos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The 8 surrounding tiles, orthogonal first.
    pub fn neighbors8(self) -> [TilePos; 8] {
        [
            self.offset(0, -1),
            self.offset(0, 1),
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(-1, -1),
            self.offset(1, -1),
            self.offset(-1, 1),
            self.offset(1, 1),
        ]
    }
}

/// Cardinal direction of a held key, a push, or a facing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    /// Sprite rotation in degrees, 0 = facing up, clockwise.
    pub fn angle_degrees(self) -> f32 {
        match self {
            Dir::Up => 0.0,
            Dir::Right => 90.0,
            Dir::Down => 180.0,
            Dir::Left => 270.0,
        }
    }

    /// Facing implied by a one-step displacement. Horizontal wins ties.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Dir> {
        if dx > 0 {
            Some(Dir::Right)
        } else if dx < 0 {
            Some(Dir::Left)
        } else if dy > 0 {
            Some(Dir::Down)
        } else if dy < 0 {
            Some(Dir::Up)
        } else {
            None
        }
    }
}
