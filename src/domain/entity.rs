//! Entities: the player actor, hostile enemies (with their embedded path
//! state), portals, berries and the inventory berries are credited to.
//! Items and pebbles carry their own state machines in `fire` and `pebble`.

use std::collections::BTreeMap;

use super::tile::{Dir, TilePos, TILE_SIZE};

// ── Feet zone ──
//
// Collision and trigger tests only look at a thin band at the bottom of
// the sprite, inset horizontally, so the actor may overlap walls above
// its feet.

/// Height of the feet band (bottom quarter of the sprite).
pub const FEET_HEIGHT: f32 = TILE_SIZE / 4.0;
/// Offset from the sprite top to the top edge of the feet band.
pub const FEET_TOP: f32 = TILE_SIZE - FEET_HEIGHT;
/// Horizontal (and bottom) inset of the sample points.
pub const FEET_INSET: f32 = 1.0;

/// The player. `(x, y)` is the top-left pixel of the sprite.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub x: f32,
    pub y: f32,
    pub facing: Dir,
}

impl Actor {
    pub fn at_tile(tile: TilePos) -> Self {
        let (x, y) = tile.to_pixel();
        Actor { x, y, facing: Dir::Down }
    }

    /// Tile under the middle of the feet band. Used for every trigger:
    /// portals, berries, enemy pursuit goal.
    pub fn feet_tile(&self) -> TilePos {
        feet_tile_at(self.x, self.y)
    }
}

pub fn feet_tile_at(x: f32, y: f32) -> TilePos {
    TilePos::from_pixel(x + TILE_SIZE / 2.0, y + FEET_TOP + FEET_HEIGHT / 2.0)
}

/// Level index + portal id a portal leads to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PortalLink {
    pub level: usize,
    pub portal: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Portal {
    pub id: u32,
    pub tile: TilePos,
    pub target: PortalLink,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Berry {
    pub id: u32,
    pub tile: TilePos,
}

/// Name-keyed pickup counts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    counts: BTreeMap<String, u32>,
}

impl Inventory {
    pub const BERRY: &'static str = "berry";

    pub fn add(&mut self, name: &str, amount: u32) {
        *self.counts.entry(name.to_string()).or_insert(0) += amount;
    }

    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }
}

/// One tile-to-tile hop in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stride {
    pub from: TilePos,
    pub to: TilePos,
    /// 0.0 at `from`, 1.0 at `to`.
    pub progress: f32,
}

/// Per-enemy pursuit state. Lives inside the enemy record so it moves and
/// drops with it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathState {
    pub waypoints: Vec<TilePos>,
    /// Index of the next waypoint to walk to.
    pub cursor: usize,
    /// Ticks until the next path request. 0 = request this tick.
    pub cooldown: u32,
    pub stride: Option<Stride>,
}

impl PathState {
    pub fn next_waypoint(&self) -> Option<TilePos> {
        self.waypoints.get(self.cursor).copied()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub facing: Dir,
    pub alive: bool,
    pub path: PathState,
}

impl Enemy {
    pub fn at_tile(tile: TilePos) -> Self {
        let (x, y) = tile.to_pixel();
        Enemy {
            x,
            y,
            facing: Dir::Down,
            alive: true,
            path: PathState::default(),
        }
    }

    /// Tile the enemy is standing on (nearest tile to its top-left).
    pub fn tile(&self) -> TilePos {
        TilePos::from_pixel(self.x + TILE_SIZE / 2.0, self.y + TILE_SIZE / 2.0)
    }

    pub fn angle_degrees(&self) -> f32 {
        self.facing.angle_degrees()
    }
}
