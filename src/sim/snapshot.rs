//! Read-only view of the world for drawing.
//!
//! The visual variant of every entity is a pure function of its state;
//! nothing here feeds back into the simulation.

use crate::domain::fire::{BurnState, Item};
use crate::domain::grid::Grid;
use crate::domain::tile::{TilePos, TILE_SIZE};

use super::world::{Hud, WorldState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sprite {
    Player,
    Item,
    Flame,
    Portal,
    Berry,
    Pebble,
    Enemy,
    DeadEnemy,
}

impl Sprite {
    pub fn for_item(item: &Item) -> Option<Sprite> {
        match item.state {
            BurnState::Unburnt => Some(Sprite::Item),
            BurnState::Burning { .. } => Some(Sprite::Flame),
            BurnState::Consumed => None,
        }
    }

    pub fn for_enemy(alive: bool) -> Sprite {
        if alive { Sprite::Enemy } else { Sprite::DeadEnemy }
    }
}

/// One drawable entity. `(x, y)` is the top-left pixel; `angle` is
/// degrees clockwise from facing up.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SpriteView {
    pub sprite: Sprite,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

impl SpriteView {
    fn at_tile(sprite: Sprite, tile: TilePos) -> Self {
        let (x, y) = tile.to_pixel();
        SpriteView { sprite, x, y, angle: 0.0 }
    }

    pub fn tile(&self) -> TilePos {
        TilePos::from_pixel(self.x + TILE_SIZE / 2.0, self.y + TILE_SIZE / 2.0)
    }
}

pub struct Snapshot<'a> {
    pub grid: &'a Grid,
    /// Back to front: portals, berries, items, pebbles, enemies, player.
    pub sprites: Vec<SpriteView>,
    pub hud: Hud,
}

impl WorldState {
    pub fn snapshot(&self) -> Snapshot<'_> {
        let mut sprites = Vec::with_capacity(
            self.portals.len() + self.berries.len() + self.items.len() + self.pebbles.len() + self.enemies.len() + 1,
        );

        sprites.extend(self.portals.iter().map(|p| SpriteView::at_tile(Sprite::Portal, p.tile)));
        sprites.extend(self.berries.iter().map(|b| SpriteView::at_tile(Sprite::Berry, b.tile)));
        sprites.extend(
            self.items
                .iter()
                .filter_map(|it| Sprite::for_item(it).map(|s| SpriteView::at_tile(s, it.tile))),
        );
        sprites.extend(self.pebbles.iter().map(|p| SpriteView {
            sprite: Sprite::Pebble,
            x: p.x,
            y: p.y,
            angle: 0.0,
        }));
        sprites.extend(self.enemies.iter().map(|e| SpriteView {
            sprite: Sprite::for_enemy(e.alive),
            x: e.x,
            y: e.y,
            angle: e.angle_degrees(),
        }));
        sprites.push(SpriteView {
            sprite: Sprite::Player,
            x: self.player.x,
            y: self.player.y,
            angle: self.player.facing.angle_degrees(),
        });

        Snapshot { grid: &self.grid, sprites, hud: self.hud() }
    }
}
