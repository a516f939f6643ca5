//! Events emitted during a simulation tick or input action.
//! The presentation layer consumes these for feedback; nothing in the
//! simulation depends on them being read.

use crate::domain::tile::{Dir, TilePos};

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    ItemPlaced { tile: TilePos },
    ItemIgnited { tile: TilePos },
    ItemConsumed { tile: TilePos },
    ItemsCleared { count: usize },
    BerryPicked { id: u32, tile: TilePos },
    PebbleCharging { pebble: usize, dir: Dir },
    PebbleSliding { pebble: usize, from: TilePos, to: TilePos },
    PebblePushBlocked { pebble: usize },
    PebbleSettled { pebble: usize, tile: TilePos },
    EnemyBurned { enemy: usize },
    PlayerCaught { enemy: usize },
    PortalUsed { portal: u32, to_level: usize, to_portal: u32 },
    LevelEntered { level: usize },
}
