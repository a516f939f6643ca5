//! Pebble mechanic: push-charge, then slide.
//!
//! Two independent state machines per pebble:
//!
//!   1. **Charge**: `Idle | Charging { started_ms, dir }`. Entered when the
//!      actor's move is blocked only by this pebble; kept while the same
//!      push repeats every tick; dropped to Idle the first tick it doesn't.
//!   2. **Motion**: `Idle | Sliding { from, to, progress }`. Entered when a
//!      charge has lasted `charge_ms` and the tile beyond is free.
//!
//! ## Tile ownership
//!
//! Ownership moves atomically at slide start: from that instant the
//! pebble occupies `to` (reserved against the actor, other pebbles and
//! pushes) and `from` is released. `occupied_tile()` is the only
//! occupancy query; collision and push checks both go through it.

use tracing::{debug, info};

use super::grid::Grid;
use super::tile::{Dir, TilePos};

/// Progress at or beyond this counts as arrived (absorbs float drift from
/// repeated fractional increments).
const ARRIVE_EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Charge {
    Idle,
    Charging { started_ms: u64, dir: Dir },
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Motion {
    Idle,
    Sliding { from: TilePos, to: TilePos, progress: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pebble {
    /// Resting tile. Updated when a slide completes.
    pub tile: TilePos,
    pub x: f32,
    pub y: f32,
    pub charge: Charge,
    pub motion: Motion,
}

impl Pebble {
    pub fn new(tile: TilePos) -> Self {
        let (x, y) = tile.to_pixel();
        Pebble { tile, x, y, charge: Charge::Idle, motion: Motion::Idle }
    }

    pub fn is_sliding(&self) -> bool {
        matches!(self.motion, Motion::Sliding { .. })
    }

    /// The tile this pebble blocks: its destination while sliding,
    /// otherwise its resting tile.
    pub fn occupied_tile(&self) -> TilePos {
        match self.motion {
            Motion::Sliding { to, .. } => to,
            Motion::Idle => self.tile,
        }
    }
}

/// The actor is pushing pebble `pebble` toward `dir` this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Push {
    pub pebble: usize,
    pub dir: Dir,
}

#[derive(Clone, Copy, Debug)]
pub struct PebbleTuning {
    pub charge_ms: u64,
    pub slide_per_tick: f32,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PebbleEvent {
    ChargeStarted { pebble: usize, dir: Dir },
    SlideStarted { pebble: usize, from: TilePos, to: TilePos },
    PushBlocked { pebble: usize, toward: TilePos },
    Settled { pebble: usize, tile: TilePos },
}

/// Is `tile` a legal slide destination for pebble `mover`?
/// `reserved` holds extra occupied tiles (live enemies).
pub fn slide_target_free(
    grid: &Grid,
    pebbles: &[Pebble],
    mover: usize,
    tile: TilePos,
    reserved: &[TilePos],
) -> bool {
    grid.is_walkable(tile)
        && !pebbles
            .iter()
            .enumerate()
            .any(|(j, p)| j != mover && p.occupied_tile() == tile)
        && !reserved.contains(&tile)
}

/// Advance every pebble one fast tick.
pub fn update(
    pebbles: &mut [Pebble],
    grid: &Grid,
    push: Option<Push>,
    now_ms: u64,
    reserved: &[TilePos],
    tuning: PebbleTuning,
) -> Vec<PebbleEvent> {
    let mut events = Vec::new();

    for i in 0..pebbles.len() {
        if let Motion::Sliding { from, to, progress } = pebbles[i].motion {
            advance_slide(&mut pebbles[i], i, from, to, progress, tuning, &mut events);
            continue;
        }

        let dir = match push {
            Some(p) if p.pebble == i => p.dir,
            _ => {
                if pebbles[i].charge != Charge::Idle {
                    debug!(pebble = i, "charge released");
                }
                pebbles[i].charge = Charge::Idle;
                continue;
            }
        };

        let started_ms = match pebbles[i].charge {
            Charge::Charging { started_ms, dir: d } if d == dir => started_ms,
            _ => {
                pebbles[i].charge = Charge::Charging { started_ms: now_ms, dir };
                events.push(PebbleEvent::ChargeStarted { pebble: i, dir });
                now_ms
            }
        };

        if now_ms.saturating_sub(started_ms) < tuning.charge_ms {
            continue;
        }

        let from = pebbles[i].tile;
        let (dx, dy) = dir.delta();
        let to = from.offset(dx, dy);
        pebbles[i].charge = Charge::Idle;
        if slide_target_free(grid, pebbles, i, to, reserved) {
            pebbles[i].motion = Motion::Sliding { from, to, progress: 0.0 };
            info!(pebble = i, from_x = from.x, from_y = from.y, to_x = to.x, to_y = to.y, "pebble slide started");
            events.push(PebbleEvent::SlideStarted { pebble: i, from, to });
        } else {
            info!(pebble = i, to_x = to.x, to_y = to.y, "pebble push blocked");
            events.push(PebbleEvent::PushBlocked { pebble: i, toward: to });
        }
    }

    events
}

fn advance_slide(
    pebble: &mut Pebble,
    idx: usize,
    from: TilePos,
    to: TilePos,
    progress: f32,
    tuning: PebbleTuning,
    events: &mut Vec<PebbleEvent>,
) {
    let progress = (progress + tuning.slide_per_tick).min(1.0);
    if progress >= 1.0 - ARRIVE_EPSILON {
        pebble.tile = to;
        (pebble.x, pebble.y) = to.to_pixel();
        pebble.motion = Motion::Idle;
        debug!(pebble = idx, x = to.x, y = to.y, "pebble settled");
        events.push(PebbleEvent::Settled { pebble: idx, tile: to });
        return;
    }
    let (fx, fy) = from.to_pixel();
    let (tx, ty) = to.to_pixel();
    pebble.x = fx + (tx - fx) * progress;
    pebble.y = fy + (ty - fy) * progress;
    pebble.motion = Motion::Sliding { from, to, progress };
}
