//! Fire propagation: per-item burn state machine plus the delayed
//! 8-neighbor cascade.
//!
//! ## Lifecycle
//!
//! ```text
//!   Unburnt ──ignite──▶ Burning { expires_ms } ──dwell elapsed──▶ Consumed
//! ```
//!
//! Transitions only move forward. Consumed items leave the live
//! population; their tiles go onto a spread queue owned by the burn tick,
//! which is drained in the same tick to ignite Unburnt neighbors with a
//! fresh dwell. Fire therefore advances one neighbor-hop per dwell.

use super::tile::TilePos;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BurnState {
    Unburnt,
    Burning { expires_ms: u64 },
    Consumed,
}

impl BurnState {
    /// Position in the forward-only order. Used to assert monotonicity.
    pub fn rank(self) -> u8 {
        match self {
            BurnState::Unburnt => 0,
            BurnState::Burning { .. } => 1,
            BurnState::Consumed => 2,
        }
    }
}

/// A placed item (tile-aligned).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub tile: TilePos,
    pub state: BurnState,
}

impl Item {
    pub fn new(tile: TilePos) -> Self {
        Item { tile, state: BurnState::Unburnt }
    }

    pub fn is_burning(&self) -> bool {
        matches!(self.state, BurnState::Burning { .. })
    }

    /// Unburnt -> Burning. Returns false (and changes nothing) otherwise.
    pub fn ignite(&mut self, now_ms: u64, dwell_ms: u64) -> bool {
        if self.state != BurnState::Unburnt {
            return false;
        }
        self.state = BurnState::Burning { expires_ms: now_ms + dwell_ms };
        true
    }

    /// Burning -> Consumed once the dwell has elapsed.
    pub fn expire(&mut self, now_ms: u64) -> bool {
        match self.state {
            BurnState::Burning { expires_ms } if now_ms >= expires_ms => {
                self.state = BurnState::Consumed;
                true
            }
            _ => false,
        }
    }
}

/// What one burn tick did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BurnReport {
    pub consumed: Vec<TilePos>,
    pub ignited: Vec<TilePos>,
}

/// Ignite the Unburnt item at `tile`, if there is one.
pub fn ignite_at(items: &mut [Item], tile: TilePos, now_ms: u64, dwell_ms: u64) -> bool {
    items
        .iter_mut()
        .find(|it| it.tile == tile)
        .map_or(false, |it| it.ignite(now_ms, dwell_ms))
}

/// One slow tick: expire finished flames, then spread from every tile
/// that was consumed this tick.
pub fn burn_tick(items: &mut Vec<Item>, now_ms: u64, dwell_ms: u64) -> BurnReport {
    let mut report = BurnReport::default();

    // 1. Expire and remove, queueing the freed tiles.
    let mut spread_queue: Vec<TilePos> = Vec::new();
    for item in items.iter_mut() {
        if item.expire(now_ms) {
            spread_queue.push(item.tile);
        }
    }
    items.retain(|it| it.state != BurnState::Consumed);

    // 2. Drain the queue: one hop to every neighbor.
    for origin in spread_queue.drain(..) {
        report.consumed.push(origin);
        for n in origin.neighbors8() {
            if ignite_at(items, n, now_ms, dwell_ms) {
                report.ignited.push(n);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const DWELL: u64 = 500;

    fn line(n: i32) -> Vec<Item> {
        (0..n).map(|x| Item::new(TilePos::new(x, 0))).collect()
    }

    fn state_of(items: &[Item], tile: TilePos) -> BurnState {
        items.iter().find(|i| i.tile == tile).map_or(BurnState::Consumed, |i| i.state)
    }

    #[test]
    fn ignite_only_from_unburnt() {
        let mut it = Item::new(TilePos::new(0, 0));
        assert!(it.ignite(0, DWELL));
        assert_eq!(it.state, BurnState::Burning { expires_ms: 500 });
        // Already burning: timer is not refreshed.
        assert!(!it.ignite(200, DWELL));
        assert_eq!(it.state, BurnState::Burning { expires_ms: 500 });
        assert!(it.expire(500));
        assert!(!it.ignite(600, DWELL));
        assert_eq!(it.state, BurnState::Consumed);
    }

    #[test]
    fn flame_survives_until_dwell_elapses() {
        let mut items = line(1);
        ignite_at(&mut items, TilePos::new(0, 0), 0, DWELL);
        assert!(burn_tick(&mut items, 450, DWELL).consumed.is_empty());
        assert_eq!(items.len(), 1);
        let r = burn_tick(&mut items, 500, DWELL);
        assert_eq!(r.consumed, vec![TilePos::new(0, 0)]);
        assert!(items.is_empty());
    }

    #[test]
    fn cascade_takes_exactly_one_tick_per_item() {
        for n in 1..=6 {
            let mut items = line(n);
            ignite_at(&mut items, TilePos::new(0, 0), 0, DWELL);
            let mut now = 0;
            for tick in 1..=n {
                now += DWELL;
                burn_tick(&mut items, now, DWELL);
                if tick < n {
                    assert!(!items.is_empty(), "n={n}: everything gone after {tick} ticks");
                }
            }
            assert!(items.is_empty(), "n={n}: items left after {n} ticks");
        }
    }

    #[test]
    fn spread_reaches_diagonals() {
        let mut items = vec![Item::new(TilePos::new(0, 0)), Item::new(TilePos::new(1, 1))];
        ignite_at(&mut items, TilePos::new(0, 0), 0, DWELL);
        let r = burn_tick(&mut items, DWELL, DWELL);
        assert_eq!(r.ignited, vec![TilePos::new(1, 1)]);
    }

    #[test]
    fn gap_stops_the_fire() {
        let mut items = vec![Item::new(TilePos::new(0, 0)), Item::new(TilePos::new(2, 0))];
        ignite_at(&mut items, TilePos::new(0, 0), 0, DWELL);
        let r = burn_tick(&mut items, DWELL, DWELL);
        assert!(r.ignited.is_empty());
        assert_eq!(state_of(&items, TilePos::new(2, 0)), BurnState::Unburnt);
    }

    #[test]
    fn burn_state_never_regresses() {
        // 3x3 block lit in a corner, ticked at uneven intervals.
        let mut items: Vec<Item> = (0..3)
            .flat_map(|y| (0..3).map(move |x| Item::new(TilePos::new(x, y))))
            .collect();
        let tiles: Vec<TilePos> = items.iter().map(|i| i.tile).collect();
        ignite_at(&mut items, TilePos::new(0, 0), 0, DWELL);

        let mut last: HashMap<TilePos, u8> = tiles.iter().map(|t| (*t, 0)).collect();
        let mut now = 0;
        for step in [50, 450, 10, 500, 300, 300, 700, 500, 500] {
            now += step;
            burn_tick(&mut items, now, DWELL);
            for t in &tiles {
                let rank = state_of(&items, *t).rank();
                assert!(rank >= last[t], "{t:?} went backwards");
                last.insert(*t, rank);
            }
        }
        assert!(items.is_empty());
    }
}
