//! Portal trigger and re-entry guard.
//!
//! ```text
//!   Armed ──arrive on portal P──▶ JustTeleported { P } ──feet leave P's tile──▶ Armed
//! ```
//!
//! While guarded no portal can fire, so an actor spawned on a portal never
//! bounces straight back. Once the guard clears, checks resume in the
//! same tick.

use tracing::{info, warn};

use crate::domain::entity::{Portal, PortalLink};
use crate::domain::tile::TilePos;

use super::event::GameEvent;
use super::level::{self, Entry};
use super::world::WorldState;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum PortalGuard {
    #[default]
    Armed,
    JustTeleported { portal: u32, tile: TilePos },
}

impl PortalGuard {
    /// Clear the guard once `feet` is off the guarded tile.
    /// Returns whether portal checks may run.
    pub fn update(&mut self, feet: TilePos) -> bool {
        if let PortalGuard::JustTeleported { tile, .. } = *self {
            if feet == tile {
                return false;
            }
            *self = PortalGuard::Armed;
        }
        true
    }
}

/// First portal (in population order) whose tile is `feet`.
pub fn portal_at(portals: &[Portal], feet: TilePos) -> Option<&Portal> {
    portals.iter().find(|p| p.tile == feet)
}

/// Run the guard and, if armed and standing on a portal, transition.
/// Returns true when a level change happened this tick.
pub fn check_portals(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let feet = world.player.feet_tile();
    if !world.portal_guard.update(feet) {
        return false;
    }
    let Some(portal) = portal_at(&world.portals, feet) else {
        return false;
    };
    let (source_id, source_tile, PortalLink { level: to_level, portal: to_portal }) =
        (portal.id, portal.tile, portal.target);

    match level::enter_level(world, to_level, Entry::Portal(to_portal)) {
        Ok(()) => {
            info!(portal = source_id, to_level, to_portal, "portal transition");
            events.push(GameEvent::PortalUsed { portal: source_id, to_level, to_portal });
            events.push(GameEvent::LevelEntered { level: to_level });
            true
        }
        Err(e) => {
            warn!(portal = source_id, error = %e, "portal target unusable");
            // Treat the source like a fresh arrival so the failure is
            // reported once rather than every tick.
            world.portal_guard = PortalGuard::JustTeleported { portal: source_id, tile: source_tile };
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TimingConfig, TuningConfig};
    use crate::domain::tile::TILE_SIZE;
    use crate::sim::level::{parse_level, LevelSet};

    /// A: portal 2 at (1,1) -> (B, 5). B: portal 5 at (3,1) -> (A, 2).
    fn two_rooms() -> WorldState {
        let a = parse_level("# A\n@ 2 -> 1:5\n#####\n#2..#\n#P..#\n#####\n").unwrap();
        let b = parse_level("# B\n@ 5 -> 0:2\n#####\n#..5#\n#...#\n#####\n").unwrap();
        WorldState::new(LevelSet::new(vec![a, b]), TimingConfig::default(), TuningConfig::default()).unwrap()
    }

    fn place_on(world: &mut WorldState, tile: TilePos) {
        (world.player.x, world.player.y) = tile.to_pixel();
    }

    #[test]
    fn guard_holds_while_on_tile_then_clears() {
        let tile = TilePos::new(3, 3);
        let mut g = PortalGuard::JustTeleported { portal: 1, tile };
        assert!(!g.update(tile));
        assert!(!g.update(tile));
        assert!(g.update(TilePos::new(3, 4)));
        assert_eq!(g, PortalGuard::Armed);
        assert!(g.update(tile));
    }

    #[test]
    fn round_trip_lands_guarded_without_looping() {
        let mut w = two_rooms();
        let mut events = vec![];

        place_on(&mut w, TilePos::new(1, 1));
        assert!(check_portals(&mut w, &mut events));
        assert_eq!(w.current_level, 1);
        assert_eq!(w.player.feet_tile(), TilePos::new(3, 1));
        assert_eq!(w.portal_guard, PortalGuard::JustTeleported { portal: 5, tile: TilePos::new(3, 1) });

        // Standing still on the arrival portal does nothing.
        for _ in 0..10 {
            assert!(!check_portals(&mut w, &mut events));
        }
        assert_eq!(w.current_level, 1);

        // Use B's portal 5 straight back to A.
        w.portal_guard = PortalGuard::Armed;
        assert!(check_portals(&mut w, &mut events));
        assert_eq!(w.current_level, 0);
        assert_eq!(w.player.feet_tile(), TilePos::new(1, 1));
        assert_eq!(w.portal_guard, PortalGuard::JustTeleported { portal: 2, tile: TilePos::new(1, 1) });
        assert!(!check_portals(&mut w, &mut events));
        assert_eq!(w.current_level, 0);

        assert!(events.contains(&GameEvent::PortalUsed { portal: 2, to_level: 1, to_portal: 5 }));
        assert!(events.contains(&GameEvent::PortalUsed { portal: 5, to_level: 0, to_portal: 2 }));
    }

    #[test]
    fn stepping_off_and_back_on_fires() {
        let mut w = two_rooms();
        let mut events = vec![];
        place_on(&mut w, TilePos::new(1, 1));
        check_portals(&mut w, &mut events);
        assert_eq!(w.current_level, 1);

        place_on(&mut w, TilePos::new(2, 1));
        assert!(!check_portals(&mut w, &mut events));
        assert_eq!(w.portal_guard, PortalGuard::Armed);

        place_on(&mut w, TilePos::new(3, 1));
        assert!(check_portals(&mut w, &mut events));
        assert_eq!(w.current_level, 0);
    }

    #[test]
    fn trigger_uses_feet_not_head() {
        let mut w = two_rooms();
        let mut events = vec![];
        // Head over the portal at (1,1), feet in row 2.
        place_on(&mut w, TilePos::new(1, 1));
        w.player.y += TILE_SIZE / 2.0;
        assert!(!check_portals(&mut w, &mut events));
        assert_eq!(w.current_level, 0);
    }

    #[test]
    fn invalid_target_level_is_a_logged_no_op() {
        let a = parse_level("# A\n@ 1 -> 9:1\n####\n#1P#\n####\n").unwrap();
        let mut w = WorldState::new(LevelSet::new(vec![a]), TimingConfig::default(), TuningConfig::default()).unwrap();
        let mut events = vec![];
        place_on(&mut w, TilePos::new(1, 1));
        assert!(!check_portals(&mut w, &mut events));
        assert_eq!(w.current_level, 0);
        assert_eq!(w.player.feet_tile(), TilePos::new(1, 1));
        assert!(events.is_empty());
        assert!(matches!(w.portal_guard, PortalGuard::JustTeleported { portal: 1, .. }));
    }

    #[test]
    fn dangling_target_portal_uses_default_spawn_disarmed() {
        let a = parse_level("# A\n@ 1 -> 1:7\n#####\n#1.P#\n#####\n").unwrap();
        let b = parse_level("# B\n.....\n.....\n.....\n").unwrap();
        let mut w = WorldState::new(LevelSet::new(vec![a, b]), TimingConfig::default(), TuningConfig::default()).unwrap();
        let mut events = vec![];
        place_on(&mut w, TilePos::new(1, 1));
        assert!(check_portals(&mut w, &mut events));
        assert_eq!(w.current_level, 1);
        assert_eq!(w.player.feet_tile(), level::DEFAULT_SPAWN);
        assert_eq!(w.portal_guard, PortalGuard::Armed);
    }

    #[test]
    fn dangling_target_lands_on_walkable_spawn_when_default_is_wall() {
        let a = parse_level("# A\n@ 1 -> 1:7\n#####\n#1.P#\n#####\n").unwrap();
        let b = parse_level("# S\n#####\n#...#\n#####\n").unwrap();
        let mut w = WorldState::new(LevelSet::new(vec![a, b]), TimingConfig::default(), TuningConfig::default()).unwrap();
        let mut events = vec![];
        place_on(&mut w, TilePos::new(1, 1));
        assert!(check_portals(&mut w, &mut events));
        assert_eq!(w.current_level, 1);
        assert_eq!(w.player.feet_tile(), TilePos::new(1, 1));
        assert!(w.grid.is_walkable(w.player.feet_tile()));
    }

    #[test]
    fn first_match_wins() {
        let portals = vec![
            Portal { id: 1, tile: TilePos::new(0, 0), target: PortalLink { level: 0, portal: 1 } },
            Portal { id: 2, tile: TilePos::new(1, 0), target: PortalLink { level: 0, portal: 1 } },
        ];
        assert_eq!(portal_at(&portals, TilePos::new(1, 0)).map(|p| p.id), Some(2));
        assert!(portal_at(&portals, TilePos::new(2, 0)).is_none());
    }
}
