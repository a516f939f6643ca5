//! Collision resolver: pixel-space movement requests in, per-axis
//! allow/deny out.
//!
//! ## Sampling
//!
//! Only the four corners of the feet band are tested:
//!
//! ```text
//!   (x+1, y+24) ─────── (x+31, y+24)
//!        │   feet band      │
//!   (x+1, y+31) ─────── (x+31, y+31)
//! ```
//!
//! ## Axis separation
//!
//! X is resolved first with the current Y. Y is then resolved from the
//! X the first step produced, so a diagonal into a wall still slides
//! along it on the free axis, and a diagonal into an outside corner
//! cannot clip through it.
//!
//! A sample is blocked by: leaving the grid, a Solid tile, or a tile a
//! pebble occupies (see `Pebble::occupied_tile`).

use super::entity::{FEET_INSET, FEET_TOP};
use super::grid::Grid;
use super::pebble::Pebble;
use super::tile::{Dir, TilePos, TILE_SIZE};

/// Why a single sample point is blocked.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Blocker {
    Bounds,
    Solid,
    Pebble(usize),
}

/// Outcome of one axis of a move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AxisOutcome {
    /// No movement was requested on this axis.
    Idle,
    Moved,
    /// Blocked by the grid (wall or bounds).
    Blocked,
    /// Blocked only by a pebble: the push candidate.
    Pebble(usize),
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MoveResolution {
    pub x: f32,
    pub y: f32,
    pub x_axis: AxisOutcome,
    pub y_axis: AxisOutcome,
}

impl MoveResolution {
    /// Pebble blocking the requested move, with the push direction.
    /// X is reported before Y.
    pub fn pushed_pebble(&self, dx: f32, dy: f32) -> Option<(usize, Dir)> {
        if let AxisOutcome::Pebble(i) = self.x_axis {
            return Some((i, if dx < 0.0 { Dir::Left } else { Dir::Right }));
        }
        if let AxisOutcome::Pebble(i) = self.y_axis {
            return Some((i, if dy < 0.0 { Dir::Up } else { Dir::Down }));
        }
        None
    }
}

/// What blocks the pixel point `(px, py)`, if anything.
pub fn probe(grid: &Grid, pebbles: &[Pebble], px: f32, py: f32) -> Option<Blocker> {
    let tile = TilePos::from_pixel(px, py);
    if !grid.in_bounds(tile) {
        return Some(Blocker::Bounds);
    }
    if grid.tile_at(tile).is_solid() {
        return Some(Blocker::Solid);
    }
    pebbles
        .iter()
        .position(|p| p.occupied_tile() == tile)
        .map(Blocker::Pebble)
}

/// Is the pixel point blocked?
pub fn check_collision(grid: &Grid, pebbles: &[Pebble], px: f32, py: f32) -> bool {
    probe(grid, pebbles, px, py).is_some()
}

/// The four feet-band sample points for a sprite at `(x, y)`.
pub fn feet_samples(x: f32, y: f32) -> [(f32, f32); 4] {
    let left = x + FEET_INSET;
    let right = x + TILE_SIZE - FEET_INSET;
    let top = y + FEET_TOP;
    let bottom = y + TILE_SIZE - FEET_INSET;
    [(left, top), (left, bottom), (right, top), (right, bottom)]
}

/// Classify a sprite position: free, wall-blocked, or pebble-blocked.
/// A wall anywhere wins over a pebble, so a push only registers when the
/// pebble is the sole obstacle.
pub fn probe_feet(grid: &Grid, pebbles: &[Pebble], x: f32, y: f32) -> AxisOutcome {
    let mut pebble = None;
    for (px, py) in feet_samples(x, y) {
        match probe(grid, pebbles, px, py) {
            None => {}
            Some(Blocker::Bounds) | Some(Blocker::Solid) => return AxisOutcome::Blocked,
            Some(Blocker::Pebble(i)) => {
                pebble.get_or_insert(i);
            }
        }
    }
    match pebble {
        Some(i) => AxisOutcome::Pebble(i),
        None => AxisOutcome::Moved,
    }
}

/// Resolve a requested displacement `(dx, dy)` from `(x, y)`.
/// Pure: the caller applies the returned position.
pub fn resolve_move(
    grid: &Grid,
    pebbles: &[Pebble],
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
) -> MoveResolution {
    let mut res = MoveResolution {
        x,
        y,
        x_axis: AxisOutcome::Idle,
        y_axis: AxisOutcome::Idle,
    };

    if dx != 0.0 {
        res.x_axis = probe_feet(grid, pebbles, x + dx, y);
        if res.x_axis == AxisOutcome::Moved {
            res.x = x + dx;
        }
    }

    if dy != 0.0 {
        res.y_axis = probe_feet(grid, pebbles, res.x, y + dy);
        if res.y_axis == AxisOutcome::Moved {
            res.y = y + dy;
        }
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::grid_from;
    use crate::domain::pebble::Motion;

    fn room() -> Grid {
        grid_from(&[
            "#####",
            "#...#",
            "#...#",
            "#...#",
            "#####",
        ])
    }

    #[test]
    fn everything_outside_the_grid_is_blocked() {
        let g = grid_from(&["...", "..."]);
        let outside = [(-1.0, 5.0), (5.0, -0.1), (96.0, 5.0), (5.0, 64.0), (1000.0, 1000.0)];
        for (px, py) in outside {
            assert!(check_collision(&g, &[], px, py), "({px}, {py}) should be blocked");
            assert_eq!(probe(&g, &[], px, py), Some(Blocker::Bounds));
        }
        assert!(!check_collision(&g, &[], 95.0, 63.0));
    }

    #[test]
    fn solid_tile_blocks() {
        let g = room();
        assert_eq!(probe(&g, &[], 5.0, 5.0), Some(Blocker::Solid));
        assert_eq!(probe(&g, &[], 40.0, 40.0), None);
    }

    #[test]
    fn pebble_tile_blocks() {
        let g = room();
        let pebbles = vec![Pebble::new(TilePos::new(2, 2))];
        assert_eq!(probe(&g, &pebbles, 70.0, 70.0), Some(Blocker::Pebble(0)));
    }

    #[test]
    fn free_move_applies_both_axes() {
        let g = room();
        let r = resolve_move(&g, &[], 48.0, 48.0, 2.0, 2.0);
        assert_eq!((r.x, r.y), (50.0, 50.0));
        assert_eq!(r.x_axis, AxisOutcome::Moved);
        assert_eq!(r.y_axis, AxisOutcome::Moved);
    }

    #[test]
    fn diagonal_into_wall_still_slides_on_free_axis() {
        let g = room();
        // Flush against the right wall of the room (tile 3 is the last floor column).
        let x = 96.0;
        let y = 48.0;
        let r = resolve_move(&g, &[], x, y, 2.0, 2.0);
        assert_eq!(r.x_axis, AxisOutcome::Blocked);
        assert_eq!(r.x, x);
        assert_eq!(r.y_axis, AxisOutcome::Moved);
        assert_eq!(r.y, y + 2.0);
    }

    #[test]
    fn diagonal_into_floor_still_slides_horizontally() {
        let g = room();
        // Feet band flush with the bottom wall.
        let r = resolve_move(&g, &[], 48.0, 96.0, -2.0, 2.0);
        assert_eq!(r.y_axis, AxisOutcome::Blocked);
        assert_eq!(r.x_axis, AxisOutcome::Moved);
        assert_eq!((r.x, r.y), (46.0, 96.0));
    }

    #[test]
    fn head_may_overlap_wall_above() {
        let g = room();
        // Sprite top reaches into the top wall row; feet are in row 1.
        let r = resolve_move(&g, &[], 48.0, 32.0, 0.0, -20.0);
        assert_eq!(r.y_axis, AxisOutcome::Moved);
        assert_eq!(r.y, 12.0);
    }

    #[test]
    fn pebble_is_reported_as_push_candidate() {
        let g = room();
        let pebbles = vec![Pebble::new(TilePos::new(2, 2))];
        let r = resolve_move(&g, &pebbles, 32.0, 64.0, 2.0, 0.0);
        assert_eq!(r.x_axis, AxisOutcome::Pebble(0));
        assert_eq!(r.x, 32.0);
        assert_eq!(r.pushed_pebble(2.0, 0.0), Some((0, Dir::Right)));
    }

    #[test]
    fn sliding_pebble_blocks_its_destination_not_its_source() {
        let g = room();
        let from = TilePos::new(2, 2);
        let to = TilePos::new(3, 2);
        let mut pebble = Pebble::new(from);
        pebble.motion = Motion::Sliding { from, to, progress: 0.0 };
        let pebbles = vec![pebble];

        assert_eq!(probe(&g, &pebbles, 110.0, 70.0), Some(Blocker::Pebble(0)));
        assert_eq!(probe(&g, &pebbles, 70.0, 70.0), None);

        // Walking right from (1,2) into the vacated source tile.
        let r = resolve_move(&g, &pebbles, 32.0, 64.0, 2.0, 0.0);
        assert_eq!(r.x_axis, AxisOutcome::Moved);
        assert_eq!(r.x, 34.0);
    }

    #[test]
    fn wall_outranks_pebble() {
        let g = grid_from(&[
            "....",
            "...#",
        ]);
        let pebbles = vec![Pebble::new(TilePos::new(3, 0))];
        // Right edge straddles the pebble (row 0) and the wall (row 1).
        assert_eq!(probe_feet(&g, &pebbles, 66.0, 5.0), AxisOutcome::Blocked);
    }
}
