//! Enemy controller: A* pursuit on a cooldown, moving in tile-to-tile strides.
//!
//! Per live enemy, every fast tick:
//!   1. **Replan**: every `recalc_ticks` ticks, when the cooldown hits 0,
//!      ask the pathfinder for a route to the actor's feet tile and reset
//!      the cooldown, success or not. A replan mid-stride starts from the stride's target tile so
//!      the new route picks up where the current hop ends.
//!   2. **Walk**: if not mid-stride, start a stride to the next waypoint
//!      and face along it. Strides advance by a fixed fraction per tick and
//!      snap to the waypoint on arrival.
//!
//! Proximity (fire kills, actor contact) is a Euclidean distance in tile
//! units between top-left positions, inclusive at the radius.

use super::entity::{Enemy, Stride};
use super::grid::Grid;
use super::pathfind;
use super::tile::{Dir, TilePos, TILE_SIZE};

#[derive(Clone, Copy, Debug)]
pub struct ChaseTuning {
    pub recalc_ticks: u32,
    pub step_per_tick: f32,
    pub max_expansions: usize,
}

const ARRIVE_EPSILON: f32 = 1e-4;

/// Advance one live enemy by one fast tick toward `goal`.
pub fn update_enemy(enemy: &mut Enemy, grid: &Grid, goal: TilePos, tuning: ChaseTuning) {
    if !enemy.alive {
        return;
    }

    if enemy.path.cooldown == 0 {
        let from = enemy.path.stride.map_or_else(|| enemy.tile(), |s| s.to);
        match pathfind::find_path(grid, from, goal, tuning.max_expansions) {
            Some(waypoints) => enemy.path.waypoints = waypoints,
            None => enemy.path.waypoints.clear(),
        }
        enemy.path.cursor = 0;
        // The requesting tick counts toward the wait.
        enemy.path.cooldown = tuning.recalc_ticks.saturating_sub(1);
    } else {
        enemy.path.cooldown -= 1;
    }

    if enemy.path.stride.is_none() {
        let Some(next) = enemy.path.next_waypoint() else {
            return;
        };
        let from = enemy.tile();
        if let Some(dir) = Dir::from_delta(next.x - from.x, next.y - from.y) {
            enemy.facing = dir;
        }
        enemy.path.cursor += 1;
        enemy.path.stride = Some(Stride { from, to: next, progress: 0.0 });
    }

    if let Some(stride) = enemy.path.stride.as_mut() {
        stride.progress = (stride.progress + tuning.step_per_tick).min(1.0);
        let (fx, fy) = stride.from.to_pixel();
        let (tx, ty) = stride.to.to_pixel();
        if stride.progress >= 1.0 - ARRIVE_EPSILON {
            enemy.x = tx;
            enemy.y = ty;
            enemy.path.stride = None;
        } else {
            enemy.x = fx + (tx - fx) * stride.progress;
            enemy.y = fy + (ty - fy) * stride.progress;
        }
    }
}

/// Are two top-left pixel positions within `radius_tiles` of each other?
/// Inclusive: exactly at the radius counts as within.
pub fn within_radius(ax: f32, ay: f32, bx: f32, by: f32, radius_tiles: f32) -> bool {
    (ax - bx).hypot(ay - by) / TILE_SIZE <= radius_tiles
}

/// Does any flame tile reach this enemy?
pub fn touched_by_fire(enemy: &Enemy, flames: &[TilePos], radius_tiles: f32) -> bool {
    flames.iter().any(|f| {
        let (fx, fy) = f.to_pixel();
        within_radius(enemy.x, enemy.y, fx, fy, radius_tiles)
    })
}
