//! A* over the static grid: 4-connected, unit step cost, Manhattan
//! heuristic.
//!
//! The open list is a flat `Vec` scanned for the lowest
//! `(f, h, y, x, insertion)` key, which makes tie-breaking deterministic.
//! Search stops after `max_expansions` closed nodes and reports no path.
//!
//! Only grid tiles are obstacles here. Pebbles are not consulted.

use super::grid::Grid;
use super::tile::TilePos;

/// Default expansion budget per search.
pub const MAX_EXPANSIONS: usize = 500;

#[derive(Clone, Copy, Debug)]
struct OpenNode {
    pos: TilePos,
    g: u32,
    h: u32,
    insertion: u64,
}

impl OpenNode {
    fn order_key(&self) -> (u32, u32, i32, i32, u64) {
        (self.g + self.h, self.h, self.pos.y, self.pos.x, self.insertion)
    }
}

/// Find a path from `start` to `goal`.
///
/// Returns the waypoints from `start` (exclusive) to `goal` (inclusive),
/// or `None` when the goal is Solid, out of bounds, equal to the start,
/// or not reached within `max_expansions`.
///
/// Only the grid is consulted. Pebbles are never obstacles here, whether
/// resting or sliding, and a sliding pebble's reserved destination tile
/// is as open as any other Walkable tile.
pub fn find_path(
    grid: &Grid,
    start: TilePos,
    goal: TilePos,
    max_expansions: usize,
) -> Option<Vec<TilePos>> {
    if !grid.in_bounds(start) || !grid.is_walkable(goal) || start == goal {
        return None;
    }

    let width = grid.width();
    let index_of = |p: TilePos| p.y as usize * width + p.x as usize;
    let node_count = width * grid.height();

    let mut closed = vec![false; node_count];
    let mut best_g = vec![u32::MAX; node_count];
    let mut parent: Vec<Option<TilePos>> = vec![None; node_count];
    let mut open: Vec<OpenNode> = Vec::new();
    let mut next_insertion = 0u64;
    let mut expansions = 0usize;

    best_g[index_of(start)] = 0;
    open.push(OpenNode { pos: start, g: 0, h: start.manhattan(goal), insertion: next_insertion });
    next_insertion += 1;

    while let Some(best) = pick_best(&open) {
        let current = open.swap_remove(best);
        let ci = index_of(current.pos);
        if closed[ci] {
            continue;
        }
        closed[ci] = true;

        if current.pos == goal {
            return Some(reconstruct(&parent, &index_of, start, goal));
        }

        expansions += 1;
        if expansions > max_expansions {
            return None;
        }

        for (dx, dy) in [(0, -1), (1, 0), (0, 1), (-1, 0)] {
            let next = current.pos.offset(dx, dy);
            if !grid.is_walkable(next) {
                continue;
            }
            let ni = index_of(next);
            if closed[ni] {
                continue;
            }
            let g = current.g + 1;
            if g >= best_g[ni] {
                continue;
            }
            best_g[ni] = g;
            parent[ni] = Some(current.pos);
            open.push(OpenNode { pos: next, g, h: next.manhattan(goal), insertion: next_insertion });
            next_insertion += 1;
        }
    }

    None
}

fn pick_best(open: &[OpenNode]) -> Option<usize> {
    open.iter()
        .enumerate()
        .min_by_key(|(_, n)| n.order_key())
        .map(|(i, _)| i)
}

fn reconstruct(
    parent: &[Option<TilePos>],
    index_of: impl Fn(TilePos) -> usize,
    start: TilePos,
    goal: TilePos,
) -> Vec<TilePos> {
    let mut path = vec![goal];
    let mut cursor = goal;
    while let Some(prev) = parent[index_of(cursor)] {
        if prev == start {
            break;
        }
        path.push(prev);
        cursor = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::grid_from;

    fn is_4_connected(start: TilePos, path: &[TilePos]) -> bool {
        let mut prev = start;
        for &p in path {
            if prev.manhattan(p) != 1 {
                return false;
            }
            prev = p;
        }
        true
    }

    #[test]
    fn open_2x2_room_takes_two_steps() {
        let g = grid_from(&["..", ".."]);
        let path = find_path(&g, TilePos::new(0, 0), TilePos::new(1, 1), MAX_EXPANSIONS)
            .expect("path");
        assert_eq!(path.len(), 2);
        assert_eq!(path.last(), Some(&TilePos::new(1, 1)));
        assert!(is_4_connected(TilePos::new(0, 0), &path));
    }

    #[test]
    fn start_is_excluded_goal_included() {
        let g = grid_from(&["...."]);
        let path = find_path(&g, TilePos::new(0, 0), TilePos::new(3, 0), MAX_EXPANSIONS).unwrap();
        assert_eq!(path, vec![TilePos::new(1, 0), TilePos::new(2, 0), TilePos::new(3, 0)]);
    }

    #[test]
    fn routes_around_wall() {
        let g = grid_from(&[
            ".....",
            ".###.",
            "...#.",
            ".#.#.",
            ".#...",
        ]);
        let start = TilePos::new(2, 2);
        let goal = TilePos::new(4, 4);
        let path = find_path(&g, start, goal, MAX_EXPANSIONS).expect("path");
        assert!(is_4_connected(start, &path));
        assert!(path.iter().all(|p| g.is_walkable(*p)));
        // Shortest is down through (2,3),(2,4),(3,4),(4,4).
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn failure_cases() {
        let g = grid_from(&[
            "..#..",
            "..#..",
            "..#..",
        ]);
        let a = TilePos::new(0, 0);
        // Solid goal.
        assert!(find_path(&g, a, TilePos::new(2, 1), MAX_EXPANSIONS).is_none());
        // Out of bounds.
        assert!(find_path(&g, a, TilePos::new(9, 0), MAX_EXPANSIONS).is_none());
        assert!(find_path(&g, a, TilePos::new(-1, 0), MAX_EXPANSIONS).is_none());
        // Same tile.
        assert!(find_path(&g, a, a, MAX_EXPANSIONS).is_none());
        // Walled off.
        assert!(find_path(&g, a, TilePos::new(4, 2), MAX_EXPANSIONS).is_none());
    }

    #[test]
    fn expansion_budget_bounds_the_search() {
        let row = ".".repeat(60);
        let g = grid_from(&[row.as_str()]);
        let start = TilePos::new(0, 0);
        let goal = TilePos::new(59, 0);
        assert!(find_path(&g, start, goal, 10).is_none());
        assert_eq!(find_path(&g, start, goal, 100).map(|p| p.len()), Some(59));
    }

    #[test]
    fn identical_queries_give_identical_paths() {
        let g = grid_from(&[
            ".....",
            ".....",
            "..#..",
            ".....",
            ".....",
        ]);
        let a = find_path(&g, TilePos::new(0, 2), TilePos::new(4, 2), MAX_EXPANSIONS);
        let b = find_path(&g, TilePos::new(0, 2), TilePos::new(4, 2), MAX_EXPANSIONS);
        assert!(a.is_some());
        assert_eq!(a, b);
    }
}
