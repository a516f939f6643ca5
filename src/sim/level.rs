//! Level data provider and level lifecycle.
//!
//! ## Sources (priority order):
//!   1. `levels/` directory (individual `.txt` files, sorted by file name)
//!   2. Built-in embedded levels
//!
//! ## Level format (`.txt`):
//!   ```text
//!   # Level Name
//!   @ 1 -> 2:5        portal 1 leads to level 2, portal 5
//!   @allow 12         placement allowance override
//!   <map rows>
//!   ```
//!
//! ## Tile legend:
//!   '#' = Solid          '.' or ' ' = Walkable
//!   'P' = Player spawn   'B' = Berry
//!   'E' = Enemy spawn    'o' = Pebble
//!   '0'-'9' = Portal with that id (needs an `@` target line)
//!
//! Every marker sits on a Walkable tile. Rows are padded with Walkable to
//! the widest row. A level without 'P' spawns at `DEFAULT_SPAWN`, or at
//! the first Walkable tile in reading order when that one is blocked. A
//! level with no Walkable tile at all is rejected.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::config::GameConfig;
use crate::domain::entity::{Actor, Berry, Enemy, Portal, PortalLink};
use crate::domain::grid::Grid;
use crate::domain::pebble::Pebble;
use crate::domain::tile::{Tile, TilePos};
use crate::error::LevelError;
use crate::sim::portal::PortalGuard;
use crate::sim::world::WorldState;

/// Preferred spawn for a level without 'P'.
pub const DEFAULT_SPAWN: TilePos = TilePos::new(2, 2);

/// One parsed level: tile grid plus entity placement lists.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelDef {
    pub name: String,
    pub grid: Grid,
    pub spawn: TilePos,
    pub portals: Vec<Portal>,
    pub berries: Vec<Berry>,
    pub enemies: Vec<TilePos>,
    pub pebbles: Vec<TilePos>,
    pub allowance: Option<u32>,
}

/// How the actor arrives in a level.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Entry {
    /// The level's spawn point, guard disarmed.
    Spawn,
    /// On the portal with this id, guard armed against it.
    Portal(u32),
}

/// All levels available to a run.
#[derive(Clone, Debug, Default)]
pub struct LevelSet {
    levels: Vec<LevelDef>,
}

impl LevelSet {
    pub fn new(levels: Vec<LevelDef>) -> Self {
        LevelSet { levels }
    }

    /// `levels_dir` if it holds any valid level, else the embedded set.
    pub fn load(config: &GameConfig) -> Self {
        let dir = &config.levels_dir;
        if dir.is_dir() {
            match load_from_directory(dir) {
                Ok(levels) if !levels.is_empty() => {
                    info!(dir = %dir.display(), count = levels.len(), "levels loaded from directory");
                    return LevelSet::new(levels);
                }
                Ok(_) => warn!(dir = %dir.display(), "no usable levels in directory, using built-in"),
                Err(e) => warn!(error = %e, "level directory unreadable, using built-in"),
            }
        }
        LevelSet::embedded()
    }

    pub fn embedded() -> Self {
        let levels = EMBEDDED_LEVELS
            .iter()
            .filter_map(|text| match parse_level(text) {
                Ok(def) => Some(def),
                Err(e) => {
                    warn!(error = %e, "skipping built-in level");
                    None
                }
            })
            .collect();
        LevelSet::new(levels)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LevelDef> {
        self.levels.get(index)
    }
}

// ══════════════════════════════════════════════════════════════
// Lifecycle
// ══════════════════════════════════════════════════════════════

/// Make level `index` active, replacing every population wholesale.
///
/// Inventory carries over; placed items do not. An invalid index leaves
/// the world untouched. A portal entry whose target portal id does not
/// exist in the level falls back to the level's own spawn (its 'P', or the
/// parser's fallback), with the guard disarmed.
pub fn enter_level(world: &mut WorldState, index: usize, entry: Entry) -> Result<(), LevelError> {
    let def = world.levels.get(index).ok_or(LevelError::UnknownLevel {
        index,
        count: world.levels.len(),
    })?;

    let (spawn, guard) = match entry {
        Entry::Spawn => (def.spawn, PortalGuard::Armed),
        Entry::Portal(id) => match def.portals.iter().find(|p| p.id == id) {
            Some(p) => (p.tile, PortalGuard::JustTeleported { portal: id, tile: p.tile }),
            None => {
                warn!(level = index, portal = id, "portal target missing, using level spawn");
                (def.spawn, PortalGuard::Armed)
            }
        },
    };

    world.grid = def.grid.clone();
    world.player = Actor::at_tile(spawn);
    world.portal_guard = guard;
    world.items.clear();
    world.pebbles = def.pebbles.iter().map(|t| Pebble::new(*t)).collect();
    world.enemies = def.enemies.iter().map(|t| Enemy::at_tile(*t)).collect();
    world.portals = def.portals.clone();
    world.berries = def.berries.clone();
    world.allowance = def.allowance.unwrap_or(world.tuning.placement_allowance);
    world.level_name = def.name.clone();
    world.current_level = index;
    world.entry = entry;
    world.inventory_at_entry = world.inventory.clone();

    info!(level = index, name = %world.level_name, ?entry, "level entered");
    Ok(())
}

/// Death reset: reload the current level from scratch the same way it was
/// entered, with the inventory as it was on entry.
pub fn restart_level(world: &mut WorldState) -> Result<(), LevelError> {
    world.inventory = world.inventory_at_entry.clone();
    enter_level(world, world.current_level, world.entry)
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content.
pub fn parse_level(content: &str) -> Result<LevelDef, LevelError> {
    let mut name = String::new();
    let mut allowance = None;
    let mut targets: HashMap<u32, PortalLink> = HashMap::new();
    let mut rows: Vec<(usize, &str)> = vec![];

    for (n, line) in content.lines().enumerate() {
        let line_no = n + 1;
        let line = line.trim_end();
        if rows.is_empty() && name.is_empty() && line.starts_with("# ") {
            name = line[2..].trim().to_string();
        } else if let Some(rest) = line.strip_prefix("@allow") {
            let n = rest.trim().parse::<u32>()
                .map_err(|_| parse_err(&name, line_no, "bad @allow value"))?;
            allowance = Some(n);
        } else if let Some(rest) = line.strip_prefix("@ ") {
            let (id, link) = parse_portal_target(rest)
                .ok_or_else(|| parse_err(&name, line_no, "expected '@ <id> -> <level>:<portal>'"))?;
            targets.insert(id, link);
        } else if !(rows.is_empty() && line.is_empty()) {
            rows.push((line_no, line));
        }
    }

    while rows.last().map_or(false, |(_, r)| r.is_empty()) {
        rows.pop();
    }
    if name.is_empty() {
        name = "Unnamed Level".to_string();
    }
    if rows.is_empty() {
        return Err(parse_err(&name, 0, "no map rows"));
    }

    let mut tiles = Vec::with_capacity(rows.len());
    let mut spawn = None;
    let mut portals: Vec<Portal> = vec![];
    let mut berries = vec![];
    let mut enemies = vec![];
    let mut pebbles = vec![];

    for (y, (line_no, row)) in rows.iter().enumerate() {
        let mut tile_row = Vec::with_capacity(row.len());
        for (x, ch) in row.chars().enumerate() {
            let pos = TilePos::new(x as i32, y as i32);
            let tile = match ch {
                '#' => Tile::Solid,
                '.' | ' ' => Tile::Walkable,
                'P' => {
                    spawn = Some(pos);
                    Tile::Walkable
                }
                'B' => {
                    berries.push(Berry { id: berries.len() as u32, tile: pos });
                    Tile::Walkable
                }
                'E' => {
                    enemies.push(pos);
                    Tile::Walkable
                }
                'o' => {
                    pebbles.push(pos);
                    Tile::Walkable
                }
                d if d.is_ascii_digit() => {
                    let id = d as u32 - '0' as u32;
                    if portals.iter().any(|p| p.id == id) {
                        return Err(parse_err(&name, *line_no, &format!("duplicate portal {id}")));
                    }
                    let target = targets.get(&id).copied().ok_or_else(|| {
                        parse_err(&name, *line_no, &format!("portal {id} has no @ target line"))
                    })?;
                    portals.push(Portal { id, tile: pos, target });
                    Tile::Walkable
                }
                other => {
                    return Err(parse_err(&name, *line_no, &format!("unknown tile '{other}'")));
                }
            };
            tile_row.push(tile);
        }
        tiles.push(tile_row);
    }

    let grid = Grid::new(tiles);
    let spawn = match spawn {
        Some(pos) => pos,
        None => fallback_spawn(&grid)
            .ok_or_else(|| parse_err(&name, 0, "no walkable tile to spawn on"))?,
    };

    Ok(LevelDef {
        name,
        grid,
        spawn,
        portals,
        berries,
        enemies,
        pebbles,
        allowance,
    })
}

/// `DEFAULT_SPAWN` if it is Walkable, else the first Walkable tile by row.
fn fallback_spawn(grid: &Grid) -> Option<TilePos> {
    if grid.is_walkable(DEFAULT_SPAWN) {
        return Some(DEFAULT_SPAWN);
    }
    (0..grid.height() as i32)
        .flat_map(|y| (0..grid.width() as i32).map(move |x| TilePos::new(x, y)))
        .find(|&pos| grid.is_walkable(pos))
}

/// `1 -> 2:5` => (1, level 2 portal 5)
fn parse_portal_target(s: &str) -> Option<(u32, PortalLink)> {
    let (id, target) = s.split_once("->")?;
    let (level, portal) = target.split_once(':')?;
    Some((
        id.trim().parse().ok()?,
        PortalLink {
            level: level.trim().parse().ok()?,
            portal: portal.trim().parse().ok()?,
        },
    ))
}

fn parse_err(name: &str, line: usize, message: &str) -> LevelError {
    LevelError::Parse {
        name: name.to_string(),
        line,
        message: message.to_string(),
    }
}

fn load_from_directory(dir: &Path) -> Result<Vec<LevelDef>, LevelError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LevelError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "txt"))
        .collect();
    paths.sort();

    let mut levels = vec![];
    for path in paths {
        let content = std::fs::read_to_string(&path).map_err(|source| LevelError::Io {
            path: path.clone(),
            source,
        })?;
        match parse_level(&content) {
            Ok(def) => levels.push(def),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping level file"),
        }
    }
    Ok(levels)
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

const EMBEDDED_LEVELS: &[&str] = &[
    "# Ember Hall
@ 1 -> 1:1
@allow 20
#########################
#.......#...............#
#.P.....#.............1.#
#..###..#...........B...#
#..#....................#
#..#.......####.........#
#....B.....#B.#.........#
#..........#..#.........#
#####..............o....#
#.......................#
#.....o.........#.......#
#...............#.......#
#...............#.......#
#..#######..............#
#.......................#
#.........o.........E...#
#.......................#
#.......................#
#########################
",
    "# Pebble Maze
@ 1 -> 0:1
@ 2 -> 2:1
@allow 15
#########################
#1.....................E#
#.#####.#######.#######.#
#P#......B....#.......#.#
#.#.#########.#.#####.#.#
#...#.......#...#..B#...#
###.#.#####.#####.#.###.#
#...#.#...#.......#.....#
#.###.#.#.#########.#####
#.....#.#.E.............#
#######.###############.#
#...........o...........#
#.###########.#########.#
#.#.........#.#.......#.#
#.#.#######.#.#.#####.#.#
#...#.....#B..#.#...#...#
###.#.###.#####.#.#.###.#
#....o#................2#
#########################
",
    "# Ashen Garden
@ 1 -> 1:2
@allow 12
#########################
#.......................#
#...........E...........#
#...####.........####...#
#...#...............#...#
#...#.B...........o.#...#
#.......................#
#.........#####.........#
#.........#B..#.........#
#.........#...#.......E.#
#.........##o##.........#
#.......................#
#...#.o.............#...#
#...#.............B.#...#
#...####.........####...#
#.......................#
#.1.....................#
#.......................#
#########################
",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_levels_all_parse() {
        let set = LevelSet::embedded();
        assert_eq!(set.len(), EMBEDDED_LEVELS.len());
        for i in 0..set.len() {
            let def = set.get(i).unwrap();
            assert_eq!((def.grid.width(), def.grid.height()), (25, 19), "{}", def.name);
            for p in &def.portals {
                let target = set.get(p.target.level).expect("target level exists");
                assert!(
                    target.portals.iter().any(|q| q.id == p.target.portal),
                    "{} portal {} dangles", def.name, p.id
                );
            }
        }
    }

    #[test]
    fn parses_markers_and_metadata() {
        let def = parse_level("# Tiny\n@ 3 -> 1:4\n@allow 7\n#####\n#P3B#\n#Eo.#\n#####\n").unwrap();
        assert_eq!(def.name, "Tiny");
        assert_eq!(def.spawn, TilePos::new(1, 1));
        assert_eq!(def.allowance, Some(7));
        assert_eq!(def.portals, vec![Portal {
            id: 3,
            tile: TilePos::new(2, 1),
            target: PortalLink { level: 1, portal: 4 },
        }]);
        assert_eq!(def.berries, vec![Berry { id: 0, tile: TilePos::new(3, 1) }]);
        assert_eq!(def.enemies, vec![TilePos::new(1, 2)]);
        assert_eq!(def.pebbles, vec![TilePos::new(2, 2)]);
        assert!(def.grid.is_walkable(TilePos::new(2, 1)));
        assert!(!def.grid.is_walkable(TilePos::new(0, 0)));
    }

    #[test]
    fn missing_spawn_uses_default() {
        let def = parse_level("....\n....\n....\n").unwrap();
        assert_eq!(def.spawn, DEFAULT_SPAWN);
        assert_eq!(def.name, "Unnamed Level");
    }

    #[test]
    fn blocked_default_spawn_falls_back_to_first_walkable() {
        let def = parse_level("# S\n#####\n#...#\n#####\n").unwrap();
        assert_eq!(def.spawn, TilePos::new(1, 1));
        assert!(def.grid.is_walkable(def.spawn));
    }

    #[test]
    fn out_of_bounds_default_spawn_falls_back() {
        let def = parse_level("#.\n").unwrap();
        assert_eq!(def.spawn, TilePos::new(1, 0));
    }

    #[test]
    fn level_without_walkable_tile_is_rejected() {
        let err = parse_level("# Rock\n###\n###\n").unwrap_err();
        assert!(matches!(err, LevelError::Parse { line: 0, .. }), "{err}");
    }

    #[test]
    fn map_row_starting_with_hash_is_not_a_name() {
        let def = parse_level("#P.#\n#..#\n").unwrap();
        assert_eq!(def.grid.height(), 2);
        assert_eq!(def.spawn, TilePos::new(1, 0));
    }

    #[test]
    fn portal_without_target_is_rejected() {
        let err = parse_level("# Bad\n.1.\n").unwrap_err();
        assert!(matches!(err, LevelError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn duplicate_portal_is_rejected() {
        assert!(parse_level("@ 1 -> 0:1\n.1.1\n").is_err());
    }

    #[test]
    fn unknown_tile_is_rejected() {
        assert!(parse_level("..x..\n").is_err());
    }
}
