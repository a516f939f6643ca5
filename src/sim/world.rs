/// WorldState: everything a running game mutates.
///
/// ## Populations
///
/// One owned `Vec` per entity kind, indexed by position. Per-enemy path
/// state lives inside `Enemy`, so there is no side table to keep in sync.
/// All populations are replaced wholesale by `level::enter_level`.
///
/// ## Clocks
///
/// Two logical clocks, advanced by fixed steps:
///   - `move_clock_ms` by `fast_tick_ms` each fast tick (pebble charges)
///   - `fire_clock_ms` by `slow_tick_ms` each slow tick (burn expiry)

use crate::config::{TimingConfig, TuningConfig};
use crate::domain::ai::ChaseTuning;
use crate::domain::entity::{Actor, Berry, Enemy, Inventory, Portal};
use crate::domain::fire::Item;
use crate::domain::grid::Grid;
use crate::domain::pebble::{Pebble, PebbleTuning};
use crate::domain::tile::{Dir, TilePos};
use crate::error::LevelError;

use super::level::{self, Entry, LevelSet};
use super::portal::PortalGuard;

/// What a click on a tile does.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Mode {
    #[default]
    Place,
    Burn,
}

impl Mode {
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Place => Mode::Burn,
            Mode::Burn => Mode::Place,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Place => "PLACE",
            Mode::Burn => "BURN",
        }
    }
}

/// Latched state of the four directional keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub fn set(&mut self, dir: Dir, held: bool) {
        match dir {
            Dir::Up => self.up = held,
            Dir::Down => self.down = held,
            Dir::Left => self.left = held,
            Dir::Right => self.right = held,
        }
    }

    pub fn is_held(&self, dir: Dir) -> bool {
        match dir {
            Dir::Up => self.up,
            Dir::Down => self.down,
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    /// Pixel displacement for this tick. Opposite keys cancel.
    pub fn velocity(&self, speed: f32) -> (f32, f32) {
        let axis = |neg: bool, pos: bool| match (neg, pos) {
            (true, false) => -speed,
            (false, true) => speed,
            _ => 0.0,
        };
        (axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// HUD query result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hud {
    pub level: usize,
    pub level_name: String,
    pub allowance: u32,
    pub mode: Mode,
    pub berries: u32,
}

pub struct WorldState {
    pub levels: LevelSet,
    pub grid: Grid,

    // ── Populations ──
    pub player: Actor,
    pub items: Vec<Item>,
    pub pebbles: Vec<Pebble>,
    pub enemies: Vec<Enemy>,
    pub portals: Vec<Portal>,
    pub berries: Vec<Berry>,

    // ── Player-owned state ──
    pub inventory: Inventory,
    pub inventory_at_entry: Inventory,
    pub mode: Mode,
    pub allowance: u32,
    pub keys: HeldKeys,

    // ── Level bookkeeping ──
    pub portal_guard: PortalGuard,
    pub current_level: usize,
    pub level_name: String,
    pub entry: Entry,

    // ── Clocks ──
    pub move_clock_ms: u64,
    pub fire_clock_ms: u64,
    pub tick: u64,

    pub tuning: TuningConfig,
    pub timing: TimingConfig,
}

impl WorldState {
    /// A world on level 0 of `levels`.
    pub fn new(levels: LevelSet, timing: TimingConfig, tuning: TuningConfig) -> Result<Self, LevelError> {
        let mut world = WorldState {
            levels,
            grid: Grid::default(),
            player: Actor::at_tile(level::DEFAULT_SPAWN),
            items: vec![],
            pebbles: vec![],
            enemies: vec![],
            portals: vec![],
            berries: vec![],
            inventory: Inventory::default(),
            inventory_at_entry: Inventory::default(),
            mode: Mode::default(),
            allowance: 0,
            keys: HeldKeys::default(),
            portal_guard: PortalGuard::Armed,
            current_level: 0,
            level_name: String::new(),
            entry: Entry::Spawn,
            move_clock_ms: 0,
            fire_clock_ms: 0,
            tick: 0,
            tuning,
            timing,
        };
        level::enter_level(&mut world, 0, Entry::Spawn)?;
        Ok(world)
    }

    pub fn hud(&self) -> Hud {
        Hud {
            level: self.current_level,
            level_name: self.level_name.clone(),
            allowance: self.allowance,
            mode: self.mode,
            berries: self.inventory.count(Inventory::BERRY),
        }
    }

    /// Tiles of every item currently on fire.
    pub fn flame_tiles(&self) -> Vec<TilePos> {
        self.items.iter().filter(|it| it.is_burning()).map(|it| it.tile).collect()
    }

    /// Tiles of live enemies. Pebbles may not slide onto these.
    pub fn enemy_tiles(&self) -> Vec<TilePos> {
        self.enemies.iter().filter(|e| e.alive).map(|e| e.tile()).collect()
    }

    pub fn pebble_tuning(&self) -> PebbleTuning {
        PebbleTuning {
            charge_ms: self.tuning.charge_ms,
            slide_per_tick: self.tuning.pebble_slide_per_tick,
        }
    }

    pub fn chase_tuning(&self) -> ChaseTuning {
        ChaseTuning {
            recalc_ticks: self.tuning.path_recalc_ticks,
            step_per_tick: self.tuning.enemy_step_per_tick,
            max_expansions: self.tuning.path_max_expansions,
        }
    }
}
