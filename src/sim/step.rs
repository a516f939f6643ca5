/// Tick entry points and input actions.
///
/// Fast tick order:
///   1. Movement (collision resolver, X then Y)
///   2. Push detection (only when an axis was blocked by a pebble alone)
///   3. Pebble update (charge, slide, settle)
///   4. Enemies (pursuit, then fire kills)
///   5. Portal check (a transition ends the tick)
///   6. Berry pickup
///   7. Enemy contact (death reset)
///
/// Slow tick: burn expiry and one cascade hop.
///
/// Movement must be applied before steps 5-7: they read the post-move
/// feet tile.

use tracing::{debug, info, warn};

use crate::domain::ai;
use crate::domain::collision;
use crate::domain::entity::Inventory;
use crate::domain::fire::{self, Item};
use crate::domain::pebble::{self, PebbleEvent, Push};
use crate::domain::tile::{Dir, TilePos};
use super::event::GameEvent;
use super::level;
use super::portal;
use super::world::{Mode, WorldState};

// ══════════════════════════════════════════════════════════════
// Fast tick
// ══════════════════════════════════════════════════════════════

pub fn fast_tick(world: &mut WorldState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    world.tick += 1;
    world.move_clock_ms += world.timing.fast_tick_ms;

    let push = resolve_player_movement(world);
    resolve_pebbles(world, push, &mut events);
    resolve_enemies(world, &mut events);
    if portal::check_portals(world, &mut events) {
        return events;
    }
    resolve_berry_pickup(world, &mut events);
    resolve_enemy_contact(world, &mut events);

    events
}

/// Apply held-key movement. Returns the push candidate, if any.
fn resolve_player_movement(world: &mut WorldState) -> Option<Push> {
    let (dx, dy) = world.keys.velocity(world.tuning.player_speed_px);
    if dx == 0.0 && dy == 0.0 {
        return None;
    }

    let res = collision::resolve_move(&world.grid, &world.pebbles, world.player.x, world.player.y, dx, dy);
    world.player.x = res.x;
    world.player.y = res.y;
    if let Some(dir) = facing_for(dx, dy) {
        world.player.facing = dir;
    }

    res.pushed_pebble(dx, dy).map(|(pebble, dir)| Push { pebble, dir })
}

/// Horizontal wins on diagonals, matching `Dir::from_delta`.
fn facing_for(dx: f32, dy: f32) -> Option<Dir> {
    let sign = |v: f32| (v > 0.0) as i32 - (v < 0.0) as i32;
    Dir::from_delta(sign(dx), sign(dy))
}

fn resolve_pebbles(world: &mut WorldState, push: Option<Push>, events: &mut Vec<GameEvent>) {
    let reserved = world.enemy_tiles();
    let tuning = world.pebble_tuning();
    let pebble_events = pebble::update(&mut world.pebbles, &world.grid, push, world.move_clock_ms, &reserved, tuning);

    events.extend(pebble_events.into_iter().map(|e| match e {
        PebbleEvent::ChargeStarted { pebble, dir } => GameEvent::PebbleCharging { pebble, dir },
        PebbleEvent::SlideStarted { pebble, from, to } => GameEvent::PebbleSliding { pebble, from, to },
        PebbleEvent::PushBlocked { pebble, .. } => GameEvent::PebblePushBlocked { pebble },
        PebbleEvent::Settled { pebble, tile } => GameEvent::PebbleSettled { pebble, tile },
    }));
}

fn resolve_enemies(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let goal = world.player.feet_tile();
    let tuning = world.chase_tuning();
    let flames = world.flame_tiles();
    let radius = world.tuning.contact_radius_tiles;

    for (i, enemy) in world.enemies.iter_mut().enumerate() {
        if !enemy.alive {
            continue;
        }
        ai::update_enemy(enemy, &world.grid, goal, tuning);
        if ai::touched_by_fire(enemy, &flames, radius) {
            enemy.alive = false;
            enemy.path.stride = None;
            info!(enemy = i, x = enemy.x, y = enemy.y, "enemy burned");
            events.push(GameEvent::EnemyBurned { enemy: i });
        }
    }
}

fn resolve_berry_pickup(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let feet = world.player.feet_tile();
    let Some(idx) = world.berries.iter().position(|b| b.tile == feet) else {
        return;
    };
    let berry = world.berries.remove(idx);
    world.inventory.add(Inventory::BERRY, 1);
    info!(id = berry.id, total = world.inventory.count(Inventory::BERRY), "berry picked");
    events.push(GameEvent::BerryPicked { id: berry.id, tile: berry.tile });
}

fn resolve_enemy_contact(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let radius = world.tuning.contact_radius_tiles;
    let (px, py) = (world.player.x, world.player.y);
    let Some(i) = world
        .enemies
        .iter()
        .position(|e| e.alive && ai::within_radius(e.x, e.y, px, py, radius))
    else {
        return;
    };

    info!(enemy = i, level = world.current_level, "player caught, reloading level");
    events.push(GameEvent::PlayerCaught { enemy: i });
    match level::restart_level(world) {
        Ok(()) => events.push(GameEvent::LevelEntered { level: world.current_level }),
        Err(e) => warn!(error = %e, "level reload failed"),
    }
}

// ══════════════════════════════════════════════════════════════
// Slow tick
// ══════════════════════════════════════════════════════════════

pub fn slow_tick(world: &mut WorldState) -> Vec<GameEvent> {
    world.fire_clock_ms += world.timing.slow_tick_ms;
    let report = fire::burn_tick(&mut world.items, world.fire_clock_ms, world.tuning.burn_dwell_ms);

    let mut events = Vec::with_capacity(report.consumed.len() + report.ignited.len());
    for tile in report.consumed {
        debug!(x = tile.x, y = tile.y, "item consumed");
        events.push(GameEvent::ItemConsumed { tile });
    }
    for tile in report.ignited {
        debug!(x = tile.x, y = tile.y, "fire spread");
        events.push(GameEvent::ItemIgnited { tile });
    }
    events
}

// ══════════════════════════════════════════════════════════════
// Input actions
// ══════════════════════════════════════════════════════════════

pub fn set_key(world: &mut WorldState, dir: Dir, held: bool) {
    world.keys.set(dir, held);
}

/// Place or burn at `tile`, depending on the current mode.
pub fn click(world: &mut WorldState, tile: TilePos) -> Vec<GameEvent> {
    match world.mode {
        Mode::Place => place_at(world, tile),
        Mode::Burn => burn_at(world, tile),
    }
}

/// Put an Unburnt item on `tile`. Refused (and logged) when out of
/// allowance, off the walkable grid, or on an item or pebble.
pub fn place_at(world: &mut WorldState, tile: TilePos) -> Vec<GameEvent> {
    let refusal = if world.allowance == 0 {
        Some("no placement allowance left")
    } else if !world.grid.is_walkable(tile) {
        Some("tile not walkable")
    } else if world.items.iter().any(|it| it.tile == tile) {
        Some("tile already holds an item")
    } else if world.pebbles.iter().any(|p| p.occupied_tile() == tile) {
        Some("tile holds a pebble")
    } else {
        None
    };
    if let Some(reason) = refusal {
        debug!(x = tile.x, y = tile.y, reason, "placement refused");
        return vec![];
    }

    world.items.push(Item::new(tile));
    world.allowance -= 1;
    info!(x = tile.x, y = tile.y, left = world.allowance, "item placed");
    vec![GameEvent::ItemPlaced { tile }]
}

/// Ignite the Unburnt item on `tile`.
pub fn burn_at(world: &mut WorldState, tile: TilePos) -> Vec<GameEvent> {
    if fire::ignite_at(&mut world.items, tile, world.fire_clock_ms, world.tuning.burn_dwell_ms) {
        info!(x = tile.x, y = tile.y, "item ignited");
        vec![GameEvent::ItemIgnited { tile }]
    } else {
        debug!(x = tile.x, y = tile.y, "no unburnt item to ignite");
        vec![]
    }
}

pub fn set_mode(world: &mut WorldState, mode: Mode) {
    world.mode = mode;
}

pub fn toggle_mode(world: &mut WorldState) {
    world.mode = world.mode.toggled();
}

/// Remove every item, burning or not. Allowance is not refunded.
pub fn clear_items(world: &mut WorldState) -> Vec<GameEvent> {
    let count = world.items.len();
    world.items.clear();
    info!(count, "items cleared");
    vec![GameEvent::ItemsCleared { count }]
}

/// Explicit reload requested by the host.
pub fn reload_level(world: &mut WorldState) -> Vec<GameEvent> {
    match level::restart_level(world) {
        Ok(()) => vec![GameEvent::LevelEntered { level: world.current_level }],
        Err(e) => {
            warn!(error = %e, "level reload failed");
            vec![]
        }
    }
}
