/// Entry point and host loop.

mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cinderpath::config::GameConfig;
use cinderpath::domain::tile::Dir;
use cinderpath::sim::event::GameEvent;
use cinderpath::sim::level::LevelSet;
use cinderpath::sim::step;
use cinderpath::sim::world::{Mode, WorldState};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    init_logging(&config);
    for w in &config.load_warnings {
        warn!("{w}");
    }

    let levels = LevelSet::load(&config);
    let mut world = match WorldState::new(levels, config.timing.clone(), config.tuning.clone()) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("No playable level: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new();
    let honor_release = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let result = game_loop(&mut world, &mut renderer, honor_release);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Berries collected: {}", world.hud().berries);
}

/// The terminal is in raw mode, so logs go to a file.
fn init_logging(config: &GameConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let Ok(file) = File::create(&config.log_file) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    honor_release: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = honor_release;

    let fast_rate = Duration::from_millis(world.timing.fast_tick_ms);
    let slow_rate = Duration::from_millis(world.timing.slow_tick_ms);
    let mut last_fast = Instant::now();
    let mut last_slow = Instant::now();
    let mut status = String::new();

    info!(level = world.current_level, "game started");

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }

        let mut events = handle_actions(world, renderer, &kb);

        for (dir, keys) in [
            (Dir::Up, KEYS_UP),
            (Dir::Down, KEYS_DOWN),
            (Dir::Left, KEYS_LEFT),
            (Dir::Right, KEYS_RIGHT),
        ] {
            step::set_key(world, dir, kb.any_held(keys) || kb.any_pressed(keys));
        }

        if last_fast.elapsed() >= fast_rate {
            events.extend(step::fast_tick(world));
            last_fast = Instant::now();
        }
        if last_slow.elapsed() >= slow_rate {
            events.extend(step::slow_tick(world));
            last_slow = Instant::now();
        }

        if let Some(msg) = events.iter().rev().find_map(describe) {
            status = msg;
        }

        renderer.render(&world.snapshot(), &status)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn handle_actions(world: &mut WorldState, renderer: &Renderer, kb: &InputState) -> Vec<GameEvent> {
    let mut events = vec![];

    if kb.any_pressed(KEYS_MODE_PLACE) {
        step::set_mode(world, Mode::Place);
    }
    if kb.any_pressed(KEYS_MODE_BURN) {
        step::set_mode(world, Mode::Burn);
    }
    if kb.any_pressed(KEYS_TOGGLE) {
        step::toggle_mode(world);
    }
    if kb.any_pressed(KEYS_CLEAR) {
        events.extend(step::clear_items(world));
    }
    if kb.any_pressed(KEYS_RELOAD) {
        events.extend(step::reload_level(world));
    }

    for &(column, row) in kb.clicks() {
        if let Some(tile) = renderer.screen_to_tile(column, row) {
            events.extend(step::click(world, tile));
        }
    }

    events
}

/// Status-line text for the events worth announcing.
fn describe(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::BerryPicked { .. } => Some("Picked a berry".into()),
        GameEvent::EnemyBurned { .. } => Some("An enemy burned".into()),
        GameEvent::PlayerCaught { .. } => Some("Caught! Level reset".into()),
        GameEvent::PortalUsed { to_level, .. } => Some(format!("Through the portal to level {}", to_level + 1)),
        GameEvent::PebblePushBlocked { .. } => Some("The pebble won't budge".into()),
        GameEvent::ItemsCleared { count } => Some(format!("Cleared {count} items")),
        _ => None,
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_MODE_PLACE: &[KeyCode] = &[KeyCode::Char('1')];
const KEYS_MODE_BURN: &[KeyCode] = &[KeyCode::Char('2')];
const KEYS_TOGGLE: &[KeyCode] = &[KeyCode::Tab];
const KEYS_CLEAR: &[KeyCode] = &[KeyCode::Char('c'), KeyCode::Char('C')];
const KEYS_RELOAD: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
