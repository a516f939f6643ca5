//! External configuration loader.
//!
//! Reads `config.toml` from the executable's directory (or CWD).
//! Falls back to defaults if the file is missing or incomplete. Problems
//! are collected in `load_warnings` so the caller can log them once the
//! log sink exists.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::pathfind::MAX_EXPANSIONS;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub tuning: TuningConfig,
    pub levels_dir: PathBuf,
    pub log_file: PathBuf,
    pub load_warnings: Vec<String>,
}

/// Fixed step of each clock.
#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub fast_tick_ms: u64,
    pub slow_tick_ms: u64,
}

/// Simulation rates and thresholds, all expressed per fixed tick or in
/// milliseconds of the owning clock.
#[derive(Clone, Debug, PartialEq)]
pub struct TuningConfig {
    pub player_speed_px: f32,
    pub burn_dwell_ms: u64,
    pub charge_ms: u64,
    pub pebble_slide_per_tick: f32,
    pub enemy_step_per_tick: f32,
    pub path_recalc_ticks: u32,
    pub path_max_expansions: usize,
    pub contact_radius_tiles: f32,
    pub placement_allowance: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TomlTiming::default().into()
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        TomlTuning::default().into()
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    tuning: TomlTuning,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_fast_tick")]
    fast_tick_ms: u64,
    #[serde(default = "default_slow_tick")]
    slow_tick_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlTuning {
    #[serde(default = "default_player_speed")]
    player_speed_px: f32,
    #[serde(default = "default_burn_dwell")]
    burn_dwell_ms: u64,
    #[serde(default = "default_charge")]
    charge_ms: u64,
    #[serde(default = "default_pebble_slide")]
    pebble_slide_per_tick: f32,
    #[serde(default = "default_enemy_step")]
    enemy_step_per_tick: f32,
    #[serde(default = "default_path_recalc")]
    path_recalc_ticks: u32,
    #[serde(default = "default_path_budget")]
    path_max_expansions: usize,
    #[serde(default = "default_contact_radius")]
    contact_radius_tiles: f32,
    #[serde(default = "default_allowance")]
    placement_allowance: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_fast_tick() -> u64 { 16 }     // ~60 ticks/s
fn default_slow_tick() -> u64 { 50 }     // 20 ticks/s
fn default_player_speed() -> f32 { 2.0 }
fn default_burn_dwell() -> u64 { 500 }
fn default_charge() -> u64 { 500 }
fn default_pebble_slide() -> f32 { 0.1 } // 10 ticks per tile
fn default_enemy_step() -> f32 { 0.05 }  // 20 ticks per tile
fn default_path_recalc() -> u32 { 30 }
fn default_path_budget() -> usize { MAX_EXPANSIONS }
fn default_contact_radius() -> f32 { 0.8 }
fn default_allowance() -> u32 { 20 }
fn default_levels_dir() -> String { "levels".into() }
fn default_log_file() -> String { "cinderpath.log".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            fast_tick_ms: default_fast_tick(),
            slow_tick_ms: default_slow_tick(),
        }
    }
}

impl Default for TomlTuning {
    fn default() -> Self {
        TomlTuning {
            player_speed_px: default_player_speed(),
            burn_dwell_ms: default_burn_dwell(),
            charge_ms: default_charge(),
            pebble_slide_per_tick: default_pebble_slide(),
            enemy_step_per_tick: default_enemy_step(),
            path_recalc_ticks: default_path_recalc(),
            path_max_expansions: default_path_budget(),
            contact_radius_tiles: default_contact_radius(),
            placement_allowance: default_allowance(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            log_file: default_log_file(),
        }
    }
}

impl From<TomlTiming> for TimingConfig {
    fn from(t: TomlTiming) -> Self {
        TimingConfig {
            fast_tick_ms: t.fast_tick_ms.max(1),
            slow_tick_ms: t.slow_tick_ms.max(1),
        }
    }
}

impl From<TomlTuning> for TuningConfig {
    fn from(t: TomlTuning) -> Self {
        TuningConfig {
            player_speed_px: t.player_speed_px,
            burn_dwell_ms: t.burn_dwell_ms,
            charge_ms: t.charge_ms,
            pebble_slide_per_tick: t.pebble_slide_per_tick,
            enemy_step_per_tick: t.enemy_step_per_tick,
            path_recalc_ticks: t.path_recalc_ticks,
            path_max_expansions: t.path_max_expansions,
            contact_radius_tiles: t.contact_radius_tiles,
            placement_allowance: t.placement_allowance,
        }
    }
}

impl TomlTuning {
    /// Pull rates into (0, 1] and distances to >= 0, noting each change.
    /// A rate that would never finish a stride falls back to its default.
    fn sanitized(mut self, warnings: &mut Vec<String>) -> Self {
        for (name, value, default) in [
            ("pebble_slide_per_tick", &mut self.pebble_slide_per_tick, default_pebble_slide()),
            ("enemy_step_per_tick", &mut self.enemy_step_per_tick, default_enemy_step()),
        ] {
            if !(*value > 0.0) {
                warnings.push(format!("tuning.{name} = {value} is not positive; using {default}"));
                *value = default;
            } else if *value > 1.0 {
                warnings.push(format!("tuning.{name} = {value} exceeds 1; using 1"));
                *value = 1.0;
            }
        }
        for (name, value) in [
            ("player_speed_px", &mut self.player_speed_px),
            ("contact_radius_tiles", &mut self.contact_radius_tiles),
        ] {
            if !(*value >= 0.0) {
                warnings.push(format!("tuning.{name} = {value} is negative; using 0"));
                *value = 0.0;
            }
        }
        self
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[], vec![])
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = vec![];
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        GameConfig::from_toml(toml_cfg, &search_dirs, warnings)
    }

    /// Parse config text directly. Errors fall back to defaults with a warning.
    pub fn parse(text: &str) -> Self {
        let mut warnings = vec![];
        let cfg = match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => cfg,
            Err(e) => {
                warnings.push(format!("config parse error: {e}; using defaults"));
                TomlConfig::default()
            }
        };
        GameConfig::from_toml(cfg, &[], warnings)
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf], mut load_warnings: Vec<String>) -> Self {
        // Resolve levels directory against the search dirs when relative
        let levels_dir_str = &cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            timing: cfg.timing.into(),
            tuning: cfg.tuning.sanitized(&mut load_warnings).into(),
            levels_dir,
            log_file: PathBuf::from(cfg.general.log_file),
            load_warnings,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warnings.push(format!("{} parse error: {e}; using defaults", path.display()));
                    return TomlConfig::default();
                }
            },
            Err(e) => warnings.push(format!("could not read {}: {e}", path.display())),
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gives_defaults() {
        let cfg = GameConfig::parse("");
        assert_eq!(cfg.timing, TimingConfig { fast_tick_ms: 16, slow_tick_ms: 50 });
        assert_eq!(cfg.tuning, TuningConfig::default());
        assert_eq!(cfg.tuning.burn_dwell_ms, 500);
        assert_eq!(cfg.tuning.path_recalc_ticks, 30);
        assert!(cfg.load_warnings.is_empty());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = GameConfig::parse("[tuning]\ncharge_ms = 250\n");
        assert_eq!(cfg.tuning.charge_ms, 250);
        assert_eq!(cfg.tuning.burn_dwell_ms, 500);
        assert_eq!(cfg.timing.slow_tick_ms, 50);
    }

    #[test]
    fn bad_toml_warns_and_falls_back() {
        let cfg = GameConfig::parse("[timing\nfast_tick_ms = ");
        assert_eq!(cfg.load_warnings.len(), 1);
        assert_eq!(cfg.timing.fast_tick_ms, 16);
    }

    #[test]
    fn zero_tick_is_clamped() {
        let cfg = GameConfig::parse("[timing]\nfast_tick_ms = 0\n");
        assert_eq!(cfg.timing.fast_tick_ms, 1);
    }

    #[test]
    fn stalled_rates_fall_back_to_defaults() {
        let cfg = GameConfig::parse(
            "[tuning]\npebble_slide_per_tick = 0.0\nenemy_step_per_tick = -0.5\n",
        );
        assert_eq!(cfg.tuning.pebble_slide_per_tick, 0.1);
        assert_eq!(cfg.tuning.enemy_step_per_tick, 0.05);
        assert_eq!(cfg.load_warnings.len(), 2);
        assert!(cfg.load_warnings[0].contains("pebble_slide_per_tick"));
    }

    #[test]
    fn oversized_rate_is_capped_at_one_tile() {
        let cfg = GameConfig::parse("[tuning]\nenemy_step_per_tick = 3.0\n");
        assert_eq!(cfg.tuning.enemy_step_per_tick, 1.0);
        assert_eq!(cfg.load_warnings.len(), 1);
    }

    #[test]
    fn negative_speed_and_radius_become_zero() {
        let cfg = GameConfig::parse(
            "[tuning]\nplayer_speed_px = -2.0\ncontact_radius_tiles = -1.0\n",
        );
        assert_eq!(cfg.tuning.player_speed_px, 0.0);
        assert_eq!(cfg.tuning.contact_radius_tiles, 0.0);
        assert_eq!(cfg.load_warnings.len(), 2);
    }

    #[test]
    fn in_range_tuning_is_left_alone() {
        let cfg = GameConfig::parse("[tuning]\npebble_slide_per_tick = 1.0\nplayer_speed_px = 0.0\n");
        assert_eq!(cfg.tuning.pebble_slide_per_tick, 1.0);
        assert_eq!(cfg.tuning.player_speed_px, 0.0);
        assert!(cfg.load_warnings.is_empty());
    }
}
