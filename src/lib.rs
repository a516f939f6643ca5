//! Tile-grid simulation core: collision, fire spread, pushable pebbles,
//! A* pursuit and portal transitions, advanced by two fixed-step clocks.
//!
//! The host drives `sim::step::fast_tick` and `sim::step::slow_tick` and
//! draws from `WorldState::snapshot`.

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;
