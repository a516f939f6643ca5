pub mod ai;
pub mod collision;
pub mod entity;
pub mod fire;
pub mod grid;
pub mod pathfind;
pub mod pebble;
pub mod tile;
