pub mod event;
pub mod level;
pub mod portal;
pub mod snapshot;
pub mod step;
pub mod world;
