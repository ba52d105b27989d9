//! Demo arena: a closed room with solid pillars and see-through glass walls.
pub mod plugin;
pub mod systems;

pub use plugin::LevelPlugin;
