//! Ball controller: rolling locomotion, orbit camera and occlusion handling.
pub mod components;
pub mod config;
pub mod errors;
pub mod locomotion;
pub mod occlusion;
pub mod orbit;
pub mod plugin;
pub mod transparency;

pub use plugin::BallControllerPlugin;
