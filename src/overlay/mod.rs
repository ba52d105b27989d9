// src/overlay/mod.rs
//
// Screen-space overlay: camera options panel and ball status readout.
//
// Any hovered or pressed node in this panel suppresses orbit camera input.

pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::OverlayPlugin;
