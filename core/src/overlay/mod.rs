//! Interactive overlay: controller plus its async driver

mod controller;
mod hover;
pub mod runtime;

#[cfg(test)]
mod controller_tests;

pub use controller::{InteractionCallback, OverlayController, OverlaySnapshot, Phase, PointerEvent};
pub use hover::HoverPreview;
pub use runtime::{OverlayCommand, OverlayHandle, spawn_overlay};
