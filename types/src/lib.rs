//! Shared configuration types for hotspot diagram overlays.
//!
//! Everything here is plain serde data: the surface an embedding page (or a
//! TOML file on disk) uses to describe which diagram to load and how its
//! triggers show and hide the other regions. Validation lives in
//! `hotspot-core`, not here.

pub mod config;

pub use config::{InteractionConfig, OverlayConfig, StyleMap, TimingConfig};
