pub mod activation;
pub mod config;
pub mod overlay;
pub mod readiness;
pub mod registry;
pub mod rules;
pub mod scheduler;

// Re-exports for convenience
pub use activation::{Activation, ActivationEngine, Command};
pub use config::ConfigError;
pub use overlay::{OverlayCommand, OverlayController, OverlayHandle, OverlaySnapshot, Phase, PointerEvent, spawn_overlay};
pub use readiness::{ReadinessError, ReadinessGate, ReadinessProbe};
pub use registry::{DiagramError, ElementHandle, ElementId, MemoryDiagram, RegionRegistry, TriggerId};
pub use rules::{InteractionRule, RuleSet, RuleSetError};
pub use scheduler::{TransitionScheduler, VisibilityState};
