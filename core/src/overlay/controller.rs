//! Overlay controller
//!
//! Owns the rule set, the activation engine, the scheduler and the hover
//! preview, and wires pointer input to them. The registry arrives later,
//! when the diagram signals readiness; until then every input is ignored.

use std::time::Instant;

use hashbrown::HashMap;
use hotspot_types::{OverlayConfig, StyleMap, TimingConfig};

use crate::activation::{Activation, ActivationEngine, Command};
use crate::readiness::ReadinessError;
use crate::registry::{ElementId, RegionRegistry, TriggerId};
use crate::rules::{RuleSet, RuleSetError};
use crate::scheduler::{TransitionScheduler, VisibilityState};

use super::hover::HoverPreview;

/// Callback fired once per completed activation
pub type InteractionCallback = Box<dyn FnMut(&TriggerId) + Send>;

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the diagram
    Pending,
    Ready,
    /// Diagram never became ready; inert for good
    Failed,
    TornDown,
}

/// Pointer input routed to a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerEvent {
    Activate(TriggerId),
    Enter(TriggerId),
    Leave(TriggerId),
}

impl PointerEvent {
    pub fn trigger(&self) -> &TriggerId {
        match self {
            Self::Activate(t) | Self::Enter(t) | Self::Leave(t) => t,
        }
    }
}

/// Point-in-time view of the controller
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySnapshot {
    pub phase: Phase,
    pub active: Option<TriggerId>,
    pub pending: usize,
    pub visibility: Vec<(ElementId, Option<VisibilityState>)>,
}

pub struct OverlayController<R> {
    rules: RuleSet,
    engine: ActivationEngine,
    scheduler: TransitionScheduler,
    hover: HoverPreview,

    font_family: Option<String>,
    /// CSS transition declared on every trigger
    trigger_transition: String,
    /// CSS transition declared on every shown/hidden element
    element_transition: String,
    /// Trigger values captured at readiness for properties only the active
    /// style sets
    baseline: HashMap<TriggerId, StyleMap>,

    registry: Option<R>,
    phase: Phase,
    on_interaction: Option<InteractionCallback>,
}

impl<R: RegionRegistry> OverlayController<R> {
    /// Build a controller from configuration. Fails on any rule-set error
    /// before any state exists.
    pub fn new(config: &OverlayConfig) -> Result<Self, RuleSetError> {
        let rules = RuleSet::from_config(&config.interactions)?;
        let mut controller = Self::with_rules(rules, &config.timing);
        controller.font_family = config.font_family.clone();
        Ok(controller)
    }

    pub fn with_rules(rules: RuleSet, timing: &TimingConfig) -> Self {
        Self {
            engine: ActivationEngine::new(&rules),
            scheduler: TransitionScheduler::from_timing(timing),
            hover: HoverPreview::new(timing.hover_opacity.as_str()),
            font_family: None,
            trigger_transition: format!("all {}s ease", timing.fade().as_secs_f32()),
            element_transition: format!("opacity {}s ease-in-out", timing.fade().as_secs_f32()),
            baseline: HashMap::new(),
            registry: None,
            phase: Phase::Pending,
            on_interaction: None,
            rules,
        }
    }

    pub fn set_on_interaction<F>(&mut self, callback: F)
    where
        F: FnMut(&TriggerId) + Send + 'static,
    {
        self.on_interaction = Some(Box::new(callback));
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    /// The diagram is loaded: decorate triggers, normalise fonts and put
    /// every controlled element into the initial state.
    pub fn on_ready(&mut self, mut registry: R, now: Instant) {
        if self.phase != Phase::Pending {
            tracing::warn!(phase = ?self.phase, "Ignoring readiness signal");
            return;
        }

        for id in self.rules.unresolved_ids(&registry) {
            tracing::warn!(element = %id, "Element referenced by interaction rules not found in diagram");
        }

        for id in self.rules.controlled_ids() {
            if let Some(handle) = registry.resolve(id) {
                registry.set_property(handle, "transition", &self.element_transition);
            }
        }
        for rule in self.rules.iter() {
            let Some(handle) = registry.resolve(&rule.trigger) else {
                continue;
            };
            registry.set_property(handle, "cursor", "pointer");
            registry.set_property(handle, "transition", &self.trigger_transition);

            let resting: StyleMap = rule
                .active_only_properties()
                .filter_map(|p| Some((p.to_string(), registry.get_property(handle, p)?)))
                .collect();
            if !resting.is_empty() {
                self.baseline.insert(rule.trigger.clone(), resting);
            }
        }
        if let Some(font) = &self.font_family {
            for handle in registry.text_elements() {
                registry.set_property(handle, "font-family", font);
            }
        }

        self.registry = Some(registry);
        self.phase = Phase::Ready;

        let commands = self.engine.initial_commands(&self.rules);
        self.execute(&commands, now);

        tracing::info!(
            rules = self.rules.len(),
            active = ?self.engine.active().map(ElementId::as_str),
            "Overlay ready"
        );
    }

    /// The diagram never became ready. Reported once; the controller stays inert.
    pub fn on_ready_failed(&mut self, error: &ReadinessError) {
        if self.phase != Phase::Pending {
            return;
        }
        tracing::error!(error = %error, "Overlay failed to initialize");
        self.phase = Phase::Failed;
    }

    /// Cancel all pending transitions and release the registry
    pub fn teardown(&mut self) -> Option<R> {
        let cancelled = self.scheduler.cancel_all();
        self.hover.clear();
        self.phase = Phase::TornDown;
        tracing::debug!(cancelled, "Overlay torn down");
        self.registry.take()
    }

    // ─── Input ───────────────────────────────────────────────────────────────

    /// Route one pointer event. Returns `true` if it changed anything.
    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        match event {
            PointerEvent::Activate(trigger) => self.activate(&trigger, now),
            PointerEvent::Enter(trigger) | PointerEvent::Leave(trigger) if self.rules.controls(&trigger) => {
                // Opacity of a shown/hidden element belongs to the scheduler
                tracing::trace!(trigger = %trigger, "No hover hint on controlled element");
                false
            }
            PointerEvent::Enter(trigger) => {
                let (Some(registry), Some(rule)) = (self.registry.as_mut(), self.rules.get(&trigger)) else {
                    return false;
                };
                self.hover.enter(registry, rule, self.engine.active())
            }
            PointerEvent::Leave(trigger) => {
                let (Some(registry), Some(rule)) = (self.registry.as_mut(), self.rules.get(&trigger)) else {
                    return false;
                };
                self.hover.leave(registry, rule, self.engine.active())
            }
        }
    }

    /// Make `trigger` the active one. Returns `true` if the selection changed
    /// (and `on_interaction` fired).
    pub fn activate(&mut self, trigger: &TriggerId, now: Instant) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        match self.engine.activate(&self.rules, trigger) {
            Activation::Unchanged => false,
            Activation::UnknownTrigger => {
                tracing::debug!(trigger = %trigger, "Activation requested for unknown trigger");
                false
            }
            Activation::Changed { previous, commands } => {
                if let (Some(registry), Some(rule)) = (self.registry.as_mut(), self.rules.get(trigger))
                    && !self.rules.controls(trigger)
                {
                    self.hover.commit(registry, rule);
                }
                self.execute(&commands, now);
                tracing::debug!(
                    trigger = %trigger,
                    previous = ?previous.as_ref().map(ElementId::as_str),
                    commands = commands.len(),
                    "Trigger activated"
                );
                if let Some(callback) = self.on_interaction.as_mut() {
                    callback(trigger);
                }
                true
            }
        }
    }

    /// Fire due transitions
    pub fn tick(&mut self, now: Instant) -> usize {
        match self.registry.as_mut() {
            Some(registry) if self.phase == Phase::Ready => self.scheduler.tick(registry, now),
            _ => 0,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        if self.phase != Phase::Ready {
            return None;
        }
        self.scheduler.next_deadline()
    }

    fn execute(&mut self, commands: &[Command], now: Instant) {
        let Some(registry) = self.registry.as_mut() else {
            return;
        };

        for command in commands {
            let applied = match command {
                Command::ApplyStyle { trigger, style } => match registry.resolve(trigger) {
                    Some(handle) => {
                        for (property, value) in style {
                            registry.set_property(handle, property, value);
                        }
                        true
                    }
                    None => false,
                },
                Command::ResetStyle { trigger, properties } => match registry.resolve(trigger) {
                    Some(handle) => {
                        let resting = self.baseline.get(trigger);
                        for property in properties {
                            match resting.and_then(|m| m.get(property)) {
                                Some(value) => registry.set_property(handle, property, value),
                                None => registry.remove_property(handle, property),
                            }
                        }
                        true
                    }
                    None => false,
                },
                Command::AddClass { trigger, class } => match registry.resolve(trigger) {
                    Some(handle) => {
                        registry.add_class(handle, class);
                        true
                    }
                    None => false,
                },
                Command::RemoveClass { trigger, class } => match registry.resolve(trigger) {
                    Some(handle) => {
                        registry.remove_class(handle, class);
                        true
                    }
                    None => false,
                },
                Command::Show(id) => self.scheduler.show(registry, id, now),
                Command::Hide(id) => self.scheduler.hide(registry, id, now),
                Command::Snap { element, shown } => self.scheduler.snap(registry, element, *shown),
            };

            if !applied {
                tracing::debug!(command = ?command, "Skipped command for missing element");
            }
        }
    }

    // ─── Inspection ──────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn active_trigger(&self) -> Option<&TriggerId> {
        self.engine.active()
    }

    pub fn hovered(&self) -> Option<&TriggerId> {
        self.hover.hovered()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn registry(&self) -> Option<&R> {
        self.registry.as_ref()
    }

    pub fn visibility(&self, id: &ElementId) -> Option<VisibilityState> {
        self.scheduler.visibility(id)
    }

    pub fn pending_count(&self) -> usize {
        self.scheduler.pending_count()
    }

    pub fn snapshot(&self, elements: &[ElementId]) -> OverlaySnapshot {
        OverlaySnapshot {
            phase: self.phase,
            active: self.engine.active().cloned(),
            pending: self.scheduler.pending_count(),
            visibility: elements
                .iter()
                .map(|id| (id.clone(), self.scheduler.visibility(id)))
                .collect(),
        }
    }
}
