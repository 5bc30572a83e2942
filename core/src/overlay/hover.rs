//! Hover preview
//!
//! A hint channel kept apart from activation: hovering an inactive trigger
//! dims it slightly, leaving restores its idle opacity. The preview only
//! ever writes the trigger's own `opacity` property. It has no access to
//! the scheduler or to the active selection, so it cannot disturb either.

use crate::registry::{RegionRegistry, TriggerId};
use crate::rules::InteractionRule;

#[derive(Debug, Clone)]
pub struct HoverPreview {
    hint_opacity: String,
    hovered: Option<TriggerId>,
}

impl HoverPreview {
    pub fn new(hint_opacity: impl Into<String>) -> Self {
        Self {
            hint_opacity: hint_opacity.into(),
            hovered: None,
        }
    }

    pub fn hovered(&self) -> Option<&TriggerId> {
        self.hovered.as_ref()
    }

    /// Pointer entered `rule`'s trigger. Returns `true` if a hint was shown.
    pub fn enter<R: RegionRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        rule: &InteractionRule,
        active: Option<&TriggerId>,
    ) -> bool {
        self.hovered = Some(rule.trigger.clone());
        if active == Some(&rule.trigger) {
            return false;
        }
        let Some(handle) = registry.resolve(&rule.trigger) else {
            return false;
        };
        registry.set_property(handle, "opacity", &self.hint_opacity);
        true
    }

    /// Pointer left `rule`'s trigger. Returns `true` if the idle opacity
    /// was restored.
    pub fn leave<R: RegionRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        rule: &InteractionRule,
        active: Option<&TriggerId>,
    ) -> bool {
        if self.hovered.as_ref() == Some(&rule.trigger) {
            self.hovered = None;
        }
        if active == Some(&rule.trigger) {
            return false;
        }
        let Some(handle) = registry.resolve(&rule.trigger) else {
            return false;
        };
        registry.set_property(handle, "opacity", rule.idle_opacity());
        true
    }

    /// `rule`'s trigger was just activated. A hint still showing on it is
    /// replaced by the active opacity. Returns `true` if a hint was cleared.
    pub fn commit<R: RegionRegistry + ?Sized>(&mut self, registry: &mut R, rule: &InteractionRule) -> bool {
        if self.hovered.as_ref() != Some(&rule.trigger) {
            return false;
        }
        let Some(handle) = registry.resolve(&rule.trigger) else {
            return false;
        };
        registry.set_property(handle, "opacity", rule.active_opacity());
        true
    }

    pub fn clear(&mut self) {
        self.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ElementId, MemoryDiagram};

    #[test]
    fn test_enter_and_leave_inactive_trigger() {
        let mut diagram = MemoryDiagram::with_elements(["a"]);
        let rule = InteractionRule::new("a").with_inactive_style("opacity", "0.6");
        let mut hover = HoverPreview::new("0.8");

        assert!(hover.enter(&mut diagram, &rule, None));
        assert_eq!(diagram.property("a", "opacity"), Some("0.8"));
        assert_eq!(hover.hovered(), Some(&ElementId::from("a")));

        assert!(hover.leave(&mut diagram, &rule, None));
        assert_eq!(diagram.property("a", "opacity"), Some("0.6"));
        assert!(hover.hovered().is_none());
    }

    #[test]
    fn test_leave_without_inactive_opacity_restores_full() {
        let mut diagram = MemoryDiagram::with_elements(["a"]);
        let rule = InteractionRule::new("a").with_inactive_style("fill", "grey");
        let mut hover = HoverPreview::new("0.8");

        hover.enter(&mut diagram, &rule, None);
        hover.leave(&mut diagram, &rule, None);
        assert_eq!(diagram.property("a", "opacity"), Some("1"));
    }

    #[test]
    fn test_active_trigger_is_not_hinted() {
        let mut diagram = MemoryDiagram::with_elements(["a"]);
        let rule = InteractionRule::new("a");
        let active = ElementId::from("a");
        let mut hover = HoverPreview::new("0.8");

        assert!(!hover.enter(&mut diagram, &rule, Some(&active)));
        assert!(!hover.leave(&mut diagram, &rule, Some(&active)));
        assert_eq!(diagram.property("a", "opacity"), None);
    }

    #[test]
    fn test_commit_replaces_hint_on_hovered_trigger() {
        let mut diagram = MemoryDiagram::with_elements(["a", "b"]);
        let a = InteractionRule::new("a");
        let b = InteractionRule::new("b").with_active_style("opacity", "0.9");
        let mut hover = HoverPreview::new("0.8");

        hover.enter(&mut diagram, &b, None);
        assert!(!hover.commit(&mut diagram, &a));
        assert!(hover.commit(&mut diagram, &b));
        assert_eq!(diagram.property("b", "opacity"), Some("0.9"));
    }

    #[test]
    fn test_missing_trigger_is_ignored() {
        let mut diagram = MemoryDiagram::new();
        let rule = InteractionRule::new("a");
        let mut hover = HoverPreview::new("0.8");
        assert!(!hover.enter(&mut diagram, &rule, None));
        assert!(!hover.leave(&mut diagram, &rule, None));
    }
}
