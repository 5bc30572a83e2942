//! Interaction rules and rule-set validation
//!
//! A rule binds one trigger to the regions it shows and hides. The rule set
//! is validated once, when the controller is built, and is read-only from
//! then on. Invalid configurations are rejected outright; nothing is
//! silently corrected.

use std::collections::BTreeSet;

use hashbrown::{HashMap, HashSet};
use hotspot_types::{InteractionConfig, StyleMap};

use crate::registry::{ElementId, RegionRegistry, TriggerId};

/// Configuration errors detected while building a [`RuleSet`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleSetError {
    #[error("interaction rule #{index} has an empty trigger id")]
    EmptyTrigger { index: usize },

    #[error("trigger '{0}' is declared by more than one rule")]
    DuplicateTrigger(TriggerId),

    #[error("triggers '{first}' and '{second}' are both marked as default")]
    MultipleDefaults { first: TriggerId, second: TriggerId },

    #[error("rule '{trigger}' both shows and hides element '{element}'")]
    ShowHideOverlap { trigger: TriggerId, element: ElementId },
}

// ═══════════════════════════════════════════════════════════════════════════
// Interaction Rule
// ═══════════════════════════════════════════════════════════════════════════

/// What happens when one trigger becomes active
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionRule {
    pub trigger: TriggerId,

    /// Elements shown while active (declaration order, no duplicates)
    pub show: Vec<ElementId>,

    /// Elements hidden on activation (declaration order, no duplicates)
    pub hide: Vec<ElementId>,

    pub is_default: bool,

    /// Styles applied to the trigger while active
    pub active_style: StyleMap,

    /// Styles applied to the trigger while inactive
    pub inactive_style: StyleMap,

    /// Class toggled on the trigger with its active state
    pub active_class: Option<String>,
}

impl InteractionRule {
    pub fn new(trigger: impl Into<TriggerId>) -> Self {
        Self {
            trigger: trigger.into(),
            ..Default::default()
        }
    }

    pub fn showing<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        self.show = ordered_unique(self.show.into_iter().chain(ids.into_iter().map(Into::into)));
        self
    }

    pub fn hiding<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        self.hide = ordered_unique(self.hide.into_iter().chain(ids.into_iter().map(Into::into)));
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_active_style(mut self, property: &str, value: &str) -> Self {
        self.active_style.insert(property.to_string(), value.to_string());
        self
    }

    pub fn with_inactive_style(mut self, property: &str, value: &str) -> Self {
        self.inactive_style.insert(property.to_string(), value.to_string());
        self
    }

    pub fn with_active_class(mut self, class: &str) -> Self {
        self.active_class = Some(class.to_string());
        self
    }

    pub fn shows(&self, id: &ElementId) -> bool {
        self.show.contains(id)
    }

    pub fn hides(&self, id: &ElementId) -> bool {
        self.hide.contains(id)
    }

    /// Opacity this trigger rests at while inactive
    pub fn idle_opacity(&self) -> &str {
        self.inactive_style
            .get("opacity")
            .map(String::as_str)
            .unwrap_or("1")
    }

    /// Opacity this trigger rests at while active
    pub fn active_opacity(&self) -> &str {
        self.active_style
            .get("opacity")
            .map(String::as_str)
            .unwrap_or("1")
    }

    /// Active-style properties the inactive style does not overwrite. These
    /// have to be reset explicitly when the rule is deactivated.
    pub fn active_only_properties(&self) -> impl Iterator<Item = &str> {
        self.active_style
            .keys()
            .filter(|k| !self.inactive_style.contains_key(*k))
            .map(String::as_str)
    }
}

impl From<&InteractionConfig> for InteractionRule {
    fn from(config: &InteractionConfig) -> Self {
        Self {
            trigger: ElementId::new(config.trigger_id.as_str()),
            show: ordered_unique(config.show_elements.iter().map(|s| ElementId::new(s.as_str()))),
            hide: ordered_unique(config.hide_elements.iter().map(|s| ElementId::new(s.as_str()))),
            is_default: config.is_default,
            active_style: config.active_styles.clone(),
            inactive_style: config.inactive_styles.clone(),
            active_class: config.active_class.clone(),
        }
    }
}

fn ordered_unique(ids: impl Iterator<Item = ElementId>) -> Vec<ElementId> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(id.clone())).collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Rule Set
// ═══════════════════════════════════════════════════════════════════════════

/// Validated, immutable collection of interaction rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<InteractionRule>,
    /// Trigger -> position in `rules`
    index: HashMap<TriggerId, usize>,
    default_idx: Option<usize>,
}

impl RuleSet {
    /// Validate and index a list of rules
    pub fn new(rules: Vec<InteractionRule>) -> Result<Self, RuleSetError> {
        let mut index = HashMap::with_capacity(rules.len());
        let mut default_idx: Option<usize> = None;

        for (i, rule) in rules.iter().enumerate() {
            if rule.trigger.is_empty() {
                return Err(RuleSetError::EmptyTrigger { index: i });
            }
            if index.insert(rule.trigger.clone(), i).is_some() {
                return Err(RuleSetError::DuplicateTrigger(rule.trigger.clone()));
            }
            if rule.is_default {
                if let Some(prev) = default_idx {
                    return Err(RuleSetError::MultipleDefaults {
                        first: rules[prev].trigger.clone(),
                        second: rule.trigger.clone(),
                    });
                }
                default_idx = Some(i);
            }
            if let Some(element) = rule.show.iter().find(|id| rule.hides(id)) {
                return Err(RuleSetError::ShowHideOverlap {
                    trigger: rule.trigger.clone(),
                    element: element.clone(),
                });
            }
        }

        Ok(Self {
            rules,
            index,
            default_idx,
        })
    }

    pub fn from_config(configs: &[InteractionConfig]) -> Result<Self, RuleSetError> {
        Self::new(configs.iter().map(InteractionRule::from).collect())
    }

    pub fn get(&self, trigger: &TriggerId) -> Option<&InteractionRule> {
        self.index.get(trigger).map(|&i| &self.rules[i])
    }

    pub fn contains(&self, trigger: &TriggerId) -> bool {
        self.index.contains_key(trigger)
    }

    /// Rules in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &InteractionRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule flagged as default, if any
    pub fn default_rule(&self) -> Option<&InteractionRule> {
        self.default_idx.map(|i| &self.rules[i])
    }

    /// Every element id mentioned anywhere (triggers included), sorted
    pub fn referenced_ids(&self) -> BTreeSet<&ElementId> {
        self.rules
            .iter()
            .flat_map(|r| std::iter::once(&r.trigger).chain(&r.show).chain(&r.hide))
            .collect()
    }

    /// Whether any rule shows or hides `id` (its visibility belongs to the scheduler)
    pub fn controls(&self, id: &ElementId) -> bool {
        self.rules.iter().any(|r| r.shows(id) || r.hides(id))
    }

    /// Elements named in any show or hide set, first mention first
    pub fn controlled_ids(&self) -> Vec<&ElementId> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .flat_map(|r| r.show.iter().chain(&r.hide))
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Referenced ids the registry cannot resolve
    pub fn unresolved_ids<R: RegionRegistry + ?Sized>(&self, registry: &R) -> Vec<ElementId> {
        self.referenced_ids()
            .into_iter()
            .filter(|id| registry.resolve(id).is_none())
            .cloned()
            .collect()
    }
}
