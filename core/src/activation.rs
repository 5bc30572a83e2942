//! Activation engine
//!
//! The state machine at the heart of the overlay. Its only state is which
//! trigger (if any) is active; its transition function turns an activation
//! request into the batch of style and visibility commands that take the
//! diagram from whatever it shows now to what the requested rule wants.
//!
//! The whole batch is computed before anything is applied, and each element
//! appears in it at most once. When an element is named by several rules the
//! newly active rule decides its fate.

use hashbrown::HashMap;
use hotspot_types::StyleMap;

use crate::registry::{ElementId, TriggerId};
use crate::rules::{InteractionRule, RuleSet};

/// A single instruction for the scheduler / registry
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Write a set of style properties onto a trigger
    ApplyStyle { trigger: TriggerId, style: StyleMap },
    /// Return properties left over from the active style to their resting value
    ResetStyle { trigger: TriggerId, properties: Vec<String> },
    AddClass { trigger: TriggerId, class: String },
    RemoveClass { trigger: TriggerId, class: String },
    /// Display, then fade in
    Show(ElementId),
    /// Fade out, then remove from layout
    Hide(ElementId),
    /// Put an element straight into its final state (no fade)
    Snap { element: ElementId, shown: bool },
}

impl Command {
    /// Element whose visibility this command changes, if any
    pub fn element(&self) -> Option<&ElementId> {
        match self {
            Self::Show(e) | Self::Hide(e) => Some(e),
            Self::Snap { element, .. } => Some(element),
            _ => None,
        }
    }
}

/// Outcome of an activation request
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// Requested trigger is already active; nothing to do
    Unchanged,
    /// No rule is bound to the requested trigger
    UnknownTrigger,
    Changed {
        previous: Option<TriggerId>,
        commands: Vec<Command>,
    },
}

/// Pure transition function: `(current, requested) -> commands`
pub fn transition(rules: &RuleSet, current: Option<&TriggerId>, requested: &TriggerId) -> Activation {
    if current == Some(requested) {
        return Activation::Unchanged;
    }
    let Some(target) = rules.get(requested) else {
        return Activation::UnknownTrigger;
    };
    Activation::Changed {
        previous: current.cloned(),
        commands: plan(rules, Some(target), false),
    }
}

/// Tracks the active trigger and applies [`transition`]
#[derive(Debug, Clone, Default)]
pub struct ActivationEngine {
    active: Option<TriggerId>,
}

impl ActivationEngine {
    /// Start in the rule set's initial state (the default rule, else none)
    pub fn new(rules: &RuleSet) -> Self {
        Self {
            active: rules.default_rule().map(|r| r.trigger.clone()),
        }
    }

    pub fn active(&self) -> Option<&TriggerId> {
        self.active.as_ref()
    }

    pub fn is_active(&self, trigger: &TriggerId) -> bool {
        self.active.as_ref() == Some(trigger)
    }

    /// Commands that put a freshly loaded diagram into the current state.
    /// Visibility is snapped rather than faded.
    pub fn initial_commands(&self, rules: &RuleSet) -> Vec<Command> {
        let target = self.active.as_ref().and_then(|t| rules.get(t));
        plan(rules, target, true)
    }

    pub fn activate(&mut self, rules: &RuleSet, requested: &TriggerId) -> Activation {
        let outcome = transition(rules, self.active.as_ref(), requested);
        if matches!(outcome, Activation::Changed { .. }) {
            self.active = Some(requested.clone());
        }
        outcome
    }
}

/// Build the command batch that makes `target` the only active rule
fn plan(rules: &RuleSet, target: Option<&InteractionRule>, snap: bool) -> Vec<Command> {
    let mut styles = Vec::with_capacity(rules.len());
    let mut visibility = Visibility::default();

    for rule in rules.iter() {
        let is_target = target.is_some_and(|t| t.trigger == rule.trigger);

        if is_target {
            styles.push(Command::ApplyStyle {
                trigger: rule.trigger.clone(),
                style: rule.active_style.clone(),
            });
            if let Some(class) = &rule.active_class {
                styles.push(Command::AddClass {
                    trigger: rule.trigger.clone(),
                    class: class.clone(),
                });
            }
            for e in &rule.show {
                visibility.decide(e, true, true);
            }
            for e in &rule.hide {
                visibility.decide(e, false, true);
            }
        } else {
            styles.push(Command::ApplyStyle {
                trigger: rule.trigger.clone(),
                style: rule.inactive_style.clone(),
            });
            if let Some(class) = &rule.active_class
                && !snap
            {
                styles.push(Command::RemoveClass {
                    trigger: rule.trigger.clone(),
                    class: class.clone(),
                });
            }
            let leftovers: Vec<String> = rule.active_only_properties().map(str::to_string).collect();
            if !leftovers.is_empty() && !snap {
                styles.push(Command::ResetStyle {
                    trigger: rule.trigger.clone(),
                    properties: leftovers,
                });
            }
            for e in rule.show.iter().filter(|e| !target.is_some_and(|t| t.shows(e))) {
                visibility.decide(e, false, false);
            }
        }
    }

    styles.extend(visibility.into_commands(snap));
    styles
}

/// Per-element decisions in first-mention order
#[derive(Default)]
struct Visibility {
    order: Vec<ElementId>,
    /// element -> (shown, decided by the target rule)
    decisions: HashMap<ElementId, (bool, bool)>,
}

impl Visibility {
    fn decide(&mut self, element: &ElementId, shown: bool, authoritative: bool) {
        match self.decisions.get_mut(element) {
            Some(slot) => {
                if authoritative || !slot.1 {
                    *slot = (shown, authoritative || slot.1);
                }
            }
            None => {
                self.order.push(element.clone());
                self.decisions.insert(element.clone(), (shown, authoritative));
            }
        }
    }

    fn into_commands(self, snap: bool) -> impl Iterator<Item = Command> {
        let decisions = self.decisions;
        self.order.into_iter().map(move |element| {
            let shown = decisions.get(&element).is_some_and(|d| d.0);
            match (snap, shown) {
                (true, _) => Command::Snap { element, shown },
                (false, true) => Command::Show(element),
                (false, false) => Command::Hide(element),
            }
        })
    }
}
