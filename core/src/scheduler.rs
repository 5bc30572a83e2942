//! Transition scheduler
//!
//! Turns `show`/`hide` commands into timed visibility changes:
//!
//! ```text
//!   show(e):  display=block now ──(show delay)──▶ opacity=1
//!   hide(e):  opacity=0 now     ──(fade)───────▶ display=none
//! ```
//!
//! Every element has at most one pending transition. All scheduling goes
//! through [`TransitionScheduler::schedule`], which drops whatever was
//! pending for the element before recording the new entry, so the most
//! recent command for an element always decides where it settles. A stale
//! `hide` can never remove an element that a later `show` brought back.
//!
//! Time is passed in explicitly; the scheduler never reads a clock.

use std::time::{Duration, Instant};

use hashbrown::HashMap;
use hotspot_types::TimingConfig;

use crate::registry::{ElementHandle, ElementId, RegionRegistry};

/// Displayed/opacity pair for one element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityState {
    /// `false` = removed from layout
    pub displayed: bool,
    /// 0.0..=1.0
    pub opacity: f32,
}

impl VisibilityState {
    pub const SHOWN: Self = Self {
        displayed: true,
        opacity: 1.0,
    };

    pub const HIDDEN: Self = Self {
        displayed: false,
        opacity: 0.0,
    };

    pub fn is_settled_shown(&self) -> bool {
        *self == Self::SHOWN
    }

    pub fn is_settled_hidden(&self) -> bool {
        *self == Self::HIDDEN
    }
}

/// Identity of one scheduled transition; later tickets supersede earlier ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// A visibility change waiting for its timer
#[derive(Debug, Clone)]
pub struct PendingTransition {
    pub handle: ElementHandle,
    pub target: VisibilityState,
    pub due_at: Instant,
    pub ticket: Ticket,
}

/// Owns every pending per-element transition
#[derive(Debug)]
pub struct TransitionScheduler {
    show_delay: Duration,
    fade: Duration,

    pending: HashMap<ElementId, PendingTransition>,

    /// Last state written for each element touched so far
    states: HashMap<ElementId, VisibilityState>,

    next_ticket: u64,
}

impl Default for TransitionScheduler {
    fn default() -> Self {
        Self::from_timing(&TimingConfig::default())
    }
}

impl TransitionScheduler {
    pub fn new(show_delay: Duration, fade: Duration) -> Self {
        Self {
            show_delay,
            fade,
            pending: HashMap::new(),
            states: HashMap::new(),
            next_ticket: 0,
        }
    }

    pub fn from_timing(timing: &TimingConfig) -> Self {
        Self::new(timing.show_delay(), timing.fade())
    }

    pub fn fade(&self) -> Duration {
        self.fade
    }

    // ─── Commands ────────────────────────────────────────────────────────────

    /// Display the element now and fade it in after the show delay.
    /// Returns `false` if the element does not exist.
    pub fn show<R: RegionRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        id: &ElementId,
        now: Instant,
    ) -> bool {
        let Some(handle) = registry.resolve(id) else {
            return false;
        };
        self.cancel(id);

        let opacity = self.states.get(id).map_or(0.0, |s| s.opacity);
        self.write(
            registry,
            id,
            handle,
            VisibilityState {
                displayed: true,
                opacity,
            },
        );
        self.schedule(id, handle, VisibilityState::SHOWN, self.show_delay, now);
        true
    }

    /// Start fading the element out now and remove it from layout once the
    /// fade has finished. Returns `false` if the element does not exist.
    pub fn hide<R: RegionRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        id: &ElementId,
        now: Instant,
    ) -> bool {
        let Some(handle) = registry.resolve(id) else {
            return false;
        };
        self.cancel(id);

        let displayed = self.states.get(id).is_none_or(|s| s.displayed);
        self.write(
            registry,
            id,
            handle,
            VisibilityState {
                displayed,
                opacity: 0.0,
            },
        );
        if displayed {
            self.schedule(id, handle, VisibilityState::HIDDEN, self.fade, now);
        }
        true
    }

    /// Put the element into its final state immediately (no transition)
    pub fn snap<R: RegionRegistry + ?Sized>(&mut self, registry: &mut R, id: &ElementId, shown: bool) -> bool {
        let Some(handle) = registry.resolve(id) else {
            return false;
        };
        self.cancel(id);
        let state = if shown {
            VisibilityState::SHOWN
        } else {
            VisibilityState::HIDDEN
        };
        self.write(registry, id, handle, state);
        true
    }

    /// The single entry point for timed changes: cancel whatever is pending
    /// for `id`, then record the new transition.
    pub fn schedule(
        &mut self,
        id: &ElementId,
        handle: ElementHandle,
        target: VisibilityState,
        delay: Duration,
        now: Instant,
    ) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;

        let entry = PendingTransition {
            handle,
            target,
            due_at: now + delay,
            ticket,
        };
        if let Some(stale) = self.pending.insert(id.clone(), entry) {
            tracing::trace!(element = %id, stale = stale.ticket.0, "Superseded pending transition");
        }
        ticket
    }

    pub fn cancel(&mut self, id: &ElementId) -> Option<PendingTransition> {
        self.pending.remove(id)
    }

    /// Drop every pending transition (teardown)
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    // ─── Timers ──────────────────────────────────────────────────────────────

    /// Fire every transition due at `now`, oldest first. Returns how many fired.
    pub fn tick<R: RegionRegistry + ?Sized>(&mut self, registry: &mut R, now: Instant) -> usize {
        let mut due: Vec<(ElementId, PendingTransition)> = self
            .pending
            .extract_if(|_, p| p.due_at <= now)
            .collect();
        due.sort_by_key(|(_, p)| (p.due_at, p.ticket));

        let fired = due.len();
        for (id, transition) in due {
            self.write(registry, &id, transition.handle, transition.target);
        }
        fired
    }

    /// When the next pending transition falls due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.due_at).min()
    }

    // ─── Inspection ──────────────────────────────────────────────────────────

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self, id: &ElementId) -> Option<&PendingTransition> {
        self.pending.get(id)
    }

    /// Last state written for an element (`None` if never touched)
    pub fn visibility(&self, id: &ElementId) -> Option<VisibilityState> {
        self.states.get(id).copied()
    }

    fn write<R: RegionRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        id: &ElementId,
        handle: ElementHandle,
        state: VisibilityState,
    ) {
        registry.set_property(handle, "display", if state.displayed { "block" } else { "none" });
        registry.set_property(handle, "opacity", &state.opacity.to_string());
        self.states.insert(id.clone(), state);
    }
}
