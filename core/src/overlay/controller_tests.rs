//! Tests for the overlay controller
//!
//! Drives the controller with an in-memory diagram and explicit timestamps.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use hotspot_types::{InteractionConfig, OverlayConfig, TimingConfig};

use super::*;
use crate::readiness::ReadinessError;
use crate::registry::{ElementId, MemoryDiagram, RegionRegistry};
use crate::rules::RuleSetError;
use crate::scheduler::VisibilityState;

const FADE: Duration = Duration::from_millis(300);

fn id(s: &str) -> ElementId {
    ElementId::from(s)
}

fn make_interaction(trigger: &str, show: &[&str], hide: &[&str], is_default: bool) -> InteractionConfig {
    InteractionConfig {
        trigger_id: trigger.to_string(),
        show_elements: show.iter().map(|s| s.to_string()).collect(),
        hide_elements: hide.iter().map(|s| s.to_string()).collect(),
        is_default,
        active_styles: [("fill".to_string(), "blue".to_string())].into(),
        inactive_styles: [
            ("fill".to_string(), "grey".to_string()),
            ("opacity".to_string(), "0.5".to_string()),
        ]
        .into(),
        ..Default::default()
    }
}

/// A shows x,y and is the default; B shows z and hides x
fn make_config() -> OverlayConfig {
    OverlayConfig {
        diagram_resource: "diagram.svg".to_string(),
        font_family: None,
        timing: TimingConfig::default(),
        interactions: vec![
            make_interaction("A", &["x", "y"], &[], true),
            make_interaction("B", &["z"], &["x"], false),
        ],
    }
}

fn make_diagram() -> MemoryDiagram {
    MemoryDiagram::with_elements(["A", "B", "x", "y", "z"])
}

fn ready(config: &OverlayConfig) -> (OverlayController<MemoryDiagram>, Instant) {
    let mut controller = OverlayController::new(config).unwrap();
    let t0 = Instant::now();
    controller.on_ready(make_diagram(), t0);
    (controller, t0)
}

fn counting(controller: &mut OverlayController<MemoryDiagram>) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    controller.set_on_interaction(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    calls
}

fn shown(controller: &OverlayController<MemoryDiagram>, element: &str) -> bool {
    controller
        .visibility(&id(element))
        .is_some_and(|v| v.is_settled_shown())
}

fn hidden(controller: &OverlayController<MemoryDiagram>, element: &str) -> bool {
    controller
        .visibility(&id(element))
        .is_some_and(|v| v.is_settled_hidden())
}

fn prop<'a>(controller: &'a OverlayController<MemoryDiagram>, element: &str, property: &str) -> Option<&'a str> {
    controller.registry().and_then(|d| d.property(element, property))
}

// ─── Initialization ─────────────────────────────────────────────────────────

#[test]
fn test_ready_applies_default_without_fading() {
    let (controller, _) = ready(&make_config());

    assert_eq!(controller.phase(), Phase::Ready);
    assert_eq!(controller.active_trigger(), Some(&id("A")));
    assert!(shown(&controller, "x"));
    assert!(shown(&controller, "y"));
    assert!(hidden(&controller, "z"));
    assert_eq!(controller.pending_count(), 0);

    assert_eq!(prop(&controller, "A", "fill"), Some("blue"));
    assert_eq!(prop(&controller, "B", "fill"), Some("grey"));
}

#[test]
fn test_ready_decorates_triggers() {
    let (controller, _) = ready(&make_config());
    for trigger in ["A", "B"] {
        assert_eq!(prop(&controller, trigger, "cursor"), Some("pointer"));
        assert_eq!(prop(&controller, trigger, "transition"), Some("all 0.3s ease"));
    }
    assert_eq!(prop(&controller, "x", "cursor"), None);
}

#[test]
fn test_ready_declares_fade_on_controlled_elements() {
    let (controller, _) = ready(&make_config());
    for element in ["x", "y", "z"] {
        assert_eq!(
            prop(&controller, element, "transition"),
            Some("opacity 0.3s ease-in-out"),
            "{element} should fade"
        );
    }
    assert_eq!(prop(&controller, "A", "transition"), Some("all 0.3s ease"));
}

#[test]
fn test_font_override_reaches_text_elements() {
    let mut config = make_config();
    config.font_family = Some("Inter, sans-serif".to_string());

    let mut diagram = make_diagram();
    diagram.insert("label", "text");

    let mut controller: OverlayController<MemoryDiagram> = OverlayController::new(&config).unwrap();
    controller.on_ready(diagram, Instant::now());

    assert_eq!(prop(&controller, "label", "font-family"), Some("Inter, sans-serif"));
    assert_eq!(prop(&controller, "x", "font-family"), None);
}

#[test]
fn test_no_default_hides_everything() {
    let mut config = make_config();
    config.interactions[0].is_default = false;
    let (mut controller, t0) = ready(&config);

    assert_eq!(controller.active_trigger(), None);
    for element in ["x", "y", "z"] {
        assert!(hidden(&controller, element), "{element} should start hidden");
    }
    assert_eq!(prop(&controller, "A", "fill"), Some("grey"));

    assert!(controller.activate(&id("A"), t0));
    controller.tick(t0 + FADE);
    assert!(shown(&controller, "x"));
    assert!(shown(&controller, "y"));
}

#[test]
fn test_initial_default_does_not_fire_callback() {
    let mut controller: OverlayController<MemoryDiagram> = OverlayController::new(&make_config()).unwrap();
    let calls = counting(&mut controller);
    controller.on_ready(make_diagram(), Instant::now());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = make_config();
    config.interactions[1].is_default = true;

    let err = OverlayController::<MemoryDiagram>::new(&config).err().unwrap();
    assert_eq!(
        err,
        RuleSetError::MultipleDefaults {
            first: id("A"),
            second: id("B"),
        }
    );
}

#[test]
fn test_never_ready_stays_inert() {
    let mut controller = OverlayController::<MemoryDiagram>::new(&make_config()).unwrap();
    let calls = counting(&mut controller);
    let t0 = Instant::now();

    controller.on_ready_failed(&ReadinessError::NeverReady { attempts: 50 });
    assert_eq!(controller.phase(), Phase::Failed);

    assert!(!controller.activate(&id("B"), t0));
    assert!(!controller.handle_pointer(PointerEvent::Enter(id("B")), t0));
    assert_eq!(controller.tick(t0 + FADE), 0);
    assert_eq!(controller.next_deadline(), None);

    // A late readiness signal does not resurrect it
    controller.on_ready(make_diagram(), t0);
    assert_eq!(controller.phase(), Phase::Failed);
    assert!(controller.registry().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_input_before_ready_is_ignored() {
    let mut controller = OverlayController::<MemoryDiagram>::new(&make_config()).unwrap();
    let t0 = Instant::now();
    assert!(!controller.handle_pointer(PointerEvent::Activate(id("B")), t0));

    controller.on_ready(make_diagram(), t0);
    assert_eq!(controller.active_trigger(), Some(&id("A")));
}

// ─── Activation ─────────────────────────────────────────────────────────────

#[test]
fn test_reference_scenario() {
    let (mut controller, t0) = ready(&make_config());

    assert!(controller.handle_pointer(PointerEvent::Activate(id("B")), t0));
    assert_eq!(controller.active_trigger(), Some(&id("B")));

    // Fade-out starts immediately, layout removal waits for the fade
    assert_eq!(prop(&controller, "x", "opacity"), Some("0"));
    assert_eq!(prop(&controller, "x", "display"), Some("block"));
    assert_eq!(prop(&controller, "z", "display"), Some("block"));
    assert_eq!(controller.next_deadline(), Some(t0 + Duration::from_millis(10)));

    controller.tick(t0 + FADE);
    assert!(hidden(&controller, "x"));
    assert!(hidden(&controller, "y"));
    assert!(shown(&controller, "z"));
    assert_eq!(controller.pending_count(), 0);

    assert_eq!(prop(&controller, "A", "fill"), Some("grey"));
    assert_eq!(prop(&controller, "B", "fill"), Some("blue"));
}

#[test]
fn test_exactly_one_trigger_styled_active() {
    let mut config = make_config();
    config.interactions.push(make_interaction("C", &["y"], &[], false));
    let mut diagram = make_diagram();
    diagram.insert("C", "g");

    let mut controller: OverlayController<MemoryDiagram> = OverlayController::new(&config).unwrap();
    let t0 = Instant::now();
    controller.on_ready(diagram, t0);

    for (step, trigger) in ["B", "C", "A", "C"].into_iter().enumerate() {
        let at = t0 + Duration::from_millis(20 * step as u64);
        controller.activate(&id(trigger), at);
        let active: Vec<&str> = ["A", "B", "C"]
            .into_iter()
            .filter(|t| prop(&controller, t, "fill") == Some("blue"))
            .collect();
        assert_eq!(active, vec![trigger]);
    }
}

#[test]
fn test_active_style_without_inactive_override_is_exclusive() {
    let mut config = make_config();
    for interaction in &mut config.interactions {
        interaction.inactive_styles.clear();
    }
    let (mut controller, t0) = ready(&config);
    assert_eq!(prop(&controller, "A", "fill"), Some("blue"));
    assert_eq!(prop(&controller, "B", "fill"), None);

    controller.activate(&id("B"), t0);
    controller.tick(t0 + Duration::from_secs(1));
    let active: Vec<&str> = ["A", "B"]
        .into_iter()
        .filter(|t| prop(&controller, t, "fill") == Some("blue"))
        .collect();
    assert_eq!(active, vec!["B"]);
}

#[test]
fn test_deactivation_restores_diagram_value() {
    let mut config = make_config();
    for interaction in &mut config.interactions {
        interaction.inactive_styles.clear();
    }
    let mut diagram = make_diagram();
    let a = diagram.resolve(&id("A")).unwrap();
    diagram.set_property(a, "fill", "red");

    let mut controller: OverlayController<MemoryDiagram> = OverlayController::new(&config).unwrap();
    let t0 = Instant::now();
    controller.on_ready(diagram, t0);
    assert_eq!(prop(&controller, "A", "fill"), Some("blue"));

    controller.activate(&id("B"), t0);
    assert_eq!(prop(&controller, "A", "fill"), Some("red"));

    controller.activate(&id("A"), t0 + FADE);
    assert_eq!(prop(&controller, "A", "fill"), Some("blue"));
    assert_eq!(prop(&controller, "B", "fill"), None);
}

#[test]
fn test_reactivation_is_idempotent() {
    let (mut controller, t0) = ready(&make_config());
    let calls = counting(&mut controller);

    assert!(controller.activate(&id("B"), t0));
    let pending = controller.pending_count();
    assert!(!controller.activate(&id("B"), t0 + Duration::from_millis(5)));
    assert_eq!(controller.pending_count(), pending);
    assert!(!controller.activate(&id("nope"), t0));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_rapid_switch_back_settles_on_latest() {
    let (mut controller, t0) = ready(&make_config());
    let calls = counting(&mut controller);

    controller.activate(&id("B"), t0);
    controller.tick(t0 + Duration::from_millis(20));
    // Still inside the fade window for x and y
    controller.activate(&id("A"), t0 + Duration::from_millis(50));

    // The hide scheduled at t0 would have fired here
    controller.tick(t0 + FADE);
    assert_eq!(prop(&controller, "x", "display"), Some("block"));
    assert_eq!(prop(&controller, "y", "display"), Some("block"));

    controller.tick(t0 + Duration::from_secs(1));
    assert!(shown(&controller, "x"));
    assert!(shown(&controller, "y"));
    assert!(hidden(&controller, "z"));
    assert_eq!(controller.pending_count(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_missing_elements_are_skipped() {
    let mut config = make_config();
    config.interactions[1].show_elements.push("ghost".to_string());
    config.interactions.push(make_interaction("phantom", &["x"], &[], false));
    let (mut controller, t0) = ready(&config);

    assert!(controller.activate(&id("B"), t0));
    controller.tick(t0 + FADE);
    assert!(shown(&controller, "z"));
    assert!(hidden(&controller, "x"));
    assert_eq!(controller.visibility(&id("ghost")), None);

    // A trigger absent from the diagram still switches the logical state
    assert!(controller.activate(&id("phantom"), t0 + FADE));
    assert_eq!(controller.active_trigger(), Some(&id("phantom")));
}

// ─── Hover ──────────────────────────────────────────────────────────────────

#[test]
fn test_hover_is_independent_of_activation() {
    let (mut controller, t0) = ready(&make_config());
    controller.activate(&id("B"), t0);
    controller.activate(&id("A"), t0 + Duration::from_millis(5));
    let pending = controller.pending_count();

    assert!(controller.handle_pointer(PointerEvent::Enter(id("B")), t0));
    assert_eq!(prop(&controller, "B", "opacity"), Some("0.8"));
    assert_eq!(controller.hovered(), Some(&id("B")));
    assert_eq!(controller.active_trigger(), Some(&id("A")));
    assert_eq!(controller.pending_count(), pending);

    assert!(controller.handle_pointer(PointerEvent::Leave(id("B")), t0));
    assert_eq!(prop(&controller, "B", "opacity"), Some("0.5"));
    assert_eq!(controller.hovered(), None);
    assert_eq!(controller.pending_count(), pending);
}

#[test]
fn test_hover_on_active_trigger_is_ignored() {
    let (mut controller, t0) = ready(&make_config());
    assert!(!controller.handle_pointer(PointerEvent::Enter(id("A")), t0));
    assert_eq!(prop(&controller, "A", "opacity"), None);
    assert!(!controller.handle_pointer(PointerEvent::Enter(id("nope")), t0));
}

#[test]
fn test_hover_hint_cleared_when_trigger_activated() {
    let (mut controller, t0) = ready(&make_config());

    controller.handle_pointer(PointerEvent::Enter(id("B")), t0);
    assert_eq!(prop(&controller, "B", "opacity"), Some("0.8"));

    controller.handle_pointer(PointerEvent::Activate(id("B")), t0);
    assert!(!controller.handle_pointer(PointerEvent::Leave(id("B")), t0));
    controller.tick(t0 + Duration::from_secs(1));

    assert_eq!(prop(&controller, "B", "opacity"), Some("1"));
    assert_eq!(controller.hovered(), None);
}

#[test]
fn test_hover_skips_trigger_that_is_also_controlled() {
    let mut config = make_config();
    config.interactions.push(make_interaction("z", &[], &[], false));
    let (mut controller, t0) = ready(&config);
    let before = prop(&controller, "z", "opacity").map(str::to_string);

    assert!(!controller.handle_pointer(PointerEvent::Enter(id("z")), t0));
    assert!(!controller.handle_pointer(PointerEvent::Leave(id("z")), t0));
    assert_eq!(prop(&controller, "z", "opacity").map(str::to_string), before);
    assert_eq!(controller.visibility(&id("z")), Some(VisibilityState::HIDDEN));
    assert_eq!(controller.hovered(), None);
}

// ─── Teardown ───────────────────────────────────────────────────────────────

#[test]
fn test_teardown_cancels_pending_work() {
    let (mut controller, t0) = ready(&make_config());
    controller.activate(&id("B"), t0);
    assert!(controller.pending_count() > 0);

    let diagram = controller.teardown().unwrap();
    assert_eq!(controller.phase(), Phase::TornDown);
    assert_eq!(controller.pending_count(), 0);
    assert_eq!(controller.next_deadline(), None);
    assert_eq!(controller.tick(t0 + FADE), 0);
    assert!(!controller.activate(&id("A"), t0 + FADE));

    // Nothing fired after teardown: x is mid-fade, never removed
    assert_eq!(diagram.property("x", "display"), Some("block"));
}

#[test]
fn test_snapshot_reports_state() {
    let (controller, _) = ready(&make_config());
    let snap = controller.snapshot(&[id("x"), id("z"), id("ghost")]);

    assert_eq!(snap.phase, Phase::Ready);
    assert_eq!(snap.active, Some(id("A")));
    assert_eq!(snap.pending, 0);
    assert_eq!(
        snap.visibility,
        vec![
            (id("x"), Some(VisibilityState::SHOWN)),
            (id("z"), Some(VisibilityState::HIDDEN)),
            (id("ghost"), None),
        ]
    );
}
