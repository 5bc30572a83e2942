//! Overlay configuration surface.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Inline style overrides, keyed by property name (`"opacity"`, `"fill"`, ...)
pub type StyleMap = BTreeMap<String, String>;

// ═══════════════════════════════════════════════════════════════════════════
// Overlay
// ═══════════════════════════════════════════════════════════════════════════

/// Top-level overlay configuration (one per embedded diagram)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Location of the vector diagram (path or URI)
    pub diagram_resource: String,

    /// Font stack forced onto every text element once the diagram is ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    /// Fade, polling and hover timings
    #[serde(default)]
    pub timing: TimingConfig,

    /// Interaction rules, one per trigger
    #[serde(default, rename = "interaction")]
    pub interactions: Vec<InteractionConfig>,
}

impl OverlayConfig {
    /// The interaction flagged as default, if any (first one wins when
    /// the config is invalid; the rule set rejects that case anyway)
    pub fn default_interaction(&self) -> Option<&InteractionConfig> {
        self.interactions.iter().find(|i| i.is_default)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Interactions
// ═══════════════════════════════════════════════════════════════════════════

/// One clickable trigger and the regions it controls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Element id of the clickable trigger
    pub trigger_id: String,

    /// Elements displayed while this trigger is active
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub show_elements: Vec<String>,

    /// Elements hidden when this trigger becomes active
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hide_elements: Vec<String>,

    /// Selected when the diagram first becomes ready
    #[serde(default)]
    pub is_default: bool,

    /// Class added to the trigger while active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_class: Option<String>,

    /// Styles applied to the trigger while active
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub active_styles: StyleMap,

    /// Styles applied to the trigger while inactive
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inactive_styles: StyleMap,
}

// ═══════════════════════════════════════════════════════════════════════════
// Timing
// ═══════════════════════════════════════════════════════════════════════════

/// Transition and readiness timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Fade-out length before a hidden element leaves layout
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,

    /// Delay between displaying an element and raising its opacity
    #[serde(default = "default_show_delay_ms")]
    pub show_delay_ms: u64,

    /// Interval between readiness probes
    #[serde(default = "default_ready_poll_ms")]
    pub ready_poll_ms: u64,

    /// Probes attempted before giving up on the diagram
    #[serde(default = "default_ready_max_attempts")]
    pub ready_max_attempts: u32,

    /// Opacity hint shown while hovering an inactive trigger
    #[serde(default = "default_hover_opacity")]
    pub hover_opacity: String,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fade_ms: default_fade_ms(),
            show_delay_ms: default_show_delay_ms(),
            ready_poll_ms: default_ready_poll_ms(),
            ready_max_attempts: default_ready_max_attempts(),
            hover_opacity: default_hover_opacity(),
        }
    }
}

impl TimingConfig {
    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    pub fn show_delay(&self) -> Duration {
        Duration::from_millis(self.show_delay_ms)
    }

    pub fn ready_poll(&self) -> Duration {
        Duration::from_millis(self.ready_poll_ms)
    }
}

fn default_fade_ms() -> u64 {
    300
}

fn default_show_delay_ms() -> u64 {
    10
}

fn default_ready_poll_ms() -> u64 {
    100
}

fn default_ready_max_attempts() -> u32 {
    50
}

fn default_hover_opacity() -> String {
    "0.8".to_string()
}
