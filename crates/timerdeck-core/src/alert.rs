//! Alert configuration and the dispatcher seam.
//!
//! The engine decides *when* a completion alert plays; how it is rendered
//! (tone, speech, desktop notification) is somebody else's problem behind
//! [`AlertDispatcher`]. The engine never issues two overlapping plays for the
//! same timer, and always cancels before mutating acknowledged state.

use serde::{Deserialize, Serialize};

/// Placeholder expanded to the timer label when an utterance is rendered.
pub const UTTERANCE_PLACEHOLDER: &str = "{timer name}";

/// How many times a completion alert repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    /// Repeat a fixed number of times.
    Times(u32),
    /// Repeat until acknowledged.
    Infinite,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Times(default_repeat_times())
    }
}

/// Per-timer alert configuration. Attached to countdown timers only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub repeat: Repeat,
    /// Seconds between repeats.
    #[serde(default = "default_wait_between_secs")]
    pub wait_between_secs: u64,
    /// Announcement text; `{timer name}` expands to the timer label.
    #[serde(default = "default_utterance_template")]
    pub utterance_template: String,
}

// Default functions
fn default_enabled() -> bool {
    true
}
fn default_repeat_times() -> u32 {
    3
}
fn default_wait_between_secs() -> u64 {
    10
}
fn default_utterance_template() -> String {
    format!("{UTTERANCE_PLACEHOLDER} is done")
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            repeat: Repeat::default(),
            wait_between_secs: default_wait_between_secs(),
            utterance_template: default_utterance_template(),
        }
    }
}

/// Expand the `{timer name}` placeholder in an utterance template.
pub fn render_utterance(template: &str, label: &str) -> String {
    template.replace(UTTERANCE_PLACEHOLDER, label)
}

/// Consumer of the engine's alert commands.
///
/// Implementations may keep internal playback state; the engine only promises
/// that `cancel_alert` is called before acknowledged state becomes visible to
/// observers, and that `play_alert` fires at most once per completion.
pub trait AlertDispatcher {
    /// Begin alerting for a finished timer.
    fn play_alert(&self, label: &str, config: &AlertConfig);
    /// Stop whatever alert is currently sounding.
    fn cancel_alert(&self);
}

/// Dispatcher that ignores every command. Library default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAlerts;

impl AlertDispatcher for NullAlerts {
    fn play_alert(&self, _label: &str, _config: &AlertConfig) {}
    fn cancel_alert(&self) {}
}
