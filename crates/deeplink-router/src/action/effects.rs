//! Side effects requested by action handlers
//!
//! Handlers never touch the device directly; they emit [`Effect`]s into an
//! injected [`EffectSink`]. The app shell performs them, tests record them.

use std::sync::Mutex;

use serde::Serialize;
use tracing::info;

use super::settings::SettingValue;
use crate::query::QueryParams;

/// A fire-and-forget effect
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Restart the app process
    RestartApp,
    /// Analytics or app-bus event
    Event {
        name: String,
        properties: QueryParams,
    },
    /// Local notification shown to the user
    Notification { title: String, body: String },
    /// Current value of a setting, reported for read-only settings links
    SettingReport {
        key: String,
        value: Option<SettingValue>,
    },
}

/// Capability used by handlers to request effects
pub trait EffectSink: Send + Sync {
    fn emit(&self, effect: Effect);
}

/// Default sink: logs every effect and performs nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEffects;

impl EffectSink for TracingEffects {
    fn emit(&self, effect: Effect) {
        info!(?effect, "action effect");
    }
}

/// Sink that keeps every effect in emission order
#[derive(Debug, Default)]
pub struct RecordedEffects {
    effects: Mutex<Vec<Effect>>,
}

impl RecordedEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the effects emitted so far
    pub fn effects(&self) -> Vec<Effect> {
        self.effects
            .lock()
            .map(|effects| effects.clone())
            .unwrap_or_default()
    }

    /// Drains the recorded effects
    pub fn take(&self) -> Vec<Effect> {
        self.effects
            .lock()
            .map(|mut effects| std::mem::take(&mut *effects))
            .unwrap_or_default()
    }
}

impl EffectSink for RecordedEffects {
    fn emit(&self, effect: Effect) {
        if let Ok(mut effects) = self.effects.lock() {
            effects.push(effect);
        }
    }
}
