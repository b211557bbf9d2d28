//! Action links: side-effecting handlers that can short-circuit navigation
//!
//! Actions live in a flat namespace of identifiers such as
//! `action/restart-app`, matched exactly (never by prefix) against the
//! redirected path. A handler may halt navigation, hand back another link to
//! keep resolving, or produce a finished target.

pub mod effects;
pub mod settings;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::path::{normalize_path, split_query, trim_leading_slashes};
use crate::query::QueryParams;
use crate::target::ResolvedTarget;

pub use effects::{Effect, EffectSink, RecordedEffects, TracingEffects};
pub use settings::{
    coerce_setting_value, FileSettings, MemorySettings, SettingValue, SettingsStore,
    GLOBAL_NAMESPACE,
};

/// What a handler returns
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Stop, no navigation
    Halt,
    /// Keep resolving with this link
    Redirect(String),
    /// Navigate straight to this target
    Navigate(ResolvedTarget),
}

/// Result of dispatching a path
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Continue(String),
    Halt,
    Navigate(ResolvedTarget),
}

impl From<ActionOutcome> for DispatchOutcome {
    fn from(outcome: ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Halt => DispatchOutcome::Halt,
            ActionOutcome::Redirect(link) => DispatchOutcome::Continue(link),
            ActionOutcome::Navigate(target) => DispatchOutcome::Navigate(target),
        }
    }
}

/// Capabilities handed to a handler for one invocation
pub struct ActionContext<'a> {
    pub settings: &'a dyn SettingsStore,
    pub effects: &'a dyn EffectSink,
}

/// A registered action
pub trait ActionHandler: Send + Sync {
    fn handle(&self, query: &QueryParams, ctx: &ActionContext<'_>) -> ActionOutcome;
}

impl<F> ActionHandler for F
where
    F: Fn(&QueryParams, &ActionContext<'_>) -> ActionOutcome + Send + Sync,
{
    fn handle(&self, query: &QueryParams, ctx: &ActionContext<'_>) -> ActionOutcome {
        self(query, ctx)
    }
}

/// Exact-match registry of action handlers
#[derive(Clone)]
pub struct ActionDispatcher {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
    settings: Arc<dyn SettingsStore>,
    effects: Arc<dyn EffectSink>,
}

impl ActionDispatcher {
    /// Creates an empty dispatcher over the given capabilities
    pub fn new(settings: Arc<dyn SettingsStore>, effects: Arc<dyn EffectSink>) -> Self {
        Self {
            handlers: HashMap::new(),
            settings,
            effects,
        }
    }

    /// Registers a closure or function as the handler for `id`
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use deeplink_router::action::{
    ///     ActionDispatcher, ActionOutcome, DispatchOutcome, Effect, MemorySettings, RecordedEffects,
    /// };
    /// use deeplink_router::QueryParams;
    ///
    /// let effects = Arc::new(RecordedEffects::new());
    /// let dispatcher = ActionDispatcher::new(Arc::new(MemorySettings::new()), effects.clone())
    ///     .with_action("action/restart-app", |_query, ctx| {
    ///         ctx.effects.emit(Effect::RestartApp);
    ///         ActionOutcome::Halt
    ///     });
    ///
    /// let outcome = dispatcher.dispatch("/action/restart-app", &QueryParams::new());
    /// assert_eq!(outcome, DispatchOutcome::Halt);
    /// assert_eq!(effects.effects(), vec![Effect::RestartApp]);
    /// ```
    pub fn with_action<F>(self, id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&QueryParams, &ActionContext<'_>) -> ActionOutcome + Send + Sync + 'static,
    {
        self.with_handler(id, handler)
    }

    /// Registers any [`ActionHandler`] for `id`
    pub fn with_handler(mut self, id: impl Into<String>, handler: impl ActionHandler + 'static) -> Self {
        let id = canonical_id(&id.into());
        self.handlers.insert(id, Arc::new(handler));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(&canonical_id(id))
    }

    /// Registered identifiers, sorted
    pub fn action_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Dispatches a bare path with already parsed query parameters
    ///
    /// An unregistered path comes back as `Continue(path)` unchanged.
    pub fn dispatch(&self, path: &str, query: &QueryParams) -> DispatchOutcome {
        match self.lookup(path) {
            Some((id, handler)) => self.run(id, handler.as_ref(), query),
            None => DispatchOutcome::Continue(path.to_string()),
        }
    }

    /// Dispatches a full link, splitting off and parsing its query
    ///
    /// An unregistered link comes back as `Continue(link)` unchanged, query included.
    pub fn dispatch_link(&self, link: &str) -> DispatchOutcome {
        let (path, query) = split_query(link);

        match self.lookup(path) {
            Some((id, handler)) => {
                let query = query.map(QueryParams::parse).unwrap_or_default();
                self.run(id, handler.as_ref(), &query)
            }
            None => DispatchOutcome::Continue(link.to_string()),
        }
    }

    fn lookup(&self, path: &str) -> Option<(&str, &Arc<dyn ActionHandler>)> {
        self.handlers
            .get_key_value(&canonical_id(path))
            .map(|(id, handler)| (id.as_str(), handler))
    }

    fn run(&self, id: &str, handler: &dyn ActionHandler, query: &QueryParams) -> DispatchOutcome {
        info!(action = %id, params = query.len(), "running action handler");

        let ctx = ActionContext {
            settings: self.settings.as_ref(),
            effects: self.effects.as_ref(),
        };
        let outcome = handler.handle(query, &ctx);

        debug!(action = %id, ?outcome, "action handler finished");
        outcome.into()
    }
}

impl fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("actions", &self.action_ids())
            .finish()
    }
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(MemorySettings::new()), Arc::new(TracingEffects))
    }
}

/// Identifier form used for lookups: no leading or trailing slash
fn canonical_id(path: &str) -> String {
    trim_leading_slashes(&normalize_path(path)).to_string()
}

/// Writes or reads typed values in the global settings namespace
///
/// Each query parameter is one setting. A non-empty value is classified with
/// [`coerce_setting_value`] and written; an empty value reads the stored
/// value and reports it as [`Effect::SettingReport`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use deeplink_router::action::{
///     apply_settings, ActionDispatcher, MemorySettings, RecordedEffects, SettingValue,
///     SettingsStore, GLOBAL_NAMESPACE,
/// };
/// use deeplink_router::QueryParams;
///
/// let settings = Arc::new(MemorySettings::new());
/// let dispatcher = ActionDispatcher::new(settings.clone(), Arc::new(RecordedEffects::new()))
///     .with_action("action/settings", apply_settings);
///
/// dispatcher.dispatch("action/settings", &QueryParams::parse("showDebugMenu=true"));
/// assert_eq!(settings.get(GLOBAL_NAMESPACE, "showDebugMenu"), Some(SettingValue::Bool(true)));
/// ```
pub fn apply_settings(query: &QueryParams, ctx: &ActionContext<'_>) -> ActionOutcome {
    for (key, raw) in query.iter() {
        if raw.is_empty() {
            let value = ctx.settings.get(GLOBAL_NAMESPACE, key);
            ctx.effects.emit(Effect::SettingReport {
                key: key.to_string(),
                value,
            });
            continue;
        }

        let value = coerce_setting_value(raw);
        match ctx.settings.set(GLOBAL_NAMESPACE, key, value.clone()) {
            Ok(()) => info!(key = %key, value = %value, "setting written"),
            Err(error) => warn!(key = %key, %error, "failed to write setting"),
        }
    }

    ActionOutcome::Halt
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dispatcher() -> (ActionDispatcher, Arc<MemorySettings>, Arc<RecordedEffects>) {
        let settings = Arc::new(MemorySettings::new());
        let effects = Arc::new(RecordedEffects::new());
        let dispatcher = ActionDispatcher::new(settings.clone(), effects.clone())
            .with_action("action/settings", apply_settings)
            .with_action("/action/restart-app/", |_query, ctx| {
                ctx.effects.emit(Effect::RestartApp);
                ActionOutcome::Halt
            })
            .with_action("action/open-cart", |_query, _ctx| {
                ActionOutcome::Redirect("/cart".to_string())
            })
            .with_action("action/open-screen", |query, _ctx| {
                let screen = query.get("screen").unwrap_or("Cart");
                ActionOutcome::Navigate(ResolvedTarget::screen(screen))
            });
        (dispatcher, settings, effects)
    }

    #[test]
    fn test_unregistered_path_continues_unchanged() {
        let (dispatcher, _, effects) = dispatcher();
        assert_eq!(
            dispatcher.dispatch("/pharmacy", &QueryParams::new()),
            DispatchOutcome::Continue("/pharmacy".to_string())
        );
        assert_eq!(
            dispatcher.dispatch_link("/intro?x=1"),
            DispatchOutcome::Continue("/intro?x=1".to_string())
        );
        assert!(effects.effects().is_empty());
    }

    #[test]
    fn test_match_is_exact_not_prefix() {
        let (dispatcher, _, effects) = dispatcher();
        assert_eq!(
            dispatcher.dispatch("/action/restart-app/now", &QueryParams::new()),
            DispatchOutcome::Continue("/action/restart-app/now".to_string())
        );
        assert_eq!(
            dispatcher.dispatch("/action", &QueryParams::new()),
            DispatchOutcome::Continue("/action".to_string())
        );
        assert!(effects.effects().is_empty());
    }

    #[test]
    fn test_identifiers_ignore_surrounding_slashes() {
        let (dispatcher, _, effects) = dispatcher();
        assert!(dispatcher.contains("action/restart-app"));
        assert_eq!(dispatcher.dispatch_link("action/restart-app/"), DispatchOutcome::Halt);
        assert_eq!(effects.take(), vec![Effect::RestartApp]);
    }

    #[test]
    fn test_redirect_and_navigate_outcomes() {
        let (dispatcher, _, _) = dispatcher();
        assert_eq!(
            dispatcher.dispatch_link("/action/open-cart?ignored=1"),
            DispatchOutcome::Continue("/cart".to_string())
        );
        assert_eq!(
            dispatcher.dispatch_link("/action/open-screen?screen=Profile"),
            DispatchOutcome::Navigate(ResolvedTarget::screen("Profile"))
        );
    }

    #[test]
    fn test_settings_writes_typed_values() {
        let (dispatcher, settings, _) = dispatcher();
        let outcome = dispatcher.dispatch_link("/action/settings?debug=y&retries=3&tier=staging");

        assert_eq!(outcome, DispatchOutcome::Halt);
        assert_eq!(settings.get(GLOBAL_NAMESPACE, "debug"), Some(SettingValue::Bool(true)));
        assert_eq!(settings.get(GLOBAL_NAMESPACE, "retries"), Some(SettingValue::Int(3)));
        assert_eq!(
            settings.get(GLOBAL_NAMESPACE, "tier"),
            Some(SettingValue::Text("staging".into()))
        );
    }

    #[test]
    fn test_settings_empty_value_reads_instead_of_writing() {
        let (dispatcher, settings, effects) = dispatcher();
        settings.set(GLOBAL_NAMESPACE, "tier", SettingValue::Text("prod".into())).unwrap();

        dispatcher.dispatch_link("/action/settings?tier=&missing=");

        assert_eq!(
            settings.get(GLOBAL_NAMESPACE, "tier"),
            Some(SettingValue::Text("prod".into()))
        );
        assert_eq!(
            effects.take(),
            vec![
                Effect::SettingReport {
                    key: "tier".into(),
                    value: Some(SettingValue::Text("prod".into())),
                },
                Effect::SettingReport {
                    key: "missing".into(),
                    value: None,
                },
            ]
        );
    }

    #[test]
    fn test_handlers_are_not_idempotent() {
        let (dispatcher, _, effects) = dispatcher();
        dispatcher.dispatch_link("/action/restart-app");
        dispatcher.dispatch_link("/action/restart-app");
        assert_eq!(effects.effects().len(), 2);
    }
}
