//! Resolved navigation targets
//!
//! A [`ResolvedTarget`] mirrors the nested navigator structure: one
//! [`TargetRoute`] per node on the chain from a root route to the leaf screen.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::query::QueryParams;
use crate::route::{coerce_param, MatchedRoute, ParamValue, Params};

/// One level of a resolved target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRoute {
    pub name: String,
    pub params: Params,
}

impl TargetRoute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Params::new(),
        }
    }
}

/// Final output of a forward resolution, root first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTarget {
    pub routes: Vec<TargetRoute>,
}

impl ResolvedTarget {
    pub fn new(routes: Vec<TargetRoute>) -> Self {
        Self { routes }
    }

    /// A single-level target, as produced by action handlers
    pub fn screen(name: impl Into<String>) -> Self {
        Self::new(vec![TargetRoute::new(name)])
    }

    /// Adds a parameter to the leaf route
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        if let Some(leaf) = self.routes.last_mut() {
            leaf.params.insert(key.into(), value.into());
        }
        self
    }

    pub fn leaf(&self) -> Option<&TargetRoute> {
        self.routes.last()
    }

    /// Name of the leaf screen
    pub fn screen_name(&self) -> Option<&str> {
        self.leaf().map(|route| route.name.as_str())
    }

    /// Parameter of the leaf screen
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.leaf().and_then(|route| route.params.get(key))
    }

    pub fn route_names(&self) -> Vec<&str> {
        self.routes.iter().map(|route| route.name.as_str()).collect()
    }

    /// Nested navigation state: each level holds the next one under `state`
    ///
    /// ```
    /// use deeplink_router::ResolvedTarget;
    /// use deeplink_router::target::TargetRoute;
    /// use serde_json::json;
    ///
    /// let target = ResolvedTarget::new(vec![
    ///     TargetRoute::new("Details"),
    ///     TargetRoute::new("ProductDetails"),
    /// ])
    /// .with_param("id", "1581-dulcolax");
    ///
    /// assert_eq!(
    ///     target.to_navigation_state(),
    ///     json!({
    ///         "routes": [{
    ///             "name": "Details",
    ///             "state": {
    ///                 "routes": [{ "name": "ProductDetails", "params": { "id": "1581-dulcolax" } }]
    ///             }
    ///         }]
    ///     })
    /// );
    /// ```
    pub fn to_navigation_state(&self) -> Value {
        self.routes
            .iter()
            .rev()
            .fold(None, |inner: Option<Value>, route| {
                let mut entry = Map::new();
                entry.insert("name".into(), Value::String(route.name.clone()));
                if !route.params.is_empty() {
                    entry.insert("params".into(), json!(route.params));
                }
                if let Some(state) = inner {
                    entry.insert("state".into(), state);
                }
                Some(json!({ "routes": [Value::Object(entry)] }))
            })
            .unwrap_or_else(|| json!({ "routes": [] }))
    }
}

/// Builds the target from a match chain and the link's query parameters
///
/// Query parameters are merged into the leaf. A query key that a path
/// segment already captured anywhere on the chain is ignored. Query values
/// named in the leaf's parse map are coerced; values that do not coerce keep
/// their text.
pub fn build_target(chain: Vec<MatchedRoute<'_>>, query: &QueryParams) -> ResolvedTarget {
    let leaf_parse = chain.last().map(|matched| matched.node.parse().clone());
    let captured: Vec<String> = chain
        .iter()
        .flat_map(|matched| matched.params.keys().cloned())
        .collect();

    let mut routes: Vec<TargetRoute> = chain
        .into_iter()
        .map(|matched| TargetRoute {
            name: matched.node.name().to_string(),
            params: matched.params,
        })
        .collect();

    if let (Some(leaf), Some(parse)) = (routes.last_mut(), leaf_parse) {
        for (key, raw) in query.iter() {
            if captured.iter().any(|name| name == key) {
                continue;
            }
            let value = parse
                .get(key)
                .and_then(|ty| coerce_param(raw, *ty))
                .unwrap_or_else(|| ParamValue::Text(raw.to_string()));
            leaf.params.insert(key.to_string(), value);
        }
    }

    ResolvedTarget::new(routes)
}
