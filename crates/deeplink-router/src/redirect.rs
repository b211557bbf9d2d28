//! Legacy-path redirects
//!
//! An ordered table of `key → action` rules. One pass applies the **first**
//! rule whose key is a segment-respecting prefix of the path, then stops.
//! Chains of rewrites are resolved by re-running passes until the path stops
//! changing, bounded by an iteration limit.
//!
//! Rules see the base path only. The query of the incoming link is carried
//! over to the rewritten link; when a rule produces its own query, both are
//! merged and the rule's value wins for a key present in both.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::path::{is_segment_prefix, normalize_link, normalize_path, split_query};
use crate::query::QueryParams;

/// Pure rewrite function used by [`RedirectAction::Rule`]
///
/// Receives the normalized base path (no query). Must be total: when its own
/// finer pattern does not apply it returns the input unchanged. The result may
/// carry a query of its own.
pub type RedirectFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// What a matching redirect rule does to the path
#[derive(Clone)]
pub enum RedirectAction {
    /// Replace the base path with this one
    Literal(String),
    /// Compute the new link from the base path
    Rule(RedirectFn),
}

impl RedirectAction {
    pub fn literal(to: impl Into<String>) -> Self {
        RedirectAction::Literal(to.into())
    }

    pub fn rule<F>(rewrite: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        RedirectAction::Rule(Arc::new(rewrite))
    }

    /// Rule that swaps the leading `from` prefix for `to`, keeping the rest
    ///
    /// # Examples
    ///
    /// ```
    /// use deeplink_router::RedirectAction;
    ///
    /// let action = RedirectAction::replace_prefix("/produkt", "/details/product");
    /// assert_eq!(action.apply("/produkt/1581-dulcolax"), "/details/product/1581-dulcolax");
    /// assert_eq!(action.apply("/other"), "/other");
    /// ```
    pub fn replace_prefix(from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();

        Self::rule(move |path| match path.strip_prefix(from.as_str()) {
            Some(rest) if is_segment_prefix(path, &from) => format!("{}{}", to, rest),
            _ => path.to_string(),
        })
    }

    pub fn apply(&self, path: &str) -> String {
        match self {
            RedirectAction::Literal(target) => target.clone(),
            RedirectAction::Rule(rewrite) => rewrite(path),
        }
    }
}

impl fmt::Debug for RedirectAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectAction::Literal(target) => f.debug_tuple("Literal").field(target).finish(),
            RedirectAction::Rule(_) => f.write_str("Rule(<fn>)"),
        }
    }
}

/// One entry of the redirect table
#[derive(Debug, Clone)]
pub struct RedirectRule {
    /// Path prefix the rule is keyed on, e.g. `/produkt`
    pub key: String,
    pub action: RedirectAction,
}

impl RedirectRule {
    pub fn new(key: impl Into<String>, action: RedirectAction) -> Self {
        Self {
            key: key.into(),
            action,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        is_segment_prefix(path, &self.key)
    }
}

/// Ordered redirect rules; more specific keys must come first
#[derive(Debug, Clone, Default)]
pub struct RedirectTable {
    rules: Vec<RedirectRule>,
}

impl RedirectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule (functional builder)
    pub fn with_rule(mut self, rule: RedirectRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends a literal `from → to` rule
    pub fn with_literal(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.with_rule(RedirectRule::new(from, RedirectAction::literal(to)))
    }

    /// Appends a function rule keyed on `key`
    pub fn with_function<F>(self, key: impl Into<String>, rewrite: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.with_rule(RedirectRule::new(key, RedirectAction::rule(rewrite)))
    }

    /// Appends a rule keyed on `from` that swaps that prefix for `to`
    pub fn with_prefix_rewrite(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let action = RedirectAction::replace_prefix(from.clone(), to);
        self.with_rule(RedirectRule::new(from, action))
    }

    /// Appends every rule of `other`, after the rules already present
    pub fn extended(mut self, other: RedirectTable) -> Self {
        self.rules.extend(other.rules);
        self
    }

    pub fn rules(&self) -> &[RedirectRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies at most one rule to `link`
    ///
    /// The base path is compared with its trailing slash removed. Without a
    /// matching rule, or when the rule echoes its input, the link comes back
    /// unchanged. Otherwise the link's query is carried over to the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use deeplink_router::RedirectTable;
    ///
    /// let table = RedirectTable::new()
    ///     .with_literal("/home", "pharmacy")
    ///     .with_literal("/start", "/home");
    ///
    /// assert_eq!(table.resolve("/home/"), "pharmacy");
    /// assert_eq!(table.resolve("/home?utm_source=push"), "pharmacy?utm_source=push");
    /// // Only one rule per pass
    /// assert_eq!(table.resolve("/start"), "/home");
    /// assert_eq!(table.resolve("/homepage"), "/homepage");
    /// ```
    pub fn resolve(&self, link: &str) -> String {
        let (raw_path, query) = split_query(link);
        let path = normalize_path(raw_path);

        let Some(rule) = self.rules.iter().find(|rule| rule.matches(&path)) else {
            return link.to_string();
        };

        let rewritten = rule.action.apply(&path);
        if rewritten == *path {
            return link.to_string();
        }

        debug!(from = %path, to = %rewritten, key = %rule.key, "redirect rule fired");
        carry_query(rewritten, query)
    }

    /// Re-applies [`resolve`](Self::resolve) until the link stops changing
    ///
    /// Runs at most `limit` passes; a pass that leaves the link unchanged ends
    /// the loop. Fails when the last permitted pass still changed it.
    ///
    /// # Examples
    ///
    /// ```
    /// use deeplink_router::{RedirectTable, ResolveError};
    ///
    /// let table = RedirectTable::new()
    ///     .with_literal("/start", "/home")
    ///     .with_literal("/home", "/pharmacy");
    /// assert_eq!(table.resolve_fixed_point("/start", 5).unwrap(), "/pharmacy");
    ///
    /// let cyclic = RedirectTable::new().with_literal("/a", "/b").with_literal("/b", "/a");
    /// assert!(matches!(
    ///     cyclic.resolve_fixed_point("/a", 5),
    ///     Err(ResolveError::RedirectLoopExceeded { .. })
    /// ));
    /// ```
    pub fn resolve_fixed_point(&self, path: &str, limit: usize) -> Result<String, ResolveError> {
        let mut current = normalize_link(path);

        for _ in 0..limit.max(1) {
            let next = normalize_link(&self.resolve(&current));
            if next == current {
                return Ok(current);
            }
            current = next;
        }

        warn!(path = %path, limit, "redirect rules did not converge");
        Err(ResolveError::RedirectLoopExceeded {
            path: path.to_string(),
            limit,
        })
    }
}

/// Appends the incoming query to a rewritten link
///
/// A query produced by the rule is merged on top of the incoming one.
fn carry_query(rewritten: String, incoming: Option<&str>) -> String {
    let incoming = match incoming {
        Some(query) if !query.is_empty() => query,
        _ => return rewritten,
    };

    let (path, produced) = split_query(&rewritten);
    match produced {
        Some(produced) if !produced.is_empty() => {
            let mut merged = QueryParams::parse(incoming);
            for (key, value) in QueryParams::parse(produced).iter() {
                merged.insert(key, value);
            }
            format!("{}?{}", path, merged.to_query_string())
        }
        _ => format!("{}?{}", path, incoming),
    }
}
