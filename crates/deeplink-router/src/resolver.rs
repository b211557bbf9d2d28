//! The resolution pipeline
//!
//! ```text
//! raw link → prune prefix → ┌ redirect pass → action dispatch ┐ → match route → build target
//!                           └──────── until unchanged ────────┘
//! ```

use tracing::{debug, warn};

use crate::action::{ActionDispatcher, DispatchOutcome};
use crate::error::{LinkError, ResolveError};
use crate::link::LinkBuilder;
use crate::path::{normalize_link, split_query};
use crate::prefix::PrefixPruner;
use crate::query::QueryParams;
use crate::redirect::RedirectTable;
use crate::route::{Params, RouteTree};
use crate::target::{build_target, ResolvedTarget};

/// Default bound on redirect/dispatch passes per resolution
pub const DEFAULT_MAX_REDIRECT_ITERATIONS: usize = 5;

/// Default scheme used for reverse links
pub const DEFAULT_SCHEME: &str = "gesund://";

/// Successful outcome of a forward resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Navigate to this target
    Navigate(ResolvedTarget),
    /// An action consumed the link; nothing to navigate to
    Halted,
    /// No route matches the link
    NotFound,
}

impl Resolution {
    pub fn target(&self) -> Option<&ResolvedTarget> {
        match self {
            Resolution::Navigate(target) => Some(target),
            _ => None,
        }
    }

    pub fn into_target(self) -> Option<ResolvedTarget> {
        match self {
            Resolution::Navigate(target) => Some(target),
            _ => None,
        }
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, Resolution::Halted)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }
}

/// Resolves raw deep links into navigation targets
///
/// All tables are built once and read-only afterwards; the resolver can be
/// shared across threads. Action handlers may still have side effects.
///
/// # Examples
///
/// ```
/// use deeplink_router::{
///     DeepLinkResolver, Environment, PrefixPruner, RedirectTable, Resolution, RouteNode, RoutePrefix,
///     RouteTree,
/// };
///
/// let resolver = DeepLinkResolver::new(RouteTree::new([RouteNode::new("Cart", "cart")]))
///     .with_prefixes(PrefixPruner::new([RoutePrefix::new("myapp://")], Environment::Production))
///     .with_redirects(RedirectTable::new().with_literal("/warenkorb", "/cart"));
///
/// let resolution = resolver.resolve("myapp://warenkorb").unwrap();
/// assert_eq!(resolution.target().and_then(|t| t.screen_name()), Some("Cart"));
///
/// assert_eq!(resolver.resolve("myapp://nothing").unwrap(), Resolution::NotFound);
/// ```
#[derive(Debug, Clone)]
pub struct DeepLinkResolver {
    prefixes: PrefixPruner,
    redirects: RedirectTable,
    actions: ActionDispatcher,
    routes: RouteTree,
    max_redirect_iterations: usize,
    scheme: String,
}

impl DeepLinkResolver {
    /// Creates a resolver with no prefixes, redirects or actions
    ///
    /// Sibling routes with identical shapes are reported with `warn!`.
    pub fn new(routes: RouteTree) -> Self {
        for ambiguity in routes.ambiguities() {
            warn!(%ambiguity, "ambiguous sibling routes");
        }

        Self {
            prefixes: PrefixPruner::default(),
            redirects: RedirectTable::new(),
            actions: ActionDispatcher::default(),
            routes,
            max_redirect_iterations: DEFAULT_MAX_REDIRECT_ITERATIONS,
            scheme: DEFAULT_SCHEME.to_string(),
        }
    }

    pub fn with_prefixes(mut self, prefixes: PrefixPruner) -> Self {
        self.prefixes = prefixes;
        self
    }

    pub fn with_redirects(mut self, redirects: RedirectTable) -> Self {
        self.redirects = redirects;
        self
    }

    pub fn with_actions(mut self, actions: ActionDispatcher) -> Self {
        self.actions = actions;
        self
    }

    /// Bound on redirect/dispatch passes, at least 1
    pub fn with_max_redirect_iterations(mut self, limit: usize) -> Self {
        self.max_redirect_iterations = limit.max(1);
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn routes(&self) -> &RouteTree {
        &self.routes
    }

    pub fn redirects(&self) -> &RedirectTable {
        &self.redirects
    }

    pub fn actions(&self) -> &ActionDispatcher {
        &self.actions
    }

    pub fn max_redirect_iterations(&self) -> usize {
        self.max_redirect_iterations
    }

    /// Resolves a raw link
    ///
    /// Each pass applies one redirect rule and then offers the link to the
    /// action dispatcher. Passes repeat until a pass leaves the link
    /// unchanged; a link still changing after the last permitted pass fails
    /// with [`ResolveError::RedirectLoopExceeded`].
    pub fn resolve(&self, raw: &str) -> Result<Resolution, ResolveError> {
        let mut current = normalize_link(&self.prefixes.prune(raw));
        debug!(raw, link = %current, "pruned link");

        let mut settled = false;
        for pass in 1..=self.max_redirect_iterations {
            let redirected = normalize_link(&self.redirects.resolve(&current));

            let next = match self.actions.dispatch_link(&redirected) {
                DispatchOutcome::Halt => return Ok(Resolution::Halted),
                DispatchOutcome::Navigate(target) => return Ok(Resolution::Navigate(target)),
                DispatchOutcome::Continue(link) => normalize_link(&link),
            };

            if next == current {
                debug!(pass, link = %current, "redirects settled");
                settled = true;
                break;
            }
            current = next;
        }

        if !settled {
            warn!(
                raw,
                link = %current,
                limit = self.max_redirect_iterations,
                "redirect loop exceeded"
            );
            return Err(ResolveError::RedirectLoopExceeded {
                path: raw.to_string(),
                limit: self.max_redirect_iterations,
            });
        }

        let (path, query) = split_query(&current);
        let query = query.map(QueryParams::parse).unwrap_or_default();

        Ok(match self.routes.match_path(path) {
            Some(chain) => Resolution::Navigate(build_target(chain, &query)),
            None => Resolution::NotFound,
        })
    }

    /// Reverse links using this resolver's route table and scheme
    pub fn link_builder(&self) -> LinkBuilder<'_> {
        LinkBuilder::new(&self.routes, &self.scheme)
    }

    pub fn build_path(&self, screen: &str, params: &Params) -> Result<String, LinkError> {
        self.routes.build_path(screen, params)
    }
}
