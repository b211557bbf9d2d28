//! # Deeplink Router
//!
//! Resolves incoming deep links (QR codes, push notifications, shared web
//! URLs, typed paths) into typed in-app navigation targets, and builds links
//! back from a screen and its parameters.
//!
//! ## Pipeline
//!
//! 1. **Prefix pruning**: strip one scheme or host prefix (`gesund://`, `https://www.gesund.de`)
//! 2. **Redirects**: ordered legacy rewrites, literal or function rules, first match wins
//! 3. **Actions**: exact-match side-effect links (`action/restart-app`) that can halt,
//!    redirect or navigate
//! 4. **Route matching**: depth-first over a nested route tree with backtracking
//! 5. **Target building**: matched chain plus merged query parameters
//!
//! Steps 2 and 3 repeat until the link stops changing, bounded by an
//! iteration limit.
//!
//! ## Route Patterns
//!
//! - Literal segments (`details`)
//! - Required parameters (`:id`)
//! - Optional parameters (`:category?`)
//!
//! Siblings are tried literal first, then required, then optional.
//!
//! ## Example
//!
//! ```
//! use deeplink_router::{DeepLinkResolver, ParamValue, RedirectTable, RouteNode, RouteTree};
//!
//! let routes = RouteTree::new([
//!     RouteNode::new("Details", "details").with_child(RouteNode::new("ProductDetails", "product/:id")),
//! ]);
//! let resolver = DeepLinkResolver::new(routes)
//!     .with_redirects(RedirectTable::new().with_prefix_rewrite("/produkt", "/details/product"));
//!
//! let resolution = resolver.resolve("/produkt/1581-dulcolax").unwrap();
//! let target = resolution.target().unwrap();
//! assert_eq!(target.route_names(), vec!["Details", "ProductDetails"]);
//! assert_eq!(target.param("id"), Some(&ParamValue::from("1581-dulcolax")));
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod action;
pub mod config;
pub mod error;
pub mod extract;
pub mod gesund;
pub mod link;
pub mod path;
pub mod prefix;
pub mod query;
pub mod redirect;
pub mod resolver;
pub mod route;
pub mod target;

pub use action::{ActionDispatcher, ActionOutcome, DispatchOutcome};
pub use config::Config;
pub use error::{ExtractError, LinkError, ResolveError};
pub use link::{Deliverable, Deliverables, LinkBuilder, PushPayload};
pub use prefix::{Environment, PrefixPruner, RoutePrefix};
pub use query::QueryParams;
pub use redirect::{RedirectAction, RedirectRule, RedirectTable};
pub use resolver::{DeepLinkResolver, Resolution, DEFAULT_MAX_REDIRECT_ITERATIONS};
pub use route::{
    coerce_param, MatchedRoute, ParamType, ParamValue, Params, RouteNode, RouteTree,
};
pub use target::{ResolvedTarget, TargetRoute};
