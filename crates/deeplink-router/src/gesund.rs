//! The gesund.de app's link tables
//!
//! Prefixes, legacy redirects, action links and the route tree used by the
//! app. Redirect rules that need code (capture groups, UUID checks) live here
//! rather than in `deeplinks.toml`. Rules match base paths; the incoming query
//! is carried over by the redirect table.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::action::{
    apply_settings, ActionContext, ActionDispatcher, ActionOutcome, Effect, EffectSink,
    SettingsStore,
};
use crate::prefix::{Environment, PrefixPruner, RoutePrefix};
use crate::query::QueryParams;
use crate::redirect::RedirectTable;
use crate::resolver::DeepLinkResolver;
use crate::route::{ParamType, RouteNode, RouteTree};
use crate::target::{ResolvedTarget, TargetRoute};

pub const GESUND_SCHEME: &str = "gesund://";

static QRCODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/qrcode/([^/]+)$").unwrap());

static PHARMACY_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/pharmacy/([0-9a-fA-F-]{36})(?:/main)?$").unwrap());

static PRODUKTE_CATEGORY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/produkte/[^/]+/(\d+)$").unwrap());

/// Scheme and host prefixes, most specific first
pub fn prefixes() -> Vec<RoutePrefix> {
    vec![
        RoutePrefix::new(GESUND_SCHEME),
        RoutePrefix::new("https://www.gesund.de"),
        RoutePrefix::new("https://gesund.de"),
        RoutePrefix::new("gesund-dev://").only_in([Environment::Development]),
        RoutePrefix::new("https://staging.gesund.de")
            .only_in([Environment::Development, Environment::Staging]),
    ]
}

/// Legacy path redirects in precedence order
pub fn redirects() -> RedirectTable {
    RedirectTable::new()
        .with_literal("/legacy-home", "/home")
        .with_prefix_rewrite("/home/category", "/pharmacy/category")
        .with_literal("/home", "pharmacy")
        .with_prefix_rewrite("/produkt", "/details/product")
        .with_function("/produkte", produkte_category)
        .with_prefix_rewrite("/category", "/pharmacy/category")
        .with_function("/qrcode", qrcode_to_intro)
        .with_literal("/pharmacy/main", "pharmacy")
        .with_function("/pharmacy", pharmacy_details)
        .with_literal("/warenkorb", "/cart")
}

/// `/produkte/<slug>/<id>` → `/pharmacy/products/<id>`
fn produkte_category(path: &str) -> String {
    match PRODUKTE_CATEGORY_REGEX.captures(path) {
        Some(caps) => format!("/pharmacy/products/{}", &caps[1]),
        None => path.to_string(),
    }
}

/// `/qrcode/<uuid>` → intro screen that adds the pharmacy afterwards
fn qrcode_to_intro(path: &str) -> String {
    let Some(id) = QRCODE_REGEX
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str())
        .filter(|id| Uuid::parse_str(id).is_ok())
    else {
        return path.to_string();
    };

    let query = QueryParams::new()
        .with("fallbackUrl", format!("/details/pharmacy?pharmacyIdToAdd={}", id))
        .with("pharmacyIdToAdd", id);

    format!("/intro?{}", query.to_query_string())
}

/// `/pharmacy/<uuid>` and `/pharmacy/<uuid>/main` → pharmacy details
fn pharmacy_details(path: &str) -> String {
    match PHARMACY_ID_REGEX.captures(path) {
        Some(caps) if Uuid::parse_str(&caps[1]).is_ok() => {
            format!("/details/pharmacy/{}", &caps[1])
        }
        _ => path.to_string(),
    }
}

fn restart_app(_query: &QueryParams, ctx: &ActionContext<'_>) -> ActionOutcome {
    ctx.effects.emit(Effect::RestartApp);
    ActionOutcome::Halt
}

fn show_notification(query: &QueryParams, ctx: &ActionContext<'_>) -> ActionOutcome {
    ctx.effects.emit(Effect::Notification {
        title: query.get("title").unwrap_or_default().to_string(),
        body: query.get("body").unwrap_or_default().to_string(),
    });
    ActionOutcome::Halt
}

/// Emits an event; continues with `next` when given
fn track(query: &QueryParams, ctx: &ActionContext<'_>) -> ActionOutcome {
    let name = query.get("event").unwrap_or("deeplink_opened").to_string();
    let properties = query
        .iter()
        .filter(|(key, _)| !matches!(*key, "event" | "next"))
        .collect();
    ctx.effects.emit(Effect::Event { name, properties });

    match query.get("next") {
        Some(next) if !next.is_empty() => ActionOutcome::Redirect(next.to_string()),
        _ => ActionOutcome::Halt,
    }
}

fn open_product(query: &QueryParams, _ctx: &ActionContext<'_>) -> ActionOutcome {
    match query.get("id").filter(|id| !id.is_empty()) {
        Some(id) => ActionOutcome::Navigate(ResolvedTarget::new(vec![
            TargetRoute::new("Details"),
            TargetRoute::new("ProductDetails"),
        ])
        .with_param("id", id)),
        None => ActionOutcome::Halt,
    }
}

/// Action links of the app
pub fn actions(settings: Arc<dyn SettingsStore>, effects: Arc<dyn EffectSink>) -> ActionDispatcher {
    ActionDispatcher::new(settings, effects)
        .with_action("action/restart-app", restart_app)
        .with_action("action/settings", apply_settings)
        .with_action("action/show-notification", show_notification)
        .with_action("action/track", track)
        .with_action("action/open-product", open_product)
}

/// Screen hierarchy of the app
pub fn routes() -> RouteTree {
    RouteTree::new([
        RouteNode::new("Intro", "intro"),
        RouteNode::new("Pharmacy", "pharmacy")
            .with_initial_route("PharmacyHome")
            .with_children([
                RouteNode::new("PharmacyHome", ""),
                RouteNode::new("Products", "products/:category?")
                    .with_parse("category", ParamType::Number),
                RouteNode::new("Category", "category/:id").with_parse("id", ParamType::Number),
                RouteNode::new("PharmacySearch", "search"),
            ]),
        RouteNode::new("Details", "details").with_children([
            RouteNode::new("ProductDetails", "product/:id").with_parse("id", ParamType::String),
            RouteNode::new("PharmacyDetails", "pharmacy/:id?"),
        ]),
        RouteNode::new("Cart", "cart"),
        RouteNode::new("Profile", "profile")
            .with_initial_route("ProfileHome")
            .with_children([
                RouteNode::new("ProfileHome", ""),
                RouteNode::new("Orders", "orders"),
                RouteNode::new("OrderDetails", "orders/:orderId"),
                RouteNode::new("Settings", "settings")
                    .with_parse("showDebugMenu", ParamType::Boolean),
                RouteNode::new("Agb", "agb"),
            ]),
    ])
}

/// Resolver wired with the app's tables
pub fn resolver(
    environment: Environment,
    settings: Arc<dyn SettingsStore>,
    effects: Arc<dyn EffectSink>,
) -> DeepLinkResolver {
    DeepLinkResolver::new(routes())
        .with_prefixes(PrefixPruner::new(prefixes(), environment))
        .with_redirects(redirects())
        .with_actions(actions(settings, effects))
        .with_scheme(GESUND_SCHEME)
}
