// File: src/config.rs
// Purpose: Deep-link tables loaded from deeplinks.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::action::ActionDispatcher;
use crate::prefix::{Environment, PrefixPruner, RoutePrefix};
use crate::redirect::RedirectTable;
use crate::resolver::{DeepLinkResolver, DEFAULT_MAX_REDIRECT_ITERATIONS, DEFAULT_SCHEME};
use crate::route::{ParamType, RouteNode, RouteTree};

/// Resolver configuration
///
/// Only data lives here. Function-valued redirects and action handlers are
/// registered in code and combined with these tables in
/// [`Config::build_resolver`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Deployment tier, selects which prefixes are active
    #[serde(default)]
    pub environment: Environment,

    /// Scheme used for generated links (default: "gesund://")
    #[serde(default = "default_scheme")]
    pub scheme: String,

    #[serde(default = "default_max_redirect_iterations")]
    pub max_redirect_iterations: usize,

    #[serde(default)]
    pub prefixes: Vec<RoutePrefix>,

    /// Literal redirects, kept in file order
    #[serde(default)]
    pub redirects: Vec<RedirectConfig>,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// `[[redirects]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectConfig {
    pub from: String,
    pub to: String,
}

/// `[[routes]]` entry, nested through `[[routes.children]]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub name: String,

    /// Pattern relative to the parent; empty for an index route
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub parse: HashMap<String, ParamType>,

    #[serde(default)]
    pub initial_route: Option<String>,

    #[serde(default)]
    pub children: Vec<RouteConfig>,
}

impl RouteConfig {
    pub fn to_node(&self) -> RouteNode {
        let mut node = RouteNode::new(self.name.clone(), self.path.clone());

        for (param, ty) in &self.parse {
            node = node.with_parse(param.clone(), *ty);
        }
        if let Some(initial) = &self.initial_route {
            node = node.with_initial_route(initial.clone());
        }

        node.with_children(self.children.iter().map(RouteConfig::to_node))
    }
}

// Default values
fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

fn default_max_redirect_iterations() -> usize {
    DEFAULT_MAX_REDIRECT_ITERATIONS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            scheme: default_scheme(),
            max_redirect_iterations: default_max_redirect_iterations(),
            prefixes: Vec::new(),
            redirects: Vec::new(),
            routes: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Self::from_toml_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from default path (./deeplinks.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("deeplinks.toml")
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Prefixes active in the configured environment
    pub fn prefix_pruner(&self) -> PrefixPruner {
        PrefixPruner::new(self.prefixes.iter().cloned(), self.environment)
    }

    pub fn redirect_table(&self) -> RedirectTable {
        self.redirects
            .iter()
            .fold(RedirectTable::new(), |table, redirect| {
                table.with_literal(redirect.from.clone(), redirect.to.clone())
            })
    }

    pub fn route_tree(&self) -> RouteTree {
        RouteTree::new(self.routes.iter().map(RouteConfig::to_node))
    }

    /// Builds a resolver from the file tables plus rules registered in code
    ///
    /// `extra_redirects` are appended after the literal redirects of the file.
    pub fn build_resolver(&self, extra_redirects: RedirectTable, actions: ActionDispatcher) -> DeepLinkResolver {
        DeepLinkResolver::new(self.route_tree())
            .with_prefixes(self.prefix_pruner())
            .with_redirects(self.redirect_table().extended(extra_redirects))
            .with_actions(actions)
            .with_max_redirect_iterations(self.max_redirect_iterations)
            .with_scheme(self.scheme.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Resolution;
    use std::io::Write;

    const SAMPLE: &str = r#"
        environment = "staging"
        max_redirect_iterations = 3

        [[prefixes]]
        value = "gesund://"

        [[prefixes]]
        value = "https://staging.gesund.de"
        environments = ["staging"]

        [[redirects]]
        from = "/warenkorb"
        to = "/cart"

        [[routes]]
        name = "Cart"
        path = "cart"

        [[routes]]
        name = "Details"
        path = "details"

        [[routes.children]]
        name = "ProductDetails"
        path = "product/:id"
        parse = { id = "string" }
    "#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.scheme, "gesund://");
        assert_eq!(config.max_redirect_iterations, 5);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_empty_config() {
        let config = toml::from_str::<Config>("").unwrap_or_default();
        assert_eq!(config.scheme, "gesund://");
        assert_eq!(config.max_redirect_iterations, 5);
    }

    #[test]
    fn test_parse_tables() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.prefixes.len(), 2);
        assert_eq!(config.routes[1].children[0].parse.get("id"), Some(&ParamType::String));

        let pruner = config.prefix_pruner();
        assert_eq!(pruner.prefixes().len(), 2);

        let production = config.clone().with_environment(Environment::Production);
        assert_eq!(production.prefix_pruner().prefixes(), &["gesund://".to_string()]);
    }

    #[test]
    fn test_build_resolver_from_file_tables() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        let resolver = config.build_resolver(RedirectTable::new(), ActionDispatcher::default());

        assert_eq!(resolver.max_redirect_iterations(), 3);

        let cart = resolver.resolve("https://staging.gesund.de/warenkorb").unwrap();
        assert_eq!(cart.target().and_then(|t| t.screen_name()), Some("Cart"));

        let product = resolver.resolve("gesund://details/product/1581-dulcolax").unwrap();
        assert_eq!(
            product.target().and_then(|t| t.param("id")).map(ToString::to_string),
            Some("1581-dulcolax".to_string())
        );

        assert_eq!(resolver.resolve("gesund://details").unwrap(), Resolution::NotFound);
    }

    #[test]
    fn test_load_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Config::load(dir.path().join("deeplinks.toml")).unwrap();
        assert_eq!(missing.max_redirect_iterations, 5);

        let empty = dir.path().join("empty.toml");
        fs::File::create(&empty).unwrap().write_all(b"  \n").unwrap();
        assert_eq!(Config::load(&empty).unwrap().scheme, "gesund://");
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deeplinks.toml");
        fs::write(&path, "environment = \"moon\"").unwrap();

        let error = Config::load(&path).unwrap_err();
        assert!(error.to_string().contains("Failed to parse config file"));
    }
}
