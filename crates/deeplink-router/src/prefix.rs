//! Prefix pruning: turns a raw incoming URL into an app-relative path
//!
//! Prefixes are tried in table order and at most one is stripped. A link that
//! matches no prefix passes through untouched and fails later in route matching.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Deployment tier the app runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

/// A literal scheme or host prefix, optionally restricted to some tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePrefix {
    pub value: String,
    /// Tiers the prefix is active in; empty means every tier
    #[serde(default)]
    pub environments: Vec<Environment>,
}

impl RoutePrefix {
    /// Prefix active in every environment
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            environments: Vec::new(),
        }
    }

    /// Restricts the prefix to the given tiers
    pub fn only_in<I>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = Environment>,
    {
        self.environments.extend(environments);
        self
    }

    pub fn is_active_in(&self, environment: Environment) -> bool {
        self.environments.is_empty() || self.environments.contains(&environment)
    }
}

/// Ordered, immutable prefix table for one environment
#[derive(Debug, Clone, Default)]
pub struct PrefixPruner {
    prefixes: Vec<String>,
}

impl PrefixPruner {
    /// Builds the table, keeping only prefixes active in `environment`
    ///
    /// # Examples
    ///
    /// ```
    /// use deeplink_router::{Environment, PrefixPruner, RoutePrefix};
    ///
    /// let pruner = PrefixPruner::new(
    ///     [
    ///         RoutePrefix::new("gesund://"),
    ///         RoutePrefix::new("https://staging.gesund.de").only_in([Environment::Staging]),
    ///     ],
    ///     Environment::Production,
    /// );
    /// assert_eq!(pruner.prefixes(), &["gesund://".to_string()]);
    /// ```
    pub fn new<I>(entries: I, environment: Environment) -> Self
    where
        I: IntoIterator<Item = RoutePrefix>,
    {
        let prefixes = entries
            .into_iter()
            .filter(|entry| entry.is_active_in(environment))
            .filter(|entry| !entry.value.is_empty())
            .map(|entry| entry.value)
            .collect();

        Self { prefixes }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Strips the first matching prefix
    ///
    /// A leading `//` left behind by the strip collapses to a single `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use deeplink_router::{Environment, PrefixPruner, RoutePrefix};
    ///
    /// let pruner = PrefixPruner::new(
    ///     [RoutePrefix::new("gesund://"), RoutePrefix::new("https://www.gesund.de")],
    ///     Environment::Production,
    /// );
    /// assert_eq!(pruner.prune("gesund://home"), "home");
    /// assert_eq!(pruner.prune("https://www.gesund.de//produkt/1"), "/produkt/1");
    /// assert_eq!(pruner.prune("mailto:someone"), "mailto:someone");
    /// ```
    pub fn prune<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        if raw.is_empty() {
            return Cow::Borrowed(raw);
        }

        let stripped = self
            .prefixes
            .iter()
            .find_map(|prefix| raw.strip_prefix(prefix.as_str()));

        match stripped {
            Some(rest) if rest.starts_with("//") => Cow::Borrowed(&rest[1..]),
            Some(rest) => Cow::Borrowed(rest),
            None => Cow::Borrowed(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pruner(environment: Environment) -> PrefixPruner {
        PrefixPruner::new(
            [
                RoutePrefix::new("gesund://"),
                RoutePrefix::new("https://www.gesund.de"),
                RoutePrefix::new("https://gesund.de"),
                RoutePrefix::new("gesund-dev://").only_in([Environment::Development]),
                RoutePrefix::new("https://staging.gesund.de")
                    .only_in([Environment::Development, Environment::Staging]),
            ],
            environment,
        )
    }

    #[rstest]
    #[case("gesund://home", "home")]
    #[case("gesund:///home", "/home")]
    #[case("https://www.gesund.de/produkt/1581-dulcolax", "/produkt/1581-dulcolax")]
    #[case("https://gesund.de//cart", "/cart")]
    #[case("/qrcode/abc", "/qrcode/abc")]
    #[case("", "")]
    fn test_prune_production(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(pruner(Environment::Production).prune(raw), expected);
    }

    #[test]
    fn test_only_one_prefix_is_stripped() {
        let pruner = PrefixPruner::new(
            [RoutePrefix::new("gesund://"), RoutePrefix::new("home")],
            Environment::Production,
        );
        assert_eq!(pruner.prune("gesund://home/x"), "home/x");
    }

    #[test]
    fn test_environment_specific_prefixes() {
        assert_eq!(pruner(Environment::Development).prune("gesund-dev://cart"), "cart");
        assert_eq!(
            pruner(Environment::Production).prune("gesund-dev://cart"),
            "gesund-dev://cart"
        );
        assert_eq!(
            pruner(Environment::Staging).prune("https://staging.gesund.de/cart"),
            "/cart"
        );
    }

    #[test]
    fn test_prefix_plus_path_strips_back_to_path() {
        let pruner = pruner(Environment::Production);
        for prefix in pruner.prefixes() {
            for path in ["/details/product/1", "pharmacy", "intro?x=1"] {
                assert_eq!(pruner.prune(&format!("{}{}", prefix, path)), path);
            }
        }
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("prod".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("Staging".parse::<Environment>(), Ok(Environment::Staging));
        assert!("qa".parse::<Environment>().is_err());
    }
}
