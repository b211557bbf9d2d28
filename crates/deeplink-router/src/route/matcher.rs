//! Path matching against the route tree
//!
//! Matching is a depth-first search with backtracking: siblings are tried in
//! specificity order, optional parameters first try to consume a segment and
//! then try to consume nothing, and a node only matches if its descendants
//! consume the rest of the path.

use tracing::debug;

use super::node::{RouteNode, RouteTree};
use super::params::{coerce_param, ParamValue, Params};
use super::pattern::PatternSegment;
use crate::path::{decode_segment, segments};

/// One node on a matched chain with the path parameters it captured
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRoute<'a> {
    pub node: &'a RouteNode,
    pub params: Params,
}

impl RouteTree {
    /// Matches a path (no query) to a chain of routes from a root to a leaf
    ///
    /// Returns `None` when no chain consumes every segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use deeplink_router::{ParamType, ParamValue, RouteNode, RouteTree};
    ///
    /// let tree = RouteTree::new([RouteNode::new("Pharmacy", "pharmacy").with_children([
    ///     RouteNode::new("Products", "products/:category?").with_parse("category", ParamType::Number),
    ///     RouteNode::new("Category", "category/:id").with_parse("id", ParamType::Number),
    /// ])]);
    ///
    /// let chain = tree.match_path("/pharmacy/category/8536").unwrap();
    /// assert_eq!(chain[1].node.name(), "Category");
    /// assert_eq!(chain[1].params.get("id"), Some(&ParamValue::Number(8536.0)));
    ///
    /// assert!(tree.match_path("/pharmacy/unknown").is_none());
    /// ```
    pub fn match_path(&self, path: &str) -> Option<Vec<MatchedRoute<'_>>> {
        let parts = segments(path);
        let matched = match_siblings(self.roots(), &parts);

        match &matched {
            Some(chain) => debug!(
                path,
                route = chain.last().map(|m| m.node.name()).unwrap_or_default(),
                "route matched"
            ),
            None => debug!(path, "no route matched"),
        }

        matched
    }
}

fn match_siblings<'a>(nodes: &'a [RouteNode], rest: &[&str]) -> Option<Vec<MatchedRoute<'a>>> {
    nodes
        .iter()
        .find_map(|node| consume(node, node.segments(), rest, Params::new()))
}

/// Consumes `rest` with the remaining `pattern` of `node`, then descends
fn consume<'a>(
    node: &'a RouteNode,
    pattern: &[PatternSegment],
    rest: &[&str],
    mut params: Params,
) -> Option<Vec<MatchedRoute<'a>>> {
    let Some((head, tail)) = pattern.split_first() else {
        return descend(node, params, rest);
    };

    match head {
        PatternSegment::Static(text) => {
            let (first, remaining) = rest.split_first()?;
            if *first != text.as_str() {
                return None;
            }
            consume(node, tail, remaining, params)
        }
        PatternSegment::Required(name) => {
            let (first, remaining) = rest.split_first()?;
            let value = capture(node, name, first)?;
            params.insert(name.clone(), value);
            consume(node, tail, remaining, params)
        }
        PatternSegment::Optional(name) => {
            if let Some((first, remaining)) = rest.split_first() {
                if let Some(value) = capture(node, name, first) {
                    let mut with_value = params.clone();
                    with_value.insert(name.clone(), value);
                    if let Some(chain) = consume(node, tail, remaining, with_value) {
                        return Some(chain);
                    }
                }
            }
            consume(node, tail, rest, params)
        }
    }
}

/// Continues below a node whose own pattern is fully consumed
fn descend<'a>(node: &'a RouteNode, params: Params, rest: &[&str]) -> Option<Vec<MatchedRoute<'a>>> {
    let here = MatchedRoute { node, params };

    if node.is_leaf() {
        return rest.is_empty().then(|| vec![here]);
    }

    let below = if rest.is_empty() {
        initial_chain(node).or_else(|| match_siblings(node.children(), rest))
    } else {
        match_siblings(node.children(), rest)
    };
    let below = below?;

    let mut chain = Vec::with_capacity(below.len() + 1);
    chain.push(here);
    chain.extend(below);
    Some(chain)
}

/// Chain shown when the path ends at a navigator with an initial route
fn initial_chain(node: &RouteNode) -> Option<Vec<MatchedRoute<'_>>> {
    let child = node.initial_child()?;
    if child.required_params().next().is_some() {
        return None;
    }
    descend(child, Params::new(), &[])
}

fn capture(node: &RouteNode, name: &str, raw: &str) -> Option<ParamValue> {
    let decoded = decode_segment(raw);
    match node.parse_type(name) {
        Some(ty) => coerce_param(&decoded, ty),
        None => Some(ParamValue::Text(decoded.into_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::params::ParamType;
    use pretty_assertions::assert_eq;

    fn names(chain: &[MatchedRoute<'_>]) -> Vec<String> {
        chain.iter().map(|m| m.node.name().to_string()).collect()
    }

    fn pharmacy_tree() -> RouteTree {
        RouteTree::new([
            RouteNode::new("Intro", "intro"),
            RouteNode::new("Pharmacy", "pharmacy")
                .with_initial_route("PharmacyHome")
                .with_children([
                    RouteNode::new("PharmacyHome", ""),
                    RouteNode::new("Products", "products/:category?")
                        .with_parse("category", ParamType::Number),
                    RouteNode::new("Category", "category/:id").with_parse("id", ParamType::Number),
                    RouteNode::new("Search", "search"),
                ]),
            RouteNode::new("Details", "details").with_children([
                RouteNode::new("ProductDetails", "product/:id"),
                RouteNode::new("PharmacyDetails", "pharmacy/:id?"),
            ]),
        ])
    }

    #[test]
    fn test_literal_route() {
        let tree = pharmacy_tree();
        let chain = tree.match_path("/intro").unwrap();
        assert_eq!(names(&chain), vec!["Intro"]);
        assert!(chain[0].params.is_empty());
    }

    #[test]
    fn test_literal_beats_parameter() {
        let tree = pharmacy_tree();
        let chain = tree.match_path("/pharmacy/category/8536").unwrap();
        assert_eq!(names(&chain), vec!["Pharmacy", "Category"]);
        assert_eq!(chain[1].params.get("id"), Some(&ParamValue::Number(8536.0)));
    }

    #[test]
    fn test_optional_consumes_when_present() {
        let tree = pharmacy_tree();
        let chain = tree.match_path("/pharmacy/products/12").unwrap();
        assert_eq!(names(&chain), vec!["Pharmacy", "Products"]);
        assert_eq!(chain[1].params.get("category"), Some(&ParamValue::Number(12.0)));
    }

    #[test]
    fn test_optional_absent() {
        let tree = pharmacy_tree();
        let chain = tree.match_path("/pharmacy/products").unwrap();
        assert_eq!(names(&chain), vec!["Pharmacy", "Products"]);
        assert!(chain[1].params.is_empty());
    }

    #[test]
    fn test_optional_coercion_failure_does_not_match_extra_segment() {
        let tree = pharmacy_tree();
        assert!(tree.match_path("/pharmacy/products/shampoo").is_none());
    }

    #[test]
    fn test_required_coercion_failure_is_a_miss() {
        let tree = pharmacy_tree();
        assert!(tree.match_path("/pharmacy/category/abc").is_none());
    }

    #[test]
    fn test_navigator_uses_initial_route() {
        let tree = pharmacy_tree();
        let chain = tree.match_path("/pharmacy").unwrap();
        assert_eq!(names(&chain), vec!["Pharmacy", "PharmacyHome"]);
    }

    #[test]
    fn test_navigator_without_index_or_initial_route_does_not_match() {
        let tree = pharmacy_tree();
        assert!(tree.match_path("/details").is_none());
    }

    #[test]
    fn test_optional_child_matches_empty_remainder() {
        let tree = pharmacy_tree();
        let chain = tree.match_path("/details/pharmacy").unwrap();
        assert_eq!(names(&chain), vec!["Details", "PharmacyDetails"]);
    }

    #[test]
    fn test_captured_segments_are_decoded() {
        let tree = pharmacy_tree();
        let chain = tree.match_path("/details/product/1581%20dulcolax").unwrap();
        assert_eq!(
            chain[1].params.get("id"),
            Some(&ParamValue::Text("1581 dulcolax".to_string()))
        );
    }

    #[test]
    fn test_unconsumed_segments_fail() {
        let tree = pharmacy_tree();
        assert!(tree.match_path("/intro/extra").is_none());
        assert!(tree.match_path("/nonexistent/path").is_none());
    }

    #[test]
    fn test_backtracks_into_later_sibling() {
        // `:section?` would swallow "faq" and then fail on "42"
        let tree = RouteTree::new([RouteNode::new("Help", "help").with_children([
            RouteNode::new("Section", ":section?"),
            RouteNode::new("Article", ":section?/:article"),
        ])]);

        let chain = tree.match_path("/help/faq/42").unwrap();
        assert_eq!(names(&chain), vec!["Help", "Article"]);
        assert_eq!(
            chain[1].params.get("section"),
            Some(&ParamValue::Text("faq".to_string()))
        );
    }

    #[test]
    fn test_optional_empty_branch_after_failed_consume() {
        let tree = RouteTree::new([RouteNode::new("Orders", "orders/:filter?/:id")
            .with_parse("filter", ParamType::Boolean)]);

        let chain = tree.match_path("/orders/77").unwrap();
        assert_eq!(chain[0].params.get("id"), Some(&ParamValue::Text("77".to_string())));
        assert!(!chain[0].params.contains_key("filter"));

        let chain = tree.match_path("/orders/true/77").unwrap();
        assert_eq!(chain[0].params.get("filter"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn test_root_path_matches_index_root() {
        let tree = RouteTree::new([RouteNode::new("Landing", ""), RouteNode::new("Cart", "cart")]);
        assert_eq!(names(&tree.match_path("/").unwrap()), vec!["Landing"]);
    }
}
