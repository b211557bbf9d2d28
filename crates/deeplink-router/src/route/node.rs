//! Hierarchical route table
//!
//! A [`RouteNode`] is a screen (leaf) or a navigator (node with children).
//! A node's pattern is relative to its parent; the full path of a leaf is the
//! concatenation of the patterns on its chain from the root.

use std::collections::HashMap;
use std::fmt;

use super::params::ParamType;
use super::pattern::{parse_pattern, specificity, PatternSegment};

/// One entry of the route table
#[derive(Debug, Clone, PartialEq)]
pub struct RouteNode {
    name: String,
    pattern: String,
    segments: Vec<PatternSegment>,
    parse: HashMap<String, ParamType>,
    children: Vec<RouteNode>,
    initial_route: Option<String>,
}

impl RouteNode {
    /// Creates a node; an empty pattern makes it an index route
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let segments = parse_pattern(&pattern);
        Self {
            name: name.into(),
            pattern,
            segments,
            parse: HashMap::new(),
            children: Vec::new(),
            initial_route: None,
        }
    }

    /// Declares the type a parameter is coerced to
    pub fn with_parse(mut self, param: impl Into<String>, ty: ParamType) -> Self {
        self.parse.insert(param.into(), ty);
        self
    }

    pub fn with_child(mut self, child: RouteNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = RouteNode>,
    {
        self.children.extend(children);
        self
    }

    /// Names the child shown when the path ends at this navigator
    pub fn with_initial_route(mut self, name: impl Into<String>) -> Self {
        self.initial_route = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    pub fn children(&self) -> &[RouteNode] {
        &self.children
    }

    pub fn parse(&self) -> &HashMap<String, ParamType> {
        &self.parse
    }

    pub fn parse_type(&self, param: &str) -> Option<ParamType> {
        self.parse.get(param).copied()
    }

    pub fn initial_route(&self) -> Option<&str> {
        self.initial_route.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True for a node whose pattern consumes nothing
    pub fn is_index(&self) -> bool {
        self.segments.is_empty()
    }

    /// Names of the required parameters in this node's own pattern
    pub fn required_params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            PatternSegment::Required(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub(crate) fn initial_child(&self) -> Option<&RouteNode> {
        let name = self.initial_route.as_deref()?;
        self.children.iter().find(|child| child.name == name)
    }

    fn shape(&self) -> Vec<String> {
        self.segments.iter().map(PatternSegment::shape).collect()
    }

    /// Orders children most specific first; ties keep declaration order
    fn sort_children(&mut self) {
        self.children
            .sort_by_cached_key(|child| specificity(child.segments()));
        for child in &mut self.children {
            child.sort_children();
        }
    }
}

/// Two siblings that accept exactly the same inputs
///
/// Only the one declared first can ever match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub parent: Option<String>,
    pub first: String,
    pub second: String,
    pub pattern: String,
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "routes '{}' and '{}' under {} share the pattern '{}'",
            self.first,
            self.second,
            self.parent.as_deref().unwrap_or("the root"),
            self.pattern
        )
    }
}

/// The whole route table, children sorted by specificity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteTree {
    roots: Vec<RouteNode>,
}

impl RouteTree {
    pub fn new<I>(roots: I) -> Self
    where
        I: IntoIterator<Item = RouteNode>,
    {
        let mut root = RouteNode::new("", "").with_children(roots);
        root.sort_children();
        Self {
            roots: root.children,
        }
    }

    pub fn roots(&self) -> &[RouteNode] {
        &self.roots
    }

    /// Chain of nodes from a root down to the node named `name`
    ///
    /// Depth-first in table order; the first node with that name wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use deeplink_router::{RouteNode, RouteTree};
    ///
    /// let tree = RouteTree::new([
    ///     RouteNode::new("Details", "details").with_child(RouteNode::new("ProductDetails", "product/:id")),
    /// ]);
    ///
    /// let chain = tree.find("ProductDetails").unwrap();
    /// let names: Vec<&str> = chain.iter().map(|node| node.name()).collect();
    /// assert_eq!(names, vec!["Details", "ProductDetails"]);
    /// assert!(tree.find("Nope").is_none());
    /// ```
    pub fn find(&self, name: &str) -> Option<Vec<&RouteNode>> {
        fn walk<'a>(nodes: &'a [RouteNode], name: &str, chain: &mut Vec<&'a RouteNode>) -> bool {
            for node in nodes {
                chain.push(node);
                if node.name == name || walk(&node.children, name, chain) {
                    return true;
                }
                chain.pop();
            }
            false
        }

        let mut chain = Vec::new();
        walk(&self.roots, name, &mut chain).then_some(chain)
    }

    /// Sibling pairs whose patterns have the same shape
    pub fn ambiguities(&self) -> Vec<Ambiguity> {
        let mut found = Vec::new();
        collect_ambiguities(None, &self.roots, &mut found);
        found
    }
}

fn collect_ambiguities(parent: Option<&str>, siblings: &[RouteNode], found: &mut Vec<Ambiguity>) {
    for (index, first) in siblings.iter().enumerate() {
        let shape = first.shape();
        for second in &siblings[index + 1..] {
            if second.shape() == shape {
                found.push(Ambiguity {
                    parent: parent.map(str::to_string),
                    first: first.name.clone(),
                    second: second.name.clone(),
                    pattern: shape.join("/"),
                });
            }
        }
    }

    for node in siblings {
        collect_ambiguities(Some(&node.name), &node.children, found);
    }
}
