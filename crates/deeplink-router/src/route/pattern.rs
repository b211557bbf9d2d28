//! Pattern parsing for route segments
//!
//! Pure functional parsing of route path patterns into typed segments.
//! The grammar has three segment kinds:
//!
//! - literal text: `product`
//! - required parameter: `:id`
//! - optional parameter: `:category?`

/// Represents the different kinds of route pattern segments
///
/// # Examples
///
/// ```
/// use deeplink_router::route::pattern::{classify_segment, PatternSegment};
///
/// assert!(matches!(classify_segment("product"), PatternSegment::Static(_)));
/// assert!(matches!(classify_segment(":id"), PatternSegment::Required(_)));
/// assert!(matches!(classify_segment(":category?"), PatternSegment::Optional(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternSegment {
    /// Literal text, compared case-sensitively
    Static(String),
    /// Required parameter: consumes exactly one segment
    Required(String),
    /// Optional parameter: consumes one segment or none
    Optional(String),
}

impl PatternSegment {
    /// Specificity rank: literal (0) > required (1) > optional (2)
    pub fn rank(&self) -> u8 {
        match self {
            PatternSegment::Static(_) => 0,
            PatternSegment::Required(_) => 1,
            PatternSegment::Optional(_) => 2,
        }
    }

    /// Parameter name for dynamic segments
    pub fn param_name(&self) -> Option<&str> {
        match self {
            PatternSegment::Static(_) => None,
            PatternSegment::Required(name) | PatternSegment::Optional(name) => Some(name),
        }
    }

    /// Shape of the segment with parameter names erased
    ///
    /// Two sibling patterns with equal shapes accept exactly the same inputs.
    pub fn shape(&self) -> String {
        match self {
            PatternSegment::Static(text) => text.clone(),
            PatternSegment::Required(_) => ":".to_string(),
            PatternSegment::Optional(_) => ":?".to_string(),
        }
    }
}

/// Classifies a segment into a pattern type (pure function)
///
/// A lone `:` or `:?` has no parameter name and stays literal text.
pub fn classify_segment(segment: &str) -> PatternSegment {
    match segment.strip_prefix(':') {
        Some(param) => match param.strip_suffix('?') {
            Some(name) if !name.is_empty() => PatternSegment::Optional(name.to_string()),
            Some(_) => PatternSegment::Static(segment.to_string()),
            None if !param.is_empty() => PatternSegment::Required(param.to_string()),
            None => PatternSegment::Static(segment.to_string()),
        },
        None => PatternSegment::Static(segment.to_string()),
    }
}

/// Parses a whole pattern such as `details/product/:id`
///
/// Empty segments are dropped, so `""` and `"/"` both parse to no segments
/// (an index route).
///
/// # Examples
///
/// ```
/// use deeplink_router::route::pattern::{parse_pattern, PatternSegment};
///
/// assert_eq!(
///     parse_pattern("products/:category?"),
///     vec![
///         PatternSegment::Static("products".into()),
///         PatternSegment::Optional("category".into()),
///     ]
/// );
/// assert!(parse_pattern("").is_empty());
/// ```
pub fn parse_pattern(pattern: &str) -> Vec<PatternSegment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(classify_segment)
        .collect()
}

/// Sort key for sibling ordering; smaller is more specific
///
/// Compared lexicographically, so a literal first segment beats a parameter
/// and an index route (no segments) sorts before everything.
pub fn specificity(segments: &[PatternSegment]) -> Vec<u8> {
    segments.iter().map(PatternSegment::rank).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_static() {
        assert_eq!(classify_segment("intro"), PatternSegment::Static("intro".to_string()));
    }

    #[test]
    fn test_classify_required() {
        assert_eq!(classify_segment(":id"), PatternSegment::Required("id".to_string()));
    }

    #[test]
    fn test_classify_optional() {
        assert_eq!(
            classify_segment(":category?"),
            PatternSegment::Optional("category".to_string())
        );
    }

    #[test]
    fn test_classify_nameless_markers_are_literal() {
        assert_eq!(classify_segment(":"), PatternSegment::Static(":".to_string()));
        assert_eq!(classify_segment(":?"), PatternSegment::Static(":?".to_string()));
    }

    #[test]
    fn test_specificity_order() {
        let literal = specificity(&parse_pattern("category/:id"));
        let required = specificity(&parse_pattern(":topic"));
        let optional = specificity(&parse_pattern(":topic?"));
        let index = specificity(&parse_pattern(""));

        assert!(index < literal);
        assert!(literal < required);
        assert!(required < optional);
    }

    #[test]
    fn test_shape_erases_names() {
        let a: Vec<String> = parse_pattern("orders/:id").iter().map(PatternSegment::shape).collect();
        let b: Vec<String> = parse_pattern("orders/:orderId").iter().map(PatternSegment::shape).collect();
        assert_eq!(a, b);
    }
}
