//! Path utilities shared by every resolution stage
//!
//! All functions are **pure**: given same input, always produce same output with no side effects.
use std::borrow::Cow;

/// Splits a link into its path and query parts
///
/// The query part excludes the `?`. A `#fragment` is dropped, deep links never
/// carry one to the app.
///
/// # Examples
///
/// ```
/// use deeplink_router::path::split_query;
///
/// assert_eq!(split_query("/intro?a=1"), ("/intro", Some("a=1")));
/// assert_eq!(split_query("/intro"), ("/intro", None));
/// assert_eq!(split_query("/intro#top"), ("/intro", None));
/// ```
pub fn split_query(link: &str) -> (&str, Option<&str>) {
    let without_fragment = link.split('#').next().unwrap_or(link);

    match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (without_fragment, None),
    }
}

/// Validates if a path is in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//` or `\`
/// - Must not end with `/` (except root `/`)
/// - Must not be empty
///
/// # Examples
///
/// ```
/// use deeplink_router::path::is_valid_path;
///
/// assert!(is_valid_path("/"));
/// assert!(is_valid_path("/pharmacy"));
/// assert!(is_valid_path("/details/product/123"));
///
/// assert!(!is_valid_path(""));
/// assert!(!is_valid_path("pharmacy")); // Missing leading /
/// assert!(!is_valid_path("/pharmacy/")); // Trailing /
/// assert!(!is_valid_path("/pharmacy//main")); // Double //
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    if path == "/" {
        return true;
    }

    !path.ends_with('/')
}

/// Normalize a path to canonical form
///
/// Returns `Cow::Borrowed` when input is already valid (zero allocations).
/// Returns `Cow::Owned` when normalization needed (single allocation).
///
/// - Missing leading slash: `home` → `/home`
/// - Trailing slashes: `/path/` → `/path`
/// - Double slashes: `/path//to` → `/path/to`
/// - Backslashes: `\path\to` → `/path/to`
///
/// # Examples
///
/// ```
/// use deeplink_router::path::normalize_path;
/// use std::borrow::Cow;
///
/// let path = normalize_path("/pharmacy");
/// assert!(matches!(path, Cow::Borrowed("/pharmacy")));
///
/// assert_eq!(normalize_path("home"), "/home");
/// assert_eq!(normalize_path("/details/product/"), "/details/product");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_valid_path(path) {
        return Cow::Borrowed(path);
    }

    let normalized = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Normalizes the path part of a link and keeps its query untouched
///
/// # Examples
///
/// ```
/// use deeplink_router::path::normalize_link;
///
/// assert_eq!(normalize_link("home/?x=1"), "/home?x=1");
/// assert_eq!(normalize_link("/?x=1"), "/?x=1");
/// assert_eq!(normalize_link("/pharmacy"), "/pharmacy");
/// ```
pub fn normalize_link(link: &str) -> String {
    let (path, query) = split_query(link);
    let path = normalize_path(path);

    match query {
        Some(query) => format!("{}?{}", path, query),
        None => path.into_owned(),
    }
}

/// Strips every leading `/`
pub fn trim_leading_slashes(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Checks that `key` is a prefix of `path` ending on a segment boundary
///
/// The character after the prefix must be end-of-string, `/` or `?`, so
/// `/pharmacy` is a prefix of `/pharmacy/main` and `/pharmacy?x=1` but not
/// of `/pharmacyfinder`.
///
/// # Examples
///
/// ```
/// use deeplink_router::path::is_segment_prefix;
///
/// assert!(is_segment_prefix("/pharmacy", "/pharmacy"));
/// assert!(is_segment_prefix("/pharmacy/main", "/pharmacy"));
/// assert!(is_segment_prefix("/pharmacy?tab=2", "/pharmacy"));
/// assert!(!is_segment_prefix("/pharmacyfinder", "/pharmacy"));
/// ```
pub fn is_segment_prefix(path: &str, key: &str) -> bool {
    match path.strip_prefix(key) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

/// Splits a path into its non-empty segments
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Percent-decodes one captured path segment
///
/// Malformed escapes leave the segment as written. `+` stays literal in paths.
pub fn decode_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}
