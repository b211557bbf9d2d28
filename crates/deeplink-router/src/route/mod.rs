//! Route table and matching
//!
//! Route patterns are written relative to their parent, without a leading
//! slash: `details` > `product/:id`.

pub mod matcher;
pub mod node;
pub mod params;
pub mod pattern;

pub use matcher::MatchedRoute;
pub use node::{Ambiguity, RouteNode, RouteTree};
pub use params::{coerce_param, ParamType, ParamValue, Params};
pub use pattern::{classify_segment, parse_pattern, PatternSegment};
