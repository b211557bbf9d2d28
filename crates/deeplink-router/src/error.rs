//! Error types surfaced to callers
//!
//! Pattern misses and parameter coercion failures never show up here: the
//! matcher treats them as "this alternative does not match" and backtracks.

use thiserror::Error;

/// Failure of a forward resolution call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The redirect fixed-point did not converge within the configured bound
    ///
    /// Indicates cyclic or non-converging redirect rules.
    #[error("redirect loop exceeded {limit} iterations while resolving '{path}'")]
    RedirectLoopExceeded { path: String, limit: usize },
}

/// Failure of a reverse (screen → link) construction call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("no route named '{screen}'")]
    UnknownScreen { screen: String },

    #[error("route '{screen}' requires parameter '{param}'")]
    MissingRequiredParameter { screen: String, param: String },
}

/// Failure to pull identifiers out of a web URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("could not extract a known ID pattern from '{url}'")]
    NoKnownPattern { url: String },
}
