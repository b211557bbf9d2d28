//! Identifier extraction from public web URLs
//!
//! Shop URLs such as `https://www.gesund.de/produkt/1581-dulcolax` carry the
//! same identifiers the app screens need. Each known pattern is tried in
//! order; all of them may match and a later match overwrites an earlier one
//! under the same output key.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use uuid::Uuid;

use crate::error::ExtractError;

static PRODUCT_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(?:produkt|product|details/product)/(\d+)").unwrap());

static CATEGORY_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/(?:produkte/[^/]+|category|products|home/category|search/category)/(\d+)").unwrap()
});

static PHARMACY_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/(?:apotheke|pharmacy)/([a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12})")
        .unwrap()
});

static CAMPAIGN_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/campaign/([a-zA-Z0-9]+)").unwrap());

/// Extracts known identifiers from a web URL
///
/// Output keys are the route parameter names: `id` for products, pharmacies
/// and campaigns, `category` for categories.
///
/// # Examples
///
/// ```
/// use deeplink_router::extract::extract_web_params;
///
/// let params = extract_web_params("https://www.gesund.de/produkte/schmerzmittel/8536").unwrap();
/// assert_eq!(params.get("category").map(String::as_str), Some("8536"));
///
/// assert!(extract_web_params("https://www.gesund.de/impressum").is_err());
/// ```
pub fn extract_web_params(url: &str) -> Result<HashMap<String, String>, ExtractError> {
    let patterns: [(&str, &Regex, fn(&str) -> bool); 4] = [
        ("id", &PRODUCT_ID_REGEX, any_value),
        ("category", &CATEGORY_ID_REGEX, any_value),
        ("id", &PHARMACY_ID_REGEX, is_uuid),
        ("id", &CAMPAIGN_ID_REGEX, any_value),
    ];

    let mut params = HashMap::new();

    for (key, regex, accept) in patterns {
        let Some(value) = regex.captures(url).and_then(|caps| caps.get(1)) else {
            continue;
        };

        let value = value.as_str();
        if !accept(value) {
            continue;
        }

        debug!(url, key, value, "extracted web url parameter");
        params.insert(key.to_string(), value.to_string());
    }

    if params.is_empty() {
        return Err(ExtractError::NoKnownPattern {
            url: url.to_string(),
        });
    }

    Ok(params)
}

fn any_value(_: &str) -> bool {
    true
}

fn is_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}
