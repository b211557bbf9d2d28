//! Reverse links: from a screen and its parameters back to a deep link

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::LinkError;
use crate::path::trim_leading_slashes;
use crate::query::QueryParams;
use crate::route::{ParamValue, Params, PatternSegment, RouteTree};

impl RouteTree {
    /// Generates the canonical path of a screen by substituting parameters
    ///
    /// Patterns along the chain from the root are concatenated. Optional
    /// parameters without a value are left out. Values are percent-encoded and
    /// parameters no pattern consumes are appended as a query string sorted by
    /// key.
    ///
    /// # Examples
    ///
    /// ```
    /// use deeplink_router::{Params, ParamValue, RouteNode, RouteTree};
    ///
    /// let tree = RouteTree::new([
    ///     RouteNode::new("Details", "details").with_child(RouteNode::new("ProductDetails", "product/:id")),
    /// ]);
    ///
    /// let mut params = Params::new();
    /// params.insert("id".to_string(), ParamValue::from("1581-dulcolax"));
    ///
    /// let path = tree.build_path("ProductDetails", &params).unwrap();
    /// assert_eq!(path, "/details/product/1581-dulcolax");
    /// ```
    pub fn build_path(&self, screen: &str, params: &Params) -> Result<String, LinkError> {
        let chain = self.find(screen).ok_or_else(|| LinkError::UnknownScreen {
            screen: screen.to_string(),
        })?;

        let mut used = BTreeSet::new();
        let mut parts = Vec::new();

        for segment in chain.iter().flat_map(|node| node.segments()) {
            match segment {
                PatternSegment::Static(text) => parts.push(text.clone()),
                PatternSegment::Required(name) => {
                    let value = params.get(name).ok_or_else(|| LinkError::MissingRequiredParameter {
                        screen: screen.to_string(),
                        param: name.clone(),
                    })?;
                    parts.push(encode_value(value));
                    used.insert(name.as_str());
                }
                PatternSegment::Optional(name) => {
                    if let Some(value) = params.get(name) {
                        parts.push(encode_value(value));
                        used.insert(name.as_str());
                    }
                }
            }
        }

        let mut path = format!("/{}", parts.join("/"));

        let mut leftover: Vec<(&String, &ParamValue)> = params
            .iter()
            .filter(|(key, _)| !used.contains(key.as_str()))
            .collect();
        if !leftover.is_empty() {
            leftover.sort_by(|a, b| a.0.cmp(b.0));
            let query: QueryParams = leftover
                .into_iter()
                .map(|(key, value)| (key.clone(), value.to_string()))
                .collect();
            path.push('?');
            path.push_str(&query.to_query_string());
        }

        Ok(path)
    }

    /// Convenience wrapper taking string parameters
    ///
    /// ```
    /// use deeplink_router::{RouteNode, RouteTree};
    ///
    /// let tree = RouteTree::new([
    ///     RouteNode::new("Profile", "profile").with_child(RouteNode::new("OrderDetails", "orders/:orderId")),
    /// ]);
    ///
    /// let path = tree.build_path_with("OrderDetails", &[("orderId", "A-17")]).unwrap();
    /// assert_eq!(path, "/profile/orders/A-17");
    /// ```
    pub fn build_path_with(&self, screen: &str, params: &[(&str, &str)]) -> Result<String, LinkError> {
        let params: Params = params
            .iter()
            .map(|(key, value)| (key.to_string(), ParamValue::from(*value)))
            .collect();

        self.build_path(screen, &params)
    }
}

fn encode_value(value: &ParamValue) -> String {
    urlencoding::encode(&value.to_string()).into_owned()
}

/// Renders full deep links and push-notification payloads
#[derive(Debug, Clone, Copy)]
pub struct LinkBuilder<'a> {
    tree: &'a RouteTree,
    scheme: &'a str,
}

impl<'a> LinkBuilder<'a> {
    pub fn new(tree: &'a RouteTree, scheme: &'a str) -> Self {
        Self { tree, scheme }
    }

    pub fn scheme(&self) -> &str {
        self.scheme
    }

    /// `scheme` followed by the canonical path without its leading slash
    pub fn deep_link(&self, screen: &str, params: &Params) -> Result<String, LinkError> {
        let path = self.tree.build_path(screen, params)?;
        Ok(format!("{}{}", self.scheme, trim_leading_slashes(&path)))
    }

    /// Adjust Campaign Lab walkthrough for a custom link opening `screen`
    pub fn adjust_steps(&self, screen: &str, params: &Params) -> Result<String, LinkError> {
        let path = self.tree.build_path(screen, params)?;
        let path = trim_leading_slashes(&path);

        Ok(format!(
            "Adjust link for `{path}`:\n\
             1. Open Adjust Campaign Lab and go to Custom Links.\n\
             2. Click 'New link' and select the gesund.de app.\n\
             3. Fill in channel, campaign, adgroup and creative.\n\
             4. Under 'User destinations' add a condition of type 'Deeplink'.\n\
             5. Paste the path `{path}` without the `{scheme}` scheme.\n\
             6. Configure the App Store and Play Store fallbacks.\n\
             7. Review the settings and click 'Create link'.\n",
            path = path,
            scheme = self.scheme,
        ))
    }

    /// Guidance for printing a QR code that opens `screen`
    ///
    /// QR codes should point at the Adjust short link, not at the raw deep link.
    pub fn qr_code_info(&self, screen: &str, params: &Params) -> Result<String, LinkError> {
        let link = self.deep_link(screen, params)?;
        Ok(format!(
            "Create an Adjust link first and encode its short URL (e.g. https://nnm2.adj.st/xxxxxx) \
             rather than the direct deep link `{}`. Print the code at least 2cm x 2cm with \
             error correction level M.",
            link
        ))
    }

    /// Generates every requested deliverable for one screen
    ///
    /// ```
    /// use deeplink_router::link::{Deliverable, LinkBuilder};
    /// use deeplink_router::{Params, RouteNode, RouteTree};
    ///
    /// let tree = RouteTree::new([RouteNode::new("Cart", "cart")]);
    /// let out = LinkBuilder::new(&tree, "gesund://")
    ///     .deliverables("Cart", &Params::new(), &[Deliverable::Deeplink])
    ///     .unwrap();
    ///
    /// assert_eq!(out.full_deeplink.as_deref(), Some("gesund://cart"));
    /// assert!(out.adjust_steps.is_none());
    /// ```
    pub fn deliverables(
        &self,
        screen: &str,
        params: &Params,
        requested: &[Deliverable],
    ) -> Result<Deliverables, LinkError> {
        let link = self.deep_link(screen, params)?;
        let wants = |deliverable: Deliverable| requested.contains(&deliverable);

        let mut out = Deliverables {
            testing_checklist: testing_checklist(&link),
            ..Deliverables::default()
        };
        if wants(Deliverable::Deeplink) {
            out.full_deeplink = Some(link);
        }
        if wants(Deliverable::AdjustSteps) {
            out.adjust_steps = Some(self.adjust_steps(screen, params)?);
        }
        if wants(Deliverable::FirebasePush) {
            out.firebase_push_payload = Some(
                self.push_payload(screen, params, PUSH_TITLE_PLACEHOLDER, PUSH_BODY_PLACEHOLDER)?,
            );
        }
        if wants(Deliverable::QrCode) {
            out.qr_code_info = Some(self.qr_code_info(screen, params)?);
        }

        Ok(out)
    }

    /// Push payload whose `href` opens `screen`
    pub fn push_payload(
        &self,
        screen: &str,
        params: &Params,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<PushPayload, LinkError> {
        Ok(PushPayload {
            notification: PushNotification {
                title: title.into(),
                body: body.into(),
            },
            data: PushData {
                href: self.deep_link(screen, params)?,
                link_label: None,
            },
        })
    }
}

const PUSH_TITLE_PLACEHOLDER: &str = "Example Title (Replace Me)";
const PUSH_BODY_PLACEHOLDER: &str = "Example Body (Replace Me)";

fn testing_checklist(link: &str) -> String {
    format!(
        "Testing checklist:\n\
         - Latest app version: paste `{}` or the Adjust link into a messenger and tap it.\n\
         - Older app version: paste the link into Notes or an email and tap it.\n\
         - App not installed: tap the Adjust link, install from the store, open, verify the screen.\n\
         - QR code: at least 2cm x 2cm, error correction M, points to the Adjust link.\n\
         - Attribution: remove the device under Adjust test devices before tapping the link.\n",
        link
    )
}

/// Kinds of asset generated for a campaign link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deliverable {
    Deeplink,
    AdjustSteps,
    FirebasePush,
    QrCode,
}

/// Assets generated for one screen; only requested fields are set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deliverables {
    pub full_deeplink: Option<String>,
    pub adjust_steps: Option<String>,
    pub firebase_push_payload: Option<PushPayload>,
    pub qr_code_info: Option<String>,
    pub testing_checklist: String,
}

/// Push notification as sent to the messaging service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushPayload {
    pub notification: PushNotification,
    pub data: PushData,
}

impl PushPayload {
    pub fn with_link_label(mut self, label: impl Into<String>) -> Self {
        self.data.link_label = Some(label.into());
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushData {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{ParamType, RouteNode};
    use pretty_assertions::assert_eq;

    fn tree() -> RouteTree {
        RouteTree::new([
            RouteNode::new("Intro", "intro"),
            RouteNode::new("Pharmacy", "pharmacy").with_children([
                RouteNode::new("PharmacyHome", ""),
                RouteNode::new("Products", "products/:category?")
                    .with_parse("category", ParamType::Number),
            ]),
            RouteNode::new("Details", "details")
                .with_child(RouteNode::new("ProductDetails", "product/:id")),
        ])
    }

    #[test]
    fn test_unknown_screen() {
        let error = tree().build_path("Nowhere", &Params::new()).unwrap_err();
        assert_eq!(
            error,
            LinkError::UnknownScreen {
                screen: "Nowhere".to_string()
            }
        );
    }

    #[test]
    fn test_missing_required_parameter() {
        let error = tree().build_path("ProductDetails", &Params::new()).unwrap_err();
        assert_eq!(
            error,
            LinkError::MissingRequiredParameter {
                screen: "ProductDetails".to_string(),
                param: "id".to_string()
            }
        );
    }

    #[test]
    fn test_optional_parameter_omitted_or_filled() {
        let tree = tree();
        assert_eq!(tree.build_path("Products", &Params::new()).unwrap(), "/pharmacy/products");

        let mut params = Params::new();
        params.insert("category".to_string(), ParamValue::Number(8536.0));
        assert_eq!(tree.build_path("Products", &params).unwrap(), "/pharmacy/products/8536");
    }

    #[test]
    fn test_index_route_path() {
        assert_eq!(tree().build_path("PharmacyHome", &Params::new()).unwrap(), "/pharmacy");
    }

    #[test]
    fn test_values_are_encoded_and_leftovers_become_query() {
        let path = tree()
            .build_path_with(
                "ProductDetails",
                &[("id", "a b/c"), ("utm", "push"), ("from", "/home")],
            )
            .unwrap();
        assert_eq!(path, "/details/product/a%20b%2Fc?from=%2Fhome&utm=push");
    }

    #[test]
    fn test_deep_link_and_push_payload() {
        let tree = tree();
        let links = LinkBuilder::new(&tree, "gesund://");
        let params: Params = [("id".to_string(), ParamValue::from("1581-dulcolax"))].into();

        assert_eq!(
            links.deep_link("ProductDetails", &params).unwrap(),
            "gesund://details/product/1581-dulcolax"
        );

        let payload = links
            .push_payload("ProductDetails", &params, "Angebot", "Jetzt ansehen")
            .unwrap()
            .with_link_label("Zum Produkt");
        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "notification": { "title": "Angebot", "body": "Jetzt ansehen" },
                "data": {
                    "href": "gesund://details/product/1581-dulcolax",
                    "linkLabel": "Zum Produkt"
                }
            })
        );
    }

    #[test]
    fn test_requested_deliverables_only() {
        let tree = tree();
        let links = LinkBuilder::new(&tree, "gesund://");
        let params: Params = [("id".to_string(), ParamValue::from("42"))].into();

        let out = links
            .deliverables(
                "ProductDetails",
                &params,
                &[Deliverable::AdjustSteps, Deliverable::FirebasePush, Deliverable::QrCode],
            )
            .unwrap();

        assert_eq!(out.full_deeplink, None);
        let steps = out.adjust_steps.unwrap();
        assert!(steps.contains("`details/product/42`"));
        assert!(steps.contains("without the `gesund://` scheme"));
        assert_eq!(
            out.firebase_push_payload.unwrap().data.href,
            "gesund://details/product/42"
        );
        assert!(out.qr_code_info.unwrap().contains("`gesund://details/product/42`"));
        assert!(out.testing_checklist.contains("gesund://details/product/42"));
    }

    #[test]
    fn test_deliverables_fail_like_reverse_links() {
        let tree = tree();
        let error = LinkBuilder::new(&tree, "gesund://")
            .deliverables("ProductDetails", &Params::new(), &[Deliverable::Deeplink])
            .unwrap_err();
        assert!(matches!(error, LinkError::MissingRequiredParameter { .. }));
    }

    #[test]
    fn test_deliverable_names() {
        let kinds: Vec<Deliverable> =
            serde_json::from_str(r#"["deeplink", "adjust_steps", "firebase_push", "qr_code"]"#).unwrap();
        assert_eq!(kinds.len(), 4);
        assert_eq!(kinds[1], Deliverable::AdjustSteps);
    }

    #[test]
    fn test_round_trip_through_matcher() {
        let tree = tree();
        let mut params = Params::new();
        params.insert("id".to_string(), ParamValue::from("1581 dulcolax"));

        let path = tree.build_path("ProductDetails", &params).unwrap();
        let chain = tree.match_path(&path).unwrap();
        assert_eq!(chain.last().unwrap().node.name(), "ProductDetails");
        assert_eq!(chain.last().unwrap().params, params);
    }
}
