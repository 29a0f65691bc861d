//! Split raw design-tool HTML into body markup, inline styles and the
//! whitelisted external head resources.

use crate::relay::RelayEndpoint;
use crate::serialize;
use indexmap::IndexMap;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

/// Attribute name to value, in source order.
pub type Attributes = IndexMap<String, String>;

/// An external head resource that survives extraction.
///
/// Only two kinds are allowed through: stylesheets/links carrying an `href`
/// and scripts carrying a `src`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tagKind", content = "attributes", rename_all = "lowercase")]
pub enum ExternalResource {
    Link(Attributes),
    Script(Attributes),
}

impl ExternalResource {
    pub fn tag_kind(&self) -> &'static str {
        match self {
            ExternalResource::Link(_) => "link",
            ExternalResource::Script(_) => "script",
        }
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            ExternalResource::Link(a) | ExternalResource::Script(a) => a,
        }
    }

    /// Capture `element` if it is a `link[href]` or `script[src]`.
    fn from_element(element: ElementRef<'_>) -> Option<Self> {
        let value = element.value();
        let attributes = || -> Attributes {
            value
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };
        match value.name() {
            "link" if value.attr("href").is_some() => Some(ExternalResource::Link(attributes())),
            "script" if value.attr("src").is_some() => Some(ExternalResource::Script(attributes())),
            _ => None,
        }
    }

    /// Markup for re-inserting the resource into a document head.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<");
        out.push_str(self.tag_kind());
        for (name, value) in self.attributes() {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
        match self {
            ExternalResource::Link(_) => out.push('>'),
            ExternalResource::Script(_) => out.push_str("></script>"),
        }
        out
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// The three-part result of extraction. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    pub body_markup: String,
    pub inline_styles: String,
    pub external_resources: Vec<ExternalResource>,
}

/// Cleanup applied while extracting.
///
/// Two policies exist: [`ExtractPolicy::cleaning`] removes `&nbsp;` from the
/// body and sends absolute images through a CORS relay; [`ExtractPolicy::passthrough`]
/// does neither. The default is the cleaning policy with the default relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractPolicy {
    /// Remove every `&nbsp;` from the serialized body.
    pub strip_nbsp: bool,
    /// Rewrite absolute `<img src>` through this relay.
    pub image_relay: Option<RelayEndpoint>,
}

impl ExtractPolicy {
    pub fn cleaning(relay: Option<RelayEndpoint>) -> Self {
        Self {
            strip_nbsp: true,
            image_relay: relay,
        }
    }

    pub fn passthrough() -> Self {
        Self {
            strip_nbsp: false,
            image_relay: None,
        }
    }
}

impl Default for ExtractPolicy {
    fn default() -> Self {
        Self::cleaning(Some(RelayEndpoint::default()))
    }
}

/// Extract body markup, inline styles and head resources from `raw`.
///
/// Returns `None` for a missing or empty input. Anything else goes through
/// the parser's error recovery and always yields a document, possibly empty.
pub fn extract(raw: Option<&str>, policy: &ExtractPolicy) -> Option<ExtractedDocument> {
    let raw = raw.filter(|s| !s.is_empty())?;
    let document = Html::parse_document(raw);

    let body_sel = Selector::parse("body").unwrap();
    let style_sel = Selector::parse("style").unwrap();
    let head_sel = Selector::parse("head").unwrap();

    let rewrite = |src: &str| -> Option<String> {
        let relay = policy.image_relay.as_ref()?;
        RelayEndpoint::applies_to(src).then(|| relay.proxied(src))
    };

    let mut body_markup = document
        .select(&body_sel)
        .next()
        .map(|body| serialize::inner_html(body, &rewrite))
        .unwrap_or_default();
    if policy.strip_nbsp {
        body_markup = body_markup.replace("&nbsp;", "");
    }

    let inline_styles = document
        .select(&style_sel)
        .map(|node| node.text().collect::<String>())
        .collect::<String>();

    let external_resources = document
        .select(&head_sel)
        .next()
        .map(|head| {
            head.children()
                .filter_map(ElementRef::wrap)
                .filter_map(ExternalResource::from_element)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    log::debug!(
        "Extracted {} bytes of body, {} bytes of styles, {} head resources",
        body_markup.len(),
        inline_styles.len(),
        external_resources.len()
    );

    Some(ExtractedDocument {
        body_markup,
        inline_styles,
        external_resources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(extract(None, &ExtractPolicy::default()).is_none());
        assert!(extract(Some(""), &ExtractPolicy::default()).is_none());
    }

    #[test]
    fn whitespace_input_still_parses() {
        let doc = extract(Some("   "), &ExtractPolicy::passthrough()).unwrap();
        assert!(doc.inline_styles.is_empty());
        assert!(doc.external_resources.is_empty());
    }

    #[test]
    fn styles_are_concatenated_in_document_order() {
        let html = "<html><head><style>a{}</style></head><body><p>x</p><style>b{}</style></body></html>";
        let doc = extract(Some(html), &ExtractPolicy::passthrough()).unwrap();
        assert_eq!(doc.inline_styles, "a{}b{}");
    }

    #[test]
    fn only_direct_head_children_are_captured() {
        let html = r#"<html><head>
            <link rel="icon">
            <script src="head.js" defer></script>
            <script>inline()</script>
            </head><body><script src="body.js"></script></body></html>"#;
        let doc = extract(Some(html), &ExtractPolicy::passthrough()).unwrap();
        assert_eq!(
            doc.external_resources,
            vec![ExternalResource::Script(attrs(&[("src", "head.js"), ("defer", "")]))]
        );
    }

    #[test]
    fn cleaning_policy_relays_absolute_images() {
        let html = r#"<body><img src="https://cdn.example.com/a.png"><img src="local.png"></body>"#;
        let doc = extract(Some(html), &ExtractPolicy::default()).unwrap();
        assert!(doc
            .body_markup
            .contains(r#"src="https://corsproxy.io/?https%3A%2F%2Fcdn.example.com%2Fa.png""#));
        assert!(doc.body_markup.contains(r#"src="local.png""#));

        let plain = extract(Some(html), &ExtractPolicy::passthrough()).unwrap();
        assert!(plain.body_markup.contains(r#"src="https://cdn.example.com/a.png""#));
    }

    #[test]
    fn resource_tags_render_from_the_enum() {
        let link = ExternalResource::Link(attrs(&[("href", "a.css?x=1&y=2"), ("rel", "stylesheet")]));
        assert_eq!(link.to_html(), r#"<link href="a.css?x=1&amp;y=2" rel="stylesheet">"#);
        let script = ExternalResource::Script(attrs(&[("src", "b.js")]));
        assert_eq!(script.to_html(), r#"<script src="b.js"></script>"#);
    }

    #[test]
    fn attributes_keep_source_order() {
        let html = r#"<head><script src="a.js" type="module" crossorigin="anonymous"></script></head>"#;
        let doc = extract(Some(html), &ExtractPolicy::passthrough()).unwrap();
        let script = &doc.external_resources[0];
        let names: Vec<&str> = script.attributes().keys().map(String::as_str).collect();
        assert_eq!(names, ["src", "type", "crossorigin"]);
        assert_eq!(
            script.to_html(),
            r#"<script src="a.js" type="module" crossorigin="anonymous"></script>"#
        );
        assert_eq!(
            serde_json::to_string(script).unwrap(),
            r#"{"tagKind":"script","attributes":{"src":"a.js","type":"module","crossorigin":"anonymous"}}"#
        );
    }

    #[test]
    fn serializes_with_tag_kind() {
        let r = ExternalResource::Link(attrs(&[("href", "a.css")]));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["tagKind"], "link");
        assert_eq!(v["attributes"]["href"], "a.css");
    }
}
