//! The preview screen: holds the submitted markup, its extraction, and the
//! `downloading` flag, and composes the document that gets rasterized.

use crate::extract::{extract, ExtractPolicy, ExtractedDocument};
use crate::session::{Navigation, NavigationState};
use crate::RenderTarget;

/// Element id of the container that wraps the extracted body markup.
pub const TARGET_ID: &str = "infografia";

const PAGE_TITLE: &str = "Infographic preview";
const CONTROLS_ID: &str = "controls";
pub const MISSING_PAYLOAD_MESSAGE: &str = "No HTML was found to preview.";

/// State of the `/infografia` screen.
#[derive(Debug, Clone)]
pub struct PreviewPage {
    raw: Option<String>,
    policy: ExtractPolicy,
    extracted: Option<ExtractedDocument>,
    downloading: bool,
}

impl PreviewPage {
    /// Build the screen from the navigation payload, if any.
    pub fn new(state: Option<NavigationState>, policy: ExtractPolicy) -> Self {
        let raw = state.map(|s| s.html);
        let extracted = extract(raw.as_deref(), &policy);
        Self {
            raw,
            policy,
            extracted,
            downloading: false,
        }
    }

    /// Replace the payload. The extraction is recomputed only when the
    /// markup actually changed.
    pub fn set_payload(&mut self, html: Option<String>) {
        if html == self.raw {
            return;
        }
        self.extracted = extract(html.as_deref(), &self.policy);
        self.raw = html;
    }

    pub fn extracted(&self) -> Option<&ExtractedDocument> {
        self.extracted.as_ref()
    }

    /// True when there is nothing to show; the screen then offers [`back`](Self::back).
    pub fn is_error(&self) -> bool {
        self.extracted.is_none()
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    pub(crate) fn set_downloading(&mut self, downloading: bool) {
        self.downloading = downloading;
    }

    /// Return to the input screen. Ignored while an export is running.
    pub fn back(&self) -> Option<Navigation> {
        if self.downloading {
            return None;
        }
        Some(Navigation::home())
    }

    /// Full HTML document for the current state.
    pub fn compose(&self) -> String {
        let Some(doc) = &self.extracted else {
            return compose_error_page();
        };

        let mut head = String::new();
        head.push_str("<meta charset=\"utf-8\">");
        head.push_str(&format!("<title>{}</title>", PAGE_TITLE));
        for resource in &doc.external_resources {
            head.push_str(&resource.to_html());
        }
        head.push_str("<style>");
        head.push_str(&doc.inline_styles);
        head.push_str("</style>");

        let controls = if self.downloading {
            String::new()
        } else {
            format!(
                "<div id=\"{}\"><button data-export=\"png\">Download PNG</button>\
                 <button data-export=\"pdf\">Download PDF</button>\
                 <a href=\"/\">Back</a></div>",
                CONTROLS_ID
            )
        };

        format!(
            "<!DOCTYPE html><html><head>{}</head><body>{}<div id=\"{}\">{}</div></body></html>",
            head, controls, TARGET_ID, doc.body_markup
        )
    }

    /// What the exporter rasterizes, or `None` when nothing is rendered.
    pub fn render_target(&self) -> Option<RenderTarget> {
        self.extracted.as_ref()?;
        Some(RenderTarget {
            document: self.compose(),
            selector: format!("#{}", TARGET_ID),
        })
    }
}

fn compose_error_page() -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head>\
         <body><h2>Error</h2><p>{}</p><a href=\"/\">Back to start</a></body></html>",
        PAGE_TITLE, MISSING_PAYLOAD_MESSAGE
    )
}
