//! DOM snapshot capture
//!
//! Turns a live page into a [`RenderedDocument`]. Status and headers come
//! from the main-frame document response seen on the CDP network domain
//! during navigation. One script run then collects the DOM, the rendered
//! body text, navigation and resource timings and which fingerprint globals
//! exist. The DOM travels as a flat pre-order node list so arbitrarily deep
//! pages stay within the JSON nesting limits of the CDP transport.

use super::controller::{BrowserController, PageHandle};
use super::navigation::{NavigationOptions, PageNavigator, UrlValidator};
use crate::document::dom::assemble;
use crate::document::{Element, Node, RenderRequest, RenderedDocument, Renderer, ResourceTiming};
use crate::error::{ExtractionError, NavigationError, Result};
use crate::fingerprint::global_probes;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, ResourceType,
};
use futures::{FutureExt, StreamExt};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Snapshot script; `__PROBES__` is replaced with a JSON array of globals
const SNAPSHOT_SCRIPT: &str = r#"
(() => {
    const probes = __PROBES__;
    const nodes = [];
    const walk = (root) => {
        const stack = [[root, null]];
        while (stack.length) {
            const [node, parent] = stack.pop();
            if (node.nodeType === Node.TEXT_NODE) {
                nodes.push({ parent, text: node.nodeValue });
                continue;
            }
            if (node.nodeType !== Node.ELEMENT_NODE) continue;
            const attrs = {};
            for (const a of node.attributes) attrs[a.name] = a.value;
            const index = nodes.length;
            nodes.push({ parent, tag: node.tagName.toLowerCase(), attrs });
            const children = Array.from(node.childNodes);
            for (let i = children.length - 1; i >= 0; i--) stack.push([children[i], index]);
        }
    };
    walk(document.documentElement);

    const nav = performance.getEntriesByType('navigation')[0] || {};
    const resources = performance.getEntriesByType('resource').map(r => ({
        url: r.name,
        initiatorType: r.initiatorType || '',
        transferSize: Math.max(0, Math.round(r.transferSize || 0)),
    }));

    return {
        url: location.href,
        nodes,
        bodyText: document.body ? document.body.innerText : '',
        status: nav.responseStatus || null,
        redirectCount: nav.redirectCount || 0,
        loadTimeMs: nav.duration ? Math.round(nav.duration) : null,
        resources,
        globals: probes.filter(name => typeof window[name] !== 'undefined'),
    };
})()
"#;

/// One entry of the flat DOM list
#[derive(Debug, Deserialize)]
pub struct FlatNode {
    /// Index of the parent entry; `None` for the root
    pub parent: Option<usize>,
    /// Tag name, present for elements
    #[serde(default)]
    pub tag: Option<String>,
    /// Element attributes
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Text, present for text nodes
    #[serde(default)]
    pub text: Option<String>,
}

/// Raw result of the snapshot script
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    /// Final page URL
    pub url: String,
    /// DOM in pre-order
    pub nodes: Vec<FlatNode>,
    /// `document.body.innerText`
    #[serde(default)]
    pub body_text: String,
    /// Final HTTP status from navigation timing
    pub status: Option<u16>,
    /// Redirects from navigation timing
    #[serde(default)]
    pub redirect_count: u32,
    /// Navigation duration from navigation timing
    pub load_time_ms: Option<u64>,
    /// Loaded resources
    #[serde(default)]
    pub resources: Vec<ResourceTiming>,
    /// Probed globals that exist in the page
    #[serde(default)]
    pub globals: Vec<String>,
}

/// Main-frame document response observed during navigation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentResponse {
    /// HTTP status
    pub status: u16,
    /// Headers with lower-case names
    pub headers: BTreeMap<String, String>,
}

impl DocumentResponse {
    /// Build from a CDP header object. Repeated headers arrive joined by
    /// newlines and are kept that way.
    pub fn from_cdp(status: f64, headers: &serde_json::Value) -> Self {
        let headers = headers
            .as_object()
            .map(|map| {
                map.iter()
                    .map(|(name, value)| {
                        let value = match value {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (name.to_ascii_lowercase(), value)
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            status: status.clamp(0.0, f64::from(u16::MAX)) as u16,
            headers,
        }
    }
}

/// Pick the response that delivered the page: the last document response
/// of the main frame, or the last document response at all when the frame
/// is unknown
pub fn main_document_response(
    events: &[Arc<EventResponseReceived>],
    main_frame: Option<&str>,
) -> Option<DocumentResponse> {
    let documents = || {
        events
            .iter()
            .rev()
            .filter(|event| event.r#type == ResourceType::Document)
    };
    let in_main_frame = main_frame.and_then(|frame| {
        documents().find(|event| {
            event
                .frame_id
                .as_ref()
                .map(|id| id.inner() == frame)
                .unwrap_or(false)
        })
    });

    in_main_frame.or_else(|| documents().next()).map(|event| {
        DocumentResponse::from_cdp(event.response.status as f64, event.response.headers.inner())
    })
}

/// Rebuild the element tree from a pre-order list where every parent
/// precedes its children
pub fn build_tree(nodes: Vec<FlatNode>) -> Result<Element> {
    let nodes = nodes
        .into_iter()
        .map(|flat| {
            let node = match flat.tag {
                Some(tag) => {
                    let mut el = Element::new(tag);
                    el.attrs = flat.attrs;
                    Node::Element(el)
                }
                None => Node::Text {
                    text: flat.text.unwrap_or_default(),
                },
            };
            (flat.parent, node)
        })
        .collect();
    assemble(nodes).map_err(|e| ExtractionError::SnapshotMalformed(e).into())
}

impl RawSnapshot {
    /// Convert into a document. Status and headers come from `response`
    /// when one was captured; `fallback_load_ms` is used when the page
    /// exposed no navigation timing.
    pub fn into_document(
        self,
        response: Option<DocumentResponse>,
        fallback_load_ms: u64,
    ) -> Result<RenderedDocument> {
        UrlValidator::check_landed(&self.url)?;
        let root = build_tree(self.nodes)?;
        let (status, headers) = match response {
            Some(response) => (response.status, response.headers),
            None => (self.status.unwrap_or(200), BTreeMap::new()),
        };
        Ok(RenderedDocument::new(&self.url, root)?
            .with_status(status)
            .with_redirect_count(self.redirect_count)
            .with_load_time_ms(self.load_time_ms.unwrap_or(fallback_load_ms))
            .with_headers(headers)
            .with_body_text(self.body_text)
            .with_globals(self.globals)
            .with_resource_timings(self.resources))
    }
}

/// Snapshot script with the global probe list filled in
pub fn snapshot_script() -> Result<String> {
    let probes = serde_json::to_string(&global_probes())?;
    Ok(SNAPSHOT_SCRIPT.replace("__PROBES__", &probes))
}

/// Page snapshot functionality
pub struct PageSnapshot;

impl PageSnapshot {
    /// Navigate a prepared page and capture it
    #[instrument(skip(page, request, retries), fields(url = %request.url))]
    pub async fn capture(
        page: &PageHandle,
        request: &RenderRequest,
        retries: u32,
    ) -> Result<RenderedDocument> {
        let inner = page.inner();
        inner.execute(EnableParams::default()).await?;
        let mut responses = inner.event_listener::<EventResponseReceived>().await?;

        let options = NavigationOptions {
            timeout_ms: request.timeout_ms,
            retries,
            ..Default::default()
        };
        let nav = PageNavigator::goto(page, &request.url, Some(options)).await?;

        let mut events = Vec::new();
        while let Some(Some(event)) = responses.next().now_or_never() {
            events.push(event);
        }
        let main_frame = inner.mainframe().await?;
        let response =
            main_document_response(&events, main_frame.as_ref().map(|id| id.inner().as_str()));
        if response.is_none() {
            warn!("No document response seen for {}", nav.final_url);
        }

        let script = snapshot_script()?;
        let timeout = Duration::from_millis(request.timeout_ms);
        let value = tokio::time::timeout(timeout, inner.evaluate(script.as_str()))
            .await
            .map_err(|_| NavigationError::Timeout(request.timeout_ms))?
            .map_err(|e| ExtractionError::ScriptFailed(e.to_string()))?;

        let raw: RawSnapshot = value
            .into_value()
            .map_err(|e| ExtractionError::SnapshotMalformed(e.to_string()))?;

        debug!(
            "Captured {} nodes, {} resources from {} ({} responses)",
            raw.nodes.len(),
            raw.resources.len(),
            nav.final_url,
            events.len()
        );
        raw.into_document(response, nav.duration_ms)
    }
}

impl Renderer for BrowserController {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn render(&self, request: &RenderRequest) -> Result<RenderedDocument> {
        let page = self.open_page(request).await?;
        let result = PageSnapshot::capture(&page, request, self.config().navigation_retries).await;

        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", request.url, e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn flat(value: serde_json::Value) -> Vec<FlatNode> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_build_tree_preserves_order() {
        let nodes = flat(json!([
            {"parent": null, "tag": "html", "attrs": {"lang": "en"}},
            {"parent": 0, "tag": "body", "attrs": {}},
            {"parent": 1, "tag": "h1", "attrs": {}},
            {"parent": 2, "text": "Title"},
            {"parent": 1, "tag": "p", "attrs": {"class": "lead"}},
            {"parent": 4, "text": "One "},
            {"parent": 4, "text": "two"}
        ]));
        let root = build_tree(nodes).unwrap();
        assert_eq!(root.attr("lang"), Some("en"));
        assert_eq!(root.first("h1").unwrap().text_content(), "Title");
        assert_eq!(root.first("p").unwrap().text_content(), "One two");
        let tags: Vec<_> = root.elements().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["html", "body", "h1", "p"]);
    }

    #[test]
    fn test_build_tree_rejects_bad_input() {
        assert!(build_tree(Vec::new()).is_err());
        assert!(build_tree(flat(json!([{"parent": null, "text": "x"}]))).is_err());
        assert!(build_tree(flat(json!([
            {"parent": null, "tag": "html"},
            {"parent": 5, "tag": "body"}
        ])))
        .is_err());
    }

    fn raw(url: &str) -> RawSnapshot {
        serde_json::from_value(json!({
            "url": url,
            "nodes": [
                {"parent": null, "tag": "html", "attrs": {}},
                {"parent": 0, "tag": "body", "attrs": {}},
                {"parent": 1, "text": "Hello"}
            ],
            "bodyText": "Hello",
            "status": 404,
            "redirectCount": 1,
            "loadTimeMs": null,
            "resources": [{"url": "https://example.com/a.js", "initiatorType": "script", "transferSize": 10}],
            "globals": ["jQuery"]
        }))
        .unwrap()
    }

    fn response_event(frame: &str, kind: &str, status: u16, server: &str) -> Arc<EventResponseReceived> {
        Arc::new(
            serde_json::from_value(json!({
                "requestId": "1",
                "loaderId": "L1",
                "timestamp": 1.0,
                "type": kind,
                "frameId": frame,
                "hasExtraInfo": false,
                "response": {
                    "url": "https://example.com/",
                    "status": status,
                    "statusText": "",
                    "headers": {"Server": server, "Content-Encoding": "br"},
                    "mimeType": "text/html",
                    "charset": "utf-8",
                    "connectionReused": false,
                    "connectionId": 1.0,
                    "encodedDataLength": 100.0,
                    "securityState": "secure"
                }
            }))
            .unwrap(),
        )
    }

    #[test]
    fn test_raw_snapshot_into_document() {
        let response = DocumentResponse::from_cdp(
            410.0,
            &json!({"Content-Encoding": "gzip", "X-Powered-By": "PHP/8.2"}),
        );
        let doc = raw("https://example.com/final")
            .into_document(Some(response), 1234)
            .unwrap();

        assert_eq!(doc.url.as_str(), "https://example.com/final");
        assert_eq!(doc.status, 410);
        assert_eq!(doc.redirect_count, 1);
        assert_eq!(doc.load_time_ms, 1234);
        assert_eq!(doc.body_text, "Hello");
        assert_eq!(doc.header("Content-Encoding"), Some("gzip"));
        assert_eq!(doc.header("x-powered-by"), Some("PHP/8.2"));
        assert!(doc.globals.contains("jQuery"));
        assert_eq!(doc.resource_timings.len(), 1);
    }

    #[test]
    fn test_without_response_status_comes_from_timing() {
        let doc = raw("https://example.com/").into_document(None, 0).unwrap();
        assert_eq!(doc.status, 404);
        assert!(doc.headers.is_empty());
    }

    #[test]
    fn test_error_page_snapshot_is_load_failure() {
        let err = raw("chrome-error://chromewebdata/")
            .into_document(None, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NavigationFailed);
        assert!(err.to_string().contains("chrome-error://"));
    }

    #[test]
    fn test_main_document_response_prefers_main_frame() {
        let events = vec![
            response_event("MAIN", "Document", 200, "nginx"),
            response_event("MAIN", "Script", 500, "cdn"),
            response_event("IFRAME", "Document", 403, "ads"),
        ];

        let picked = main_document_response(&events, Some("MAIN")).unwrap();
        assert_eq!(picked.status, 200);
        assert_eq!(picked.headers.get("server").map(String::as_str), Some("nginx"));
        assert_eq!(picked.headers.get("content-encoding").map(String::as_str), Some("br"));

        let unknown_frame = main_document_response(&events, None).unwrap();
        assert_eq!(unknown_frame.status, 403);

        assert!(main_document_response(&events[1..2], Some("MAIN")).is_none());
    }

    #[test]
    fn test_document_response_header_values() {
        let response = DocumentResponse::from_cdp(
            200.0,
            &json!({"Set-Cookie": "a=1\nb=2", "Content-Length": 42}),
        );
        assert_eq!(response.headers["set-cookie"], "a=1\nb=2");
        assert_eq!(response.headers["content-length"], "42");
        assert!(DocumentResponse::from_cdp(200.0, &json!(null)).headers.is_empty());
    }

    #[test]
    fn test_build_tree_very_deep_chain() {
        let depth = 100_000;
        let mut nodes = vec![json!({"parent": null, "tag": "html"})];
        for i in 0..depth {
            nodes.push(json!({"parent": i, "tag": "div"}));
        }
        nodes.push(json!({"parent": depth, "text": "bottom"}));

        let root = build_tree(flat(serde_json::Value::Array(nodes))).unwrap();
        assert_eq!(root.elements().count(), depth + 1);
        assert_eq!(root.text_content(), "bottom");
        assert_eq!(root.visible_text(), "bottom");
        drop(root);
    }

    #[test]
    fn test_snapshot_script_embeds_probes() {
        let script = snapshot_script().unwrap();
        assert!(!script.contains("__PROBES__"));
        assert!(script.contains("\"jQuery\""));
    }
}
