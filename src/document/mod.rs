//! Rendered document snapshot
//!
//! A [`RenderedDocument`] is everything the analysis stage is allowed to see
//! about a page: the DOM, the final URL, HTTP response metadata and a few
//! facts captured from the execution environment. It is produced by a
//! [`Renderer`] and never mutated afterwards.

pub mod dom;

pub use dom::{Element, Node};

use crate::error::{NavigationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// Default user agent announced by the rendering collaborator
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/124.0 Safari/537.36 seolens/",
    env!("CARGO_PKG_VERSION")
);

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// What to render: the input contract of the rendering collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// URL to navigate to
    pub url: String,
    /// Navigation timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent to present
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Viewport to emulate
    #[serde(default)]
    pub viewport: Viewport,
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl RenderRequest {
    /// Request with default timeout, user agent and viewport
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            viewport: Viewport::default(),
        }
    }

    /// Set the navigation timeout
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set the user agent
    pub fn user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Set the viewport
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }
}

/// Produces rendered documents; implemented by the browser adapter and by
/// anything else able to hand over a DOM snapshot
#[allow(async_fn_in_trait)]
pub trait Renderer {
    /// Navigate to the request URL and snapshot the result
    async fn render(&self, request: &RenderRequest) -> Result<RenderedDocument>;
}

/// One entry of a byte-accounting pass over loaded resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTiming {
    /// Resource URL
    pub url: String,
    /// Initiator type as reported by the Resource Timing API
    /// (`img`, `script`, `link`, `css`, `video`, ...)
    pub initiator_type: String,
    /// Bytes transferred over the network
    pub transfer_size: u64,
}

/// Immutable snapshot of a navigated page
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    /// Final URL after redirects
    pub url: Url,
    /// Final HTTP status
    pub status: u16,
    /// Response headers, names lower-cased
    pub headers: BTreeMap<String, String>,
    /// Number of redirects followed
    pub redirect_count: u32,
    /// Navigation time in milliseconds
    pub load_time_ms: u64,
    /// The `<html>` element
    pub root: Element,
    /// Visible text of the page body
    pub body_text: String,
    /// Global variable names present in the page's execution environment
    pub globals: BTreeSet<String>,
    /// Transfer sizes of loaded resources, when measured
    pub resource_timings: Vec<ResourceTiming>,
}

impl RenderedDocument {
    /// Assemble a document from a DOM tree. Status defaults to 200; the
    /// body text is derived from the DOM.
    pub fn new(url: &str, root: Element) -> Result<Self> {
        let url = parse_page_url(url)?;
        let body_text = root
            .first("body")
            .map(Element::visible_text)
            .unwrap_or_default();

        Ok(Self {
            url,
            status: 200,
            headers: BTreeMap::new(),
            redirect_count: 0,
            load_time_ms: 0,
            root,
            body_text,
            globals: BTreeSet::new(),
            resource_timings: Vec::new(),
        })
    }

    /// Parse raw HTML into a document
    pub fn from_html(url: &str, html: &str) -> Result<Self> {
        Self::new(url, Element::parse_html(html))
    }

    /// Set the HTTP status
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a response header (name is lower-cased)
    pub fn with_header<K: AsRef<str>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Add several response headers
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self = self.with_header(name, value);
        }
        self
    }

    /// Set the redirect count
    pub fn with_redirect_count(mut self, count: u32) -> Self {
        self.redirect_count = count;
        self
    }

    /// Set the navigation time
    pub fn with_load_time_ms(mut self, ms: u64) -> Self {
        self.load_time_ms = ms;
        self
    }

    /// Replace the body text with the collaborator's rendered text
    pub fn with_body_text<S: Into<String>>(mut self, text: S) -> Self {
        self.body_text = text.into();
        self
    }

    /// Set the captured global variable names
    pub fn with_globals<I, S>(mut self, globals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.globals = globals.into_iter().map(Into::into).collect();
        self
    }

    /// Attach resource transfer sizes
    pub fn with_resource_timings(mut self, timings: Vec<ResourceTiming>) -> Self {
        self.resource_timings = timings;
        self
    }

    /// Header value by (case-insensitive) name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Host of the final URL
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Whether the page was served over TLS
    pub fn is_https(&self) -> bool {
        self.url.scheme() == "https"
    }
}

/// Parse a page URL, accepting only http and https
pub fn parse_page_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| NavigationError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(NavigationError::UnsupportedScheme {
            scheme: scheme.to_string(),
            url: raw.to_string(),
        }
        .into()),
    }
}
