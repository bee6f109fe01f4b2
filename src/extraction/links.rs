//! Link extraction
//!
//! This module extracts all `a[href]` links from a document and classifies
//! them by scope (internal/external) and by `rel` (nofollow/dofollow).

use crate::document::{Element, RenderedDocument};
use crate::report::LinkStats;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

/// Type of link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Internal link (root-relative or same host)
    Internal,
    /// External link (absolute http(s) on a different host)
    External,
    /// Anchor link (same page)
    Anchor,
    /// mailto: link
    Email,
    /// tel: link
    Phone,
    /// JavaScript link
    JavaScript,
    /// Other/unknown
    Other,
}

/// An extracted link with context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedLink {
    /// The href as written in the document
    pub href: String,
    /// Link text content
    pub text: String,
    /// Type of link
    pub link_type: LinkType,
    /// Rel attribute
    pub rel: Option<String>,
    /// Whether `rel` carries the `nofollow` token
    pub nofollow: bool,
    /// Whether it opens in a new tab
    pub new_tab: bool,
    /// Position in document (order found)
    pub position: usize,
}

/// Link extraction functionality
pub struct LinkExtractor;

impl LinkExtractor {
    /// Extract all `a[href]` links in document order
    pub fn extract_all(root: &Element, base: &Url) -> Vec<ExtractedLink> {
        root.find_all("a")
            .filter_map(|el| el.attr("href").map(|href| (el, href)))
            .enumerate()
            .map(|(position, (el, href))| ExtractedLink {
                href: href.to_string(),
                text: el.text_content().trim().to_string(),
                link_type: Self::classify(href, base),
                rel: el.attr("rel").map(String::from),
                nofollow: el.attr_has_token("rel", "nofollow"),
                new_tab: el.attr("target") == Some("_blank"),
                position,
            })
            .collect()
    }

    /// Classify an href relative to the page URL
    pub fn classify(href: &str, base: &Url) -> LinkType {
        let href = href.trim();
        let lower = href.to_ascii_lowercase();

        if href.is_empty() {
            LinkType::Other
        } else if href.starts_with('#') {
            LinkType::Anchor
        } else if lower.starts_with("mailto:") {
            LinkType::Email
        } else if lower.starts_with("tel:") {
            LinkType::Phone
        } else if lower.starts_with("javascript:") {
            LinkType::JavaScript
        } else if href.starts_with("//") {
            // protocol-relative: resolve against the page first
            base.join(href)
                .map(|url| Self::scope_of(&url, base))
                .unwrap_or(LinkType::Other)
        } else if href.starts_with('/') {
            LinkType::Internal
        } else {
            Url::parse(href)
                .map(|url| Self::scope_of(&url, base))
                .unwrap_or(LinkType::Other)
        }
    }

    fn scope_of(url: &Url, base: &Url) -> LinkType {
        match url.scheme() {
            "http" | "https" if url.host_str() == base.host_str() => LinkType::Internal,
            "http" | "https" => LinkType::External,
            _ => LinkType::Other,
        }
    }

    /// Count links per scope and per rel. The two classifications are
    /// independent; a link lands in at most one scope bucket and exactly one
    /// rel bucket.
    pub fn stats(links: &[ExtractedLink]) -> LinkStats {
        links.iter().fold(LinkStats::default(), |mut stats, link| {
            match link.link_type {
                LinkType::Internal => stats.internal += 1,
                LinkType::External => stats.external += 1,
                _ => {}
            }
            if link.nofollow {
                stats.nofollow += 1;
            } else {
                stats.dofollow += 1;
            }
            stats
        })
    }

    /// Extract and count links for a document
    #[instrument(skip(doc), fields(url = %doc.url))]
    pub fn link_stats(doc: &RenderedDocument) -> LinkStats {
        let links = Self::extract_all(&doc.root, &doc.url);
        let stats = Self::stats(&links);
        debug!(
            "Classified {} links: {} internal, {} external, {} nofollow",
            links.len(),
            stats.internal,
            stats.external,
            stats.nofollow
        );
        stats
    }
}
