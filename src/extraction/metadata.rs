//! Page metadata extraction
//!
//! This module extracts the SEO block of a page: title, description,
//! canonical URL, robots directives, Open Graph and Twitter Card properties
//! and JSON-LD structured data.

use crate::document::Element;
use crate::error::ExtractionError;
use crate::report::SeoStructure;
use std::collections::BTreeMap;
use tracing::debug;

const JSON_LD_TYPE: &str = "application/ld+json";

/// Metadata extraction functionality
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extract the SEO block from the document root
    pub fn extract(root: &Element) -> SeoStructure {
        let seo = SeoStructure {
            title: root
                .first("title")
                .map(|t| t.text_content().trim().to_string()),
            meta_description: Self::meta_content(root, "description"),
            canonical_url: Self::canonical(root),
            robots_meta: Self::meta_content(root, "robots"),
            open_graph: Self::properties_with_prefix(root, "og:"),
            twitter_card: Self::properties_with_prefix(root, "twitter:"),
            json_ld: Self::json_ld(root),
        };

        debug!(
            "Extracted metadata: title={:?}, canonical={:?}, og={}, json_ld={}",
            seo.title,
            seo.canonical_url,
            seo.open_graph.len(),
            seo.json_ld.len()
        );
        seo
    }

    /// `content` of the first `meta[name=<name>]`
    pub fn meta_content(root: &Element, name: &str) -> Option<String> {
        root.find_all("meta")
            .find(|m| {
                m.attr("name")
                    .map(|n| n.trim().eq_ignore_ascii_case(name))
                    .unwrap_or(false)
            })
            .and_then(|m| m.attr("content"))
            .map(String::from)
    }

    /// `href` of the first `link[rel=canonical]`
    pub fn canonical(root: &Element) -> Option<String> {
        root.find_all("link")
            .find(|l| l.attr_has_token("rel", "canonical"))
            .and_then(|l| l.attr("href"))
            .map(String::from)
    }

    /// All `meta[property^=<prefix>]` keyed by the full property string
    pub fn properties_with_prefix(root: &Element, prefix: &str) -> BTreeMap<String, String> {
        root.find_all("meta")
            .filter_map(|m| {
                let property = m.attr("property")?;
                let content = m.attr("content")?;
                property
                    .starts_with(prefix)
                    .then(|| (property.to_string(), content.to_string()))
            })
            .collect()
    }

    /// Parse one JSON-LD block
    pub fn parse_json_ld(raw: &str) -> Result<serde_json::Value, ExtractionError> {
        serde_json::from_str(raw.trim()).map_err(|e| ExtractionError::MalformedJsonLd(e.to_string()))
    }

    /// Parse every `script[type="application/ld+json"]`, keeping the blocks
    /// that parse and dropping the rest
    pub fn json_ld(root: &Element) -> Vec<serde_json::Value> {
        root.find_all("script")
            .filter(|s| {
                s.attr("type")
                    .map(|t| t.trim().eq_ignore_ascii_case(JSON_LD_TYPE))
                    .unwrap_or(false)
            })
            .map(|s| Self::parse_json_ld(&s.text_content()))
            .fold(Vec::new(), |mut blocks, parsed| {
                match parsed {
                    Ok(value) => blocks.push(value),
                    Err(err) => debug!(kind = "malformed_json_ld", "Skipping JSON-LD block: {}", err),
                }
                blocks
            })
    }
}
