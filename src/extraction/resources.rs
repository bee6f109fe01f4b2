//! Resource profiling
//!
//! Counts resource-bearing elements, derives optimization flags from markup
//! and response headers, and sums transfer sizes when the renderer measured
//! them.

use super::structure::StructuralExtractor;
use crate::document::{Element, RenderedDocument, ResourceTiming};
use crate::report::{Optimizations, PerformanceMetrics, ResourceCounts, ResourceSizes};
use tracing::{debug, instrument};

const FONT_EXTENSIONS: &[&str] = &[".woff2", ".woff", ".ttf", ".otf", ".eot"];
const IMAGE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".avif", ".svg", ".ico", ".bmp",
];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".ogv", ".mov", ".m3u8"];

/// Resource class of a measured transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Image
    Image,
    /// Script
    Script,
    /// Stylesheet
    Stylesheet,
    /// Font
    Font,
    /// Video
    Video,
    /// Anything else (fetch, xhr, documents, ...)
    Other,
}

/// Resource profiling functionality
pub struct ResourceProfiler;

impl ResourceProfiler {
    /// Profile the resources of a document
    #[instrument(skip(doc), fields(url = %doc.url))]
    pub fn profile(doc: &RenderedDocument) -> PerformanceMetrics {
        let metrics = PerformanceMetrics {
            resource_counts: Self::counts(&doc.root),
            resource_sizes: Self::sizes(&doc.resource_timings),
            optimizations: Self::optimizations(doc),
        };

        debug!(
            "Resources: {} scripts, {} stylesheets, {} bytes measured",
            metrics.resource_counts.scripts,
            metrics.resource_counts.stylesheets,
            metrics.resource_sizes.total
        );
        metrics
    }

    /// Count resource-bearing elements
    pub fn counts(root: &Element) -> ResourceCounts {
        root.elements()
            .fold(ResourceCounts::default(), |mut counts, el| {
                match el.tag.as_str() {
                    "img" => counts.images += 1,
                    "script" => counts.scripts += 1,
                    "video" => counts.videos += 1,
                    "link" => {
                        if el.attr_has_token("rel", "stylesheet") {
                            counts.stylesheets += 1;
                        }
                        if el.attr("href").map(|h| h.contains("font")).unwrap_or(false) {
                            counts.fonts += 1;
                        }
                    }
                    _ => {}
                }
                counts
            })
    }

    /// Optimization flags from markup and response headers
    pub fn optimizations(doc: &RenderedDocument) -> Optimizations {
        let root = &doc.root;
        Optimizations {
            image_optimization: root
                .find_all("img")
                .any(|img| StructuralExtractor::is_lazy(img) || img.has_attr("srcset")),
            minification: root
                .find_all("script")
                .any(|s| s.attr("src").map(|src| src.contains(".min.")).unwrap_or(false)),
            compression: doc.header("content-encoding").is_some(),
            caching: doc.header("cache-control").is_some() || doc.header("expires").is_some(),
        }
    }

    /// Classify a measured transfer by initiator and URL extension
    pub fn classify(timing: &ResourceTiming) -> ResourceKind {
        let path = timing
            .url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let has_ext = |exts: &[&str]| exts.iter().any(|ext| path.ends_with(ext));

        if has_ext(FONT_EXTENSIONS) {
            return ResourceKind::Font;
        }
        match timing.initiator_type.as_str() {
            "img" | "image" => ResourceKind::Image,
            "script" => ResourceKind::Script,
            "video" | "audio" => ResourceKind::Video,
            "css" | "link" if path.ends_with(".css") => ResourceKind::Stylesheet,
            _ if has_ext(IMAGE_EXTENSIONS) => ResourceKind::Image,
            _ if path.ends_with(".js") || path.ends_with(".mjs") => ResourceKind::Script,
            _ if path.ends_with(".css") => ResourceKind::Stylesheet,
            _ if has_ext(VIDEO_EXTENSIONS) => ResourceKind::Video,
            _ => ResourceKind::Other,
        }
    }

    /// Sum measured transfer sizes per class; all zero when nothing was
    /// measured
    pub fn sizes(timings: &[ResourceTiming]) -> ResourceSizes {
        timings
            .iter()
            .fold(ResourceSizes::default(), |mut sizes, timing| {
                let bytes = timing.transfer_size;
                match Self::classify(timing) {
                    ResourceKind::Image => sizes.images += bytes,
                    ResourceKind::Script => sizes.scripts += bytes,
                    ResourceKind::Stylesheet => sizes.stylesheets += bytes,
                    ResourceKind::Font => sizes.fonts += bytes,
                    ResourceKind::Video => sizes.videos += bytes,
                    ResourceKind::Other => {}
                }
                sizes.total += bytes;
                sizes
            })
    }
}
