//! Structural extraction
//!
//! Walks the DOM once per concern to produce headings, image and link
//! composition, semantic landmarks, navigation and accessibility markers and
//! the SEO metadata block.

use super::links::LinkExtractor;
use super::metadata::MetadataExtractor;
use crate::document::{Element, RenderedDocument};
use crate::report::{
    AccessibilityStructure, Headings, HtmlStructure, ImageStats, NavigationStructure,
    StructuralAnalysis, StructuralReport,
};
use tracing::{debug, instrument};

/// Structural extraction functionality
pub struct StructuralExtractor;

impl StructuralExtractor {
    /// Run every structural pass over the document
    #[instrument(skip(doc), fields(url = %doc.url))]
    pub fn extract(doc: &RenderedDocument) -> StructuralReport {
        let root = &doc.root;

        let report = StructuralReport {
            headings: Self::headings(root),
            images: Self::images(root),
            links: LinkExtractor::link_stats(doc),
            structure: StructuralAnalysis {
                html_structure: Self::html_structure(root),
                navigation: Self::navigation(root),
                accessibility: Self::accessibility(root),
                seo: MetadataExtractor::extract(root),
            },
        };

        debug!(
            "Structure: {} h1, {} images, {} headings total",
            report.headings.h1.len(),
            report.images.total,
            report.structure.accessibility.heading_structure.len()
        );
        report
    }

    /// Heading level of an element, if it is `h1`..`h6`
    pub fn heading_level(el: &Element) -> Option<u8> {
        match el.tag.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    /// Heading texts per level, in document order
    pub fn headings(root: &Element) -> Headings {
        let mut headings = Headings::default();
        for el in root.elements() {
            if let Some(list) = Self::heading_level(el).and_then(|l| headings.level_mut(l)) {
                list.push(el.text_content().trim().to_string());
            }
        }
        headings
    }

    /// Image composition
    pub fn images(root: &Element) -> ImageStats {
        let mut stats = ImageStats::default();
        for img in root.find_all("img") {
            stats.total += 1;
            if img.attr("alt").map(|a| !a.trim().is_empty()).unwrap_or(false) {
                stats.with_alt += 1;
            }
            if Self::is_optimized_image(img) {
                stats.optimized += 1;
            }
        }
        stats.without_alt = stats.total - stats.with_alt;
        stats
    }

    /// Lazy-loaded, responsive (`srcset`) or WebP
    pub fn is_optimized_image(img: &Element) -> bool {
        Self::is_lazy(img)
            || img.has_attr("srcset")
            || img.attr("src").map(|s| s.contains(".webp")).unwrap_or(false)
    }

    pub(crate) fn is_lazy(img: &Element) -> bool {
        img.attr("loading")
            .map(|l| l.eq_ignore_ascii_case("lazy"))
            .unwrap_or(false)
    }

    /// Semantic landmark presence
    pub fn html_structure(root: &Element) -> HtmlStructure {
        let has = |tag: &str| root.first(tag).is_some();
        HtmlStructure {
            has_header: has("header"),
            has_nav: has("nav"),
            has_main: has("main"),
            has_footer: has("footer"),
            has_article: has("article"),
            has_section: has("section"),
            has_aside: has("aside"),
            has_viewport_meta: MetadataExtractor::meta_content(root, "viewport").is_some(),
            lang: root
                .attr("lang")
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
        }
    }

    fn is_navigation(el: &Element) -> bool {
        el.is("nav")
            || el
                .attr("role")
                .map(|r| r.trim().eq_ignore_ascii_case("navigation"))
                .unwrap_or(false)
    }

    /// Navigation marker presence
    pub fn navigation(root: &Element) -> NavigationStructure {
        NavigationStructure {
            main_navigation: root.elements().any(Self::is_navigation),
            breadcrumbs: root.elements().any(|el| {
                el.attr("aria-label")
                    .map(|l| l.contains("breadcrumb"))
                    .unwrap_or(false)
                    || el.has_class("breadcrumb")
            }),
            footer_navigation: root
                .find_all("footer")
                .any(|footer| footer.descendants().any(Self::is_navigation)),
            sitemap_link: root
                .find_all("a")
                .any(|a| a.attr("href").map(|h| h.contains("sitemap")).unwrap_or(false)),
        }
    }

    /// Accessibility counters
    pub fn accessibility(root: &Element) -> AccessibilityStructure {
        let mut a11y = AccessibilityStructure::default();
        for el in root.elements() {
            if el.is("img") && el.has_attr("alt") {
                a11y.alt_text_images += 1;
            }
            if el.has_attr("aria-label") {
                a11y.aria_labels += 1;
            }
            if Self::heading_level(el).is_some() {
                a11y.heading_structure.push(el.tag.clone());
            }
            if el.is("a") && matches!(el.attr("href"), Some("#main") | Some("#content")) {
                a11y.skip_links = true;
            }
        }
        a11y
    }
}
