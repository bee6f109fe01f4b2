//! Analysis report types
//!
//! [`AdvancedSeoMetrics`] is the single output value of an analysis run. All
//! of its parts are plain values with ordered maps, so two runs over the same
//! document serialize to identical bytes.

use crate::document::RenderedDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Heading texts per level, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headings {
    /// `<h1>` texts
    pub h1: Vec<String>,
    /// `<h2>` texts
    pub h2: Vec<String>,
    /// `<h3>` texts
    pub h3: Vec<String>,
    /// `<h4>` texts
    pub h4: Vec<String>,
    /// `<h5>` texts
    pub h5: Vec<String>,
    /// `<h6>` texts
    pub h6: Vec<String>,
}

impl Headings {
    /// Mutable list for a heading level (1..=6)
    pub fn level_mut(&mut self, level: u8) -> Option<&mut Vec<String>> {
        match level {
            1 => Some(&mut self.h1),
            2 => Some(&mut self.h2),
            3 => Some(&mut self.h3),
            4 => Some(&mut self.h4),
            5 => Some(&mut self.h5),
            6 => Some(&mut self.h6),
            _ => None,
        }
    }
}

/// Image composition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    /// Number of `<img>` elements
    pub total: usize,
    /// Images with a non-blank `alt`
    pub with_alt: usize,
    /// `total - with_alt`
    pub without_alt: usize,
    /// Lazy-loaded, responsive or WebP images
    pub optimized: usize,
}

/// Link composition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    /// Same-host links
    pub internal: usize,
    /// Links to other hosts
    pub external: usize,
    /// Links with `rel` containing `nofollow`
    pub nofollow: usize,
    /// All other links
    pub dofollow: usize,
}

/// Text statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    /// Whitespace-separated word count
    pub word_count: usize,
    /// Flesch Reading Ease approximation
    pub readability_score: f64,
    /// Percentage of tokens per top keyword
    pub keyword_density: BTreeMap<String, f64>,
}

/// Transport-level facts passed through from the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalStats {
    /// Navigation time
    pub load_time_ms: u64,
    /// `content-length` of the main response
    pub page_size_bytes: u64,
    /// Final HTTP status
    pub http_status: u16,
    /// Redirects followed
    pub redirects: u32,
    /// Served over https
    pub ssl: bool,
}

/// Detected technologies per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyDetection {
    /// Content management systems
    pub cms: Vec<String>,
    /// Front-end frameworks
    pub frameworks: Vec<String>,
    /// Analytics and tag managers
    pub analytics: Vec<String>,
    /// Advertising networks
    pub advertising: Vec<String>,
    /// E-commerce platforms and payment widgets
    pub ecommerce: Vec<String>,
    /// Content delivery networks
    pub cdn: Vec<String>,
    /// Web servers and hosting platforms
    pub web_server: Vec<String>,
    /// Server-side languages
    pub programming_languages: Vec<String>,
    /// Databases and backend data services
    pub databases: Vec<String>,
    /// JavaScript libraries
    pub js_libraries: Vec<String>,
}

impl TechnologyDetection {
    /// Whether nothing was detected in any category
    pub fn is_empty(&self) -> bool {
        self.cms.is_empty()
            && self.frameworks.is_empty()
            && self.analytics.is_empty()
            && self.advertising.is_empty()
            && self.ecommerce.is_empty()
            && self.cdn.is_empty()
            && self.web_server.is_empty()
            && self.programming_languages.is_empty()
            && self.databases.is_empty()
            && self.js_libraries.is_empty()
    }
}

/// Semantic HTML landmarks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlStructure {
    /// `<header>` present
    pub has_header: bool,
    /// `<nav>` present
    pub has_nav: bool,
    /// `<main>` present
    pub has_main: bool,
    /// `<footer>` present
    pub has_footer: bool,
    /// `<article>` present
    pub has_article: bool,
    /// `<section>` present
    pub has_section: bool,
    /// `<aside>` present
    pub has_aside: bool,
    /// `meta[name=viewport]` present
    pub has_viewport_meta: bool,
    /// `lang` attribute of the root element
    pub lang: Option<String>,
}

/// Navigation markers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationStructure {
    /// `nav` or `[role=navigation]`
    pub main_navigation: bool,
    /// Breadcrumb trail
    pub breadcrumbs: bool,
    /// Navigation inside `<footer>`
    pub footer_navigation: bool,
    /// Link to a sitemap
    pub sitemap_link: bool,
}

/// Accessibility markers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityStructure {
    /// Number of `img[alt]` elements
    pub alt_text_images: usize,
    /// Number of `[aria-label]` elements
    pub aria_labels: usize,
    /// Heading tag names in document order
    pub heading_structure: Vec<String>,
    /// Skip link to `#main` or `#content`
    pub skip_links: bool,
}

/// On-page SEO metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoStructure {
    /// `<title>` text
    pub title: Option<String>,
    /// `meta[name=description]` content
    pub meta_description: Option<String>,
    /// `link[rel=canonical]` href
    pub canonical_url: Option<String>,
    /// `meta[name=robots]` content
    pub robots_meta: Option<String>,
    /// `og:*` properties
    pub open_graph: BTreeMap<String, String>,
    /// `twitter:*` properties
    pub twitter_card: BTreeMap<String, String>,
    /// Parsed JSON-LD blocks
    pub json_ld: Vec<serde_json::Value>,
}

/// Structural analysis of the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralAnalysis {
    /// Semantic landmarks
    pub html_structure: HtmlStructure,
    /// Navigation markers
    pub navigation: NavigationStructure,
    /// Accessibility markers
    pub accessibility: AccessibilityStructure,
    /// SEO metadata
    pub seo: SeoStructure,
}

/// Resource counts by type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounts {
    /// `<img>`
    pub images: usize,
    /// `<script>`
    pub scripts: usize,
    /// `link[rel=stylesheet]`
    pub stylesheets: usize,
    /// `link[href*=font]`
    pub fonts: usize,
    /// `<video>`
    pub videos: usize,
}

/// Transferred bytes by resource type; zero unless measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSizes {
    /// Image bytes
    pub images: u64,
    /// Script bytes
    pub scripts: u64,
    /// Stylesheet bytes
    pub stylesheets: u64,
    /// Font bytes
    pub fonts: u64,
    /// Video bytes
    pub videos: u64,
    /// All measured resources
    pub total: u64,
}

/// Optimization flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimizations {
    /// Lazy loading or responsive images in use
    pub image_optimization: bool,
    /// Minified scripts referenced
    pub minification: bool,
    /// Response was content-encoded
    pub compression: bool,
    /// Response carried caching headers
    pub caching: bool,
}

/// Resource and performance heuristics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Counts by type
    pub resource_counts: ResourceCounts,
    /// Sizes by type
    pub resource_sizes: ResourceSizes,
    /// Optimization flags
    pub optimizations: Optimizations,
}

/// Output of the structural extractor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralReport {
    /// Headings per level
    pub headings: Headings,
    /// Image composition
    pub images: ImageStats,
    /// Link composition
    pub links: LinkStats,
    /// Structure, navigation, accessibility and SEO blocks
    pub structure: StructuralAnalysis,
}

/// Complete SEO analysis of one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedSeoMetrics {
    /// Headings per level
    pub headings: Headings,
    /// Image composition
    pub images: ImageStats,
    /// Link composition
    pub links: LinkStats,
    /// Text statistics
    pub content: ContentStats,
    /// Transport facts
    pub technical: TechnicalStats,
    /// Technology fingerprints
    pub technologies: TechnologyDetection,
    /// Structural analysis
    pub structure: StructuralAnalysis,
    /// Resource heuristics
    pub performance: PerformanceMetrics,
}

/// Composes extractor outputs into the final report
pub struct ReportAggregator;

impl ReportAggregator {
    /// Transport-level stats taken straight from the document
    pub fn technical_stats(doc: &RenderedDocument) -> TechnicalStats {
        TechnicalStats {
            load_time_ms: doc.load_time_ms,
            page_size_bytes: doc
                .header("content-length")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
            http_status: doc.status,
            redirects: doc.redirect_count,
            ssl: doc.is_https(),
        }
    }

    /// Merge all parts into one report
    pub fn aggregate(
        doc: &RenderedDocument,
        structural: StructuralReport,
        technologies: TechnologyDetection,
        content: ContentStats,
        performance: PerformanceMetrics,
    ) -> AdvancedSeoMetrics {
        let StructuralReport {
            headings,
            images,
            links,
            structure,
        } = structural;

        AdvancedSeoMetrics {
            headings,
            images,
            links,
            content,
            technical: Self::technical_stats(doc),
            technologies,
            structure,
            performance,
        }
    }
}
