//! Extraction module tests
//!
//! These tests drive the extractors through whole pages the way the engine
//! does, rather than one helper at a time.

use pretty_assertions::assert_eq;
use seolens::document::RenderedDocument;
use seolens::extraction::{
    ContentAnalyzer, ExtractedLink, LinkExtractor, LinkType, MetadataExtractor, ResourceProfiler,
    StructuralExtractor,
};
use seolens::report::{Headings, LinkStats, ResourceCounts};
use url::Url;

const ARTICLE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <title>How to Brew Coffee</title>
    <meta name="description" content="A guide to brewing coffee at home.">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="index, follow">
    <link rel="canonical" href="https://coffee.example/brew">
    <link rel="stylesheet" href="/css/site.min.css">
    <meta property="og:title" content="Brew Coffee">
    <meta property="og:type" content="article">
    <meta property="twitter:card" content="summary_large_image">
    <script type="application/ld+json">
        {"@context": "https://schema.org", "@type": "HowTo", "name": "Brew coffee"}
    </script>
    <script src="/js/app.min.js"></script>
</head>
<body>
    <a href="#main">Skip to content</a>
    <header>
        <nav aria-label="Primary"><a href="/">Home</a><a href="/beans">Beans</a></nav>
    </header>
    <main id="main">
        <ol class="breadcrumb"><li><a href="/">Home</a></li><li>Brew</li></ol>
        <article>
            <h1>How to Brew Coffee</h1>
            <p>Brewing coffee is simple. Grind the beans, heat the water, and pour slowly.</p>
            <h2>Equipment</h2>
            <img src="/img/kettle.webp" alt="Gooseneck kettle">
            <img src="/img/grinder.jpg" alt="" loading="lazy">
            <h2>Method</h2>
            <img src="/img/pour.jpg">
            <p>See <a href="https://beans.example/origin" rel="nofollow sponsored">our partner</a>
               or <a href="mailto:hello@coffee.example">write to us</a>.</p>
        </article>
    </main>
    <footer>
        <nav><a href="/sitemap.xml">Sitemap</a></nav>
    </footer>
</body>
</html>"##;

fn article() -> RenderedDocument {
    RenderedDocument::from_html("https://coffee.example/brew", ARTICLE).unwrap()
}

#[test]
fn test_one_h1_two_h2() {
    let report = StructuralExtractor::extract(&article());
    assert_eq!(
        report.headings,
        Headings {
            h1: vec!["How to Brew Coffee".to_string()],
            h2: vec!["Equipment".to_string(), "Method".to_string()],
            ..Default::default()
        }
    );
    assert_eq!(report.structure.accessibility.heading_structure, vec!["h1", "h2", "h2"]);
}

#[test]
fn test_article_images() {
    let report = StructuralExtractor::extract(&article());
    assert_eq!(report.images.total, 3);
    assert_eq!(report.images.with_alt, 1);
    assert_eq!(report.images.without_alt, 2);
    assert_eq!(report.images.optimized, 2);
    assert_eq!(report.structure.accessibility.alt_text_images, 2);
}

#[test]
fn test_article_links() {
    let report = StructuralExtractor::extract(&article());
    assert_eq!(
        report.links,
        LinkStats {
            internal: 4,
            external: 1,
            nofollow: 1,
            dofollow: 6,
        }
    );
}

#[test]
fn test_article_structure_flags() {
    let structure = StructuralExtractor::extract(&article()).structure;

    let html = &structure.html_structure;
    assert!(html.has_header && html.has_nav && html.has_main && html.has_footer);
    assert!(html.has_article);
    assert!(!html.has_aside);
    assert!(html.has_viewport_meta);
    assert_eq!(html.lang.as_deref(), Some("en"));

    let nav = &structure.navigation;
    assert!(nav.main_navigation);
    assert!(nav.breadcrumbs);
    assert!(nav.footer_navigation);
    assert!(nav.sitemap_link);

    assert!(structure.accessibility.skip_links);
    assert_eq!(structure.accessibility.aria_labels, 1);
}

#[test]
fn test_article_seo_block() {
    let seo = MetadataExtractor::extract(&article().root);
    assert_eq!(seo.title.as_deref(), Some("How to Brew Coffee"));
    assert_eq!(
        seo.meta_description.as_deref(),
        Some("A guide to brewing coffee at home.")
    );
    assert_eq!(seo.canonical_url.as_deref(), Some("https://coffee.example/brew"));
    assert_eq!(seo.robots_meta.as_deref(), Some("index, follow"));
    assert_eq!(seo.open_graph.len(), 2);
    assert_eq!(seo.twitter_card["twitter:card"], "summary_large_image");
    assert_eq!(seo.json_ld.len(), 1);
    assert_eq!(seo.json_ld[0]["@type"], "HowTo");
}

#[test]
fn test_link_classification_examples() {
    let base = Url::parse("https://example.com/").unwrap();
    assert_eq!(LinkExtractor::classify("/about", &base), LinkType::Internal);
    assert_eq!(
        LinkExtractor::classify("https://other.com", &base),
        LinkType::External
    );
    assert_eq!(LinkExtractor::classify("#section", &base), LinkType::Anchor);
}

#[test]
fn test_nofollow_external_counts_in_both_buckets() {
    let doc = RenderedDocument::from_html(
        "https://example.com/",
        r#"<body><a href="https://other.com" rel="nofollow">x</a></body>"#,
    )
    .unwrap();
    let links: Vec<ExtractedLink> = LinkExtractor::extract_all(&doc.root, &doc.url);
    assert_eq!(links[0].link_type, LinkType::External);
    assert!(links[0].nofollow);

    let stats = LinkExtractor::stats(&links);
    assert_eq!(stats.external, 1);
    assert_eq!(stats.nofollow, 1);
    assert_eq!(stats.internal + stats.dofollow, 0);
}

#[test]
fn test_article_content() {
    let doc = article();
    let stats = ContentAnalyzer::analyze(&doc.body_text);
    assert!(stats.word_count > 20);
    assert!(stats.readability_score != 0.0);
    assert!(stats.keyword_density.contains_key("coffee"));
    assert!(stats.keyword_density.len() <= 10);
    assert!(stats.keyword_density.keys().all(|k| k.chars().count() > 3));
}

#[test]
fn test_article_resources() {
    let doc = article()
        .with_header("Cache-Control", "max-age=600")
        .with_header("Content-Encoding", "br");
    let perf = ResourceProfiler::profile(&doc);

    assert_eq!(
        perf.resource_counts,
        ResourceCounts {
            images: 3,
            scripts: 2,
            stylesheets: 1,
            fonts: 0,
            videos: 0,
        }
    );
    assert!(perf.optimizations.image_optimization);
    assert!(perf.optimizations.minification);
    assert!(perf.optimizations.compression);
    assert!(perf.optimizations.caching);
    assert_eq!(perf.resource_sizes.total, 0);
}
