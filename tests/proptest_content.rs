//! Property-based testing for content and link analysis.
//!
//! Uses proptest to generate arbitrary text and markup and verify the
//! invariants of the report: bounded densities, consistent counters and no
//! panics on any input.

use proptest::prelude::*;
use seolens::document::{Element, RenderedDocument};
use seolens::engine::SeoAnalyzer;
use seolens::extraction::{ContentAnalyzer, LinkExtractor, LinkType};
use url::Url;

// ============================================================================
// STRATEGIES
// ============================================================================

/// Strategy for prose-like text: words, punctuation and whitespace
pub fn arb_prose() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-zA-Z]{1,12}",
            Just(".".to_string()),
            Just("!".to_string()),
            Just(",".to_string()),
            Just("\n".to_string()),
            "[0-9]{1,4}",
        ],
        0..200,
    )
    .prop_map(|parts| parts.join(" "))
}

/// Strategy for href values of every shape the classifier knows
pub fn arb_href() -> impl Strategy<Value = String> {
    prop_oneof![
        "/[a-z0-9/]{0,20}",
        "#[a-z]{0,10}",
        "https://[a-z]{1,10}\\.(com|org|example)/[a-z]{0,10}",
        "mailto:[a-z]{1,8}@example\\.com",
        "tel:\\+[0-9]{6,12}",
        "javascript:void\\(0\\)",
        "//[a-z]{1,10}\\.com/x",
        ".{0,30}",
    ]
}

/// Strategy for a small page built from generated pieces
pub fn arb_page() -> impl Strategy<Value = Element> {
    (
        prop::collection::vec(arb_href(), 0..20),
        prop::collection::vec(any::<bool>(), 0..20),
        arb_prose(),
        prop::collection::vec((1u8..=6, "[a-zA-Z ]{0,20}"), 0..10),
    )
        .prop_map(|(hrefs, nofollow, text, headings)| {
            let mut body = Element::new("body").with_text(text);
            for (level, heading) in headings {
                body = body.with_child(Element::new(format!("h{}", level)).with_text(heading));
            }
            for (i, href) in hrefs.into_iter().enumerate() {
                let mut a = Element::new("a").with_attr("href", href).with_text("link");
                if nofollow.get(i).copied().unwrap_or(false) {
                    a = a.with_attr("rel", "nofollow");
                }
                body = body.with_child(a);
            }
            Element::new("html").with_child(body)
        })
}

// ============================================================================
// CONTENT PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn syllables_at_least_one(word in ".{0,30}") {
        prop_assert!(ContentAnalyzer::count_syllables(&word) >= 1);
    }

    #[test]
    fn density_bounded(text in arb_prose()) {
        let stats = ContentAnalyzer::analyze(&text);
        prop_assert!(stats.keyword_density.len() <= 10);

        let mut sum = 0.0;
        for (word, density) in &stats.keyword_density {
            prop_assert!(word.chars().count() > 3);
            prop_assert!(*density > 0.0 && *density <= 100.0);
            sum += density;
        }
        prop_assert!(sum <= 100.0 + 1e-9);
    }

    #[test]
    fn word_count_matches_whitespace_split(text in arb_prose()) {
        let stats = ContentAnalyzer::analyze(&text);
        prop_assert_eq!(stats.word_count, text.split_whitespace().count());
        if stats.word_count == 0 {
            prop_assert_eq!(stats.readability_score, 0.0);
            prop_assert!(stats.keyword_density.is_empty());
        }
    }

    #[test]
    fn readability_is_finite(text in ".{0,500}") {
        prop_assert!(ContentAnalyzer::readability_score(&text).is_finite());
    }
}

// ============================================================================
// LINK AND REPORT PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn classify_never_panics(href in arb_href()) {
        let base = Url::parse("https://example.com/page").unwrap();
        let kind = LinkExtractor::classify(&href, &base);
        if href.trim().starts_with('#') {
            prop_assert_eq!(kind, LinkType::Anchor);
        }
    }

    #[test]
    fn link_counters_consistent(root in arb_page()) {
        let doc = RenderedDocument::new("https://example.com/", root).unwrap();
        let links = LinkExtractor::extract_all(&doc.root, &doc.url);
        let stats = LinkExtractor::stats(&links);

        prop_assert_eq!(stats.nofollow + stats.dofollow, links.len());
        prop_assert!(stats.internal + stats.external <= links.len());
    }

    #[test]
    fn report_counters_consistent(root in arb_page()) {
        let doc = RenderedDocument::new("https://example.com/", root).unwrap();
        let report = SeoAnalyzer::analyze(&doc);

        prop_assert_eq!(report.images.with_alt + report.images.without_alt, report.images.total);
        prop_assert!(report.images.optimized <= report.images.total);
        let headings = &report.headings;
        let total = headings.h1.len() + headings.h2.len() + headings.h3.len()
            + headings.h4.len() + headings.h5.len() + headings.h6.len();
        prop_assert_eq!(total, report.structure.accessibility.heading_structure.len());
    }

    #[test]
    fn analysis_is_deterministic(root in arb_page()) {
        let doc = RenderedDocument::new("https://example.com/", root).unwrap();
        let first = serde_json::to_string(&SeoAnalyzer::analyze(&doc)).unwrap();
        let second = serde_json::to_string(&SeoAnalyzer::analyze(&doc)).unwrap();
        prop_assert_eq!(first, second);
    }
}
