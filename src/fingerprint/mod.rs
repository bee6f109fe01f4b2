//! Technology fingerprinting
//!
//! Detection is table driven: every [`Rule`] names a technology and a list of
//! [`Signal`]s, and matches when any signal does. Rules are independent and
//! monotonic, so a page can be flagged for WordPress and React at once.
//!
//! Global variables are never probed here. The rendering collaborator
//! captures which of [`global_probes`] exist in the page and hands the set
//! over on the [`RenderedDocument`]; checking a global is then a plain set
//! lookup.

pub mod rules;

use crate::document::{Element, RenderedDocument};
use crate::report::TechnologyDetection;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

pub use rules::RULES;

/// Technology category, one per list in [`TechnologyDetection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Content management systems
    Cms,
    /// Front-end frameworks
    Frameworks,
    /// Analytics and tag managers
    Analytics,
    /// Advertising networks
    Advertising,
    /// E-commerce platforms
    Ecommerce,
    /// Content delivery networks
    Cdn,
    /// Web servers and hosting platforms
    WebServer,
    /// Server-side languages
    ProgrammingLanguages,
    /// Databases and backend data services
    Databases,
    /// JavaScript libraries
    JsLibraries,
}

impl Category {
    /// The report list this category fills
    pub fn list_mut<'a>(&self, detection: &'a mut TechnologyDetection) -> &'a mut Vec<String> {
        match self {
            Category::Cms => &mut detection.cms,
            Category::Frameworks => &mut detection.frameworks,
            Category::Analytics => &mut detection.analytics,
            Category::Advertising => &mut detection.advertising,
            Category::Ecommerce => &mut detection.ecommerce,
            Category::Cdn => &mut detection.cdn,
            Category::WebServer => &mut detection.web_server,
            Category::ProgrammingLanguages => &mut detection.programming_languages,
            Category::Databases => &mut detection.databases,
            Category::JsLibraries => &mut detection.js_libraries,
        }
    }
}

/// A single observable marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Substring of any `script[src]`
    ScriptSrc(&'static str),
    /// Substring of any `link[href]`
    LinkHref(&'static str),
    /// Substring of any script `src` or link `href`
    AssetUrl(&'static str),
    /// Substring of any `meta[name=generator]` content
    Generator(&'static str),
    /// Presence of `meta[name=<name>]`
    MetaName(&'static str),
    /// Any element carries the attribute
    Attribute(&'static str),
    /// Any element carries an attribute starting with the prefix
    AttributePrefix(&'static str),
    /// Any element has `name="value"`
    AttributeValue(&'static str, &'static str),
    /// Any element has a class starting with the prefix
    ClassPrefix(&'static str),
    /// The global variable exists in the page
    Global(&'static str),
}

impl Signal {
    /// Evaluate this signal against the collected page markers
    pub fn matches(&self, input: &FingerprintInput<'_>) -> bool {
        let any_contains = |urls: &[String], needle: &str| {
            let needle = needle.to_ascii_lowercase();
            urls.iter().any(|u| u.contains(&needle))
        };

        match *self {
            Signal::ScriptSrc(needle) => any_contains(&input.script_srcs, needle),
            Signal::LinkHref(needle) => any_contains(&input.link_hrefs, needle),
            Signal::AssetUrl(needle) => {
                any_contains(&input.script_srcs, needle) || any_contains(&input.link_hrefs, needle)
            }
            Signal::Generator(needle) => any_contains(&input.generators, needle),
            Signal::MetaName(name) => input.meta_names.contains(&name.to_ascii_lowercase()),
            Signal::Attribute(name) => input.attributes.contains(name),
            Signal::AttributePrefix(prefix) => {
                input.attributes.iter().any(|a| a.starts_with(prefix))
            }
            Signal::AttributeValue(name, value) => {
                input.root.elements().any(|el| el.attr(name) == Some(value))
            }
            Signal::ClassPrefix(prefix) => input.classes.iter().any(|c| c.starts_with(prefix)),
            Signal::Global(name) => input.globals.contains(name),
        }
    }
}

/// One technology and the markers that reveal it
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Report category
    pub category: Category,
    /// Reported name
    pub name: &'static str,
    /// Any of these matching flags the technology
    pub signals: &'static [Signal],
}

impl Rule {
    /// Whether any signal matches
    pub fn matches(&self, input: &FingerprintInput<'_>) -> bool {
        self.signals.iter().any(|signal| signal.matches(input))
    }
}

/// Distinct global variable names the rule table inspects, sorted
pub fn global_probes() -> Vec<&'static str> {
    RULES
        .iter()
        .flat_map(|rule| rule.signals.iter())
        .filter_map(|signal| match signal {
            Signal::Global(name) => Some(*name),
            _ => None,
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Markers gathered from a document in one DOM walk
#[derive(Debug)]
pub struct FingerprintInput<'a> {
    root: &'a Element,
    globals: &'a BTreeSet<String>,
    /// Lower-cased `script[src]` values
    pub script_srcs: Vec<String>,
    /// Lower-cased `link[href]` values
    pub link_hrefs: Vec<String>,
    /// Lower-cased `meta[name=generator]` contents
    pub generators: Vec<String>,
    /// Lower-cased `meta[name]` values
    pub meta_names: BTreeSet<String>,
    /// Every attribute name in the document
    pub attributes: BTreeSet<String>,
    /// Every class name in the document
    pub classes: BTreeSet<String>,
}

impl<'a> FingerprintInput<'a> {
    /// Collect markers from the DOM plus the captured global set
    pub fn collect(root: &'a Element, globals: &'a BTreeSet<String>) -> Self {
        let mut input = Self {
            root,
            globals,
            script_srcs: Vec::new(),
            link_hrefs: Vec::new(),
            generators: Vec::new(),
            meta_names: BTreeSet::new(),
            attributes: BTreeSet::new(),
            classes: BTreeSet::new(),
        };

        for el in root.elements() {
            match el.tag.as_str() {
                "script" => {
                    if let Some(src) = el.attr("src") {
                        input.script_srcs.push(src.to_ascii_lowercase());
                    }
                }
                "link" => {
                    if let Some(href) = el.attr("href") {
                        input.link_hrefs.push(href.to_ascii_lowercase());
                    }
                }
                "meta" => {
                    if let Some(name) = el.attr("name").map(|n| n.trim().to_ascii_lowercase()) {
                        if name == "generator" {
                            if let Some(content) = el.attr("content") {
                                input.generators.push(content.to_ascii_lowercase());
                            }
                        }
                        input.meta_names.insert(name);
                    }
                }
                _ => {}
            }

            input.attributes.extend(el.attrs.keys().cloned());
            if let Some(class) = el.attr("class") {
                input
                    .classes
                    .extend(class.split_whitespace().map(String::from));
            }
        }
        input
    }
}

/// Technology fingerprinting functionality
pub struct TechnologyFingerprinter;

impl TechnologyFingerprinter {
    /// Detect technologies with the built-in rule table
    #[instrument(skip(doc), fields(url = %doc.url))]
    pub fn detect(doc: &RenderedDocument) -> TechnologyDetection {
        let input = FingerprintInput::collect(&doc.root, &doc.globals);
        let detection = Self::detect_with(&input, RULES);
        debug!(
            "Fingerprinted {} scripts, {} links: cms={:?}, frameworks={:?}",
            input.script_srcs.len(),
            input.link_hrefs.len(),
            detection.cms,
            detection.frameworks
        );
        detection
    }

    /// Apply an arbitrary rule table. Names land in table order, each at
    /// most once per category.
    pub fn detect_with(input: &FingerprintInput<'_>, rules: &[Rule]) -> TechnologyDetection {
        let mut detection = TechnologyDetection::default();
        for rule in rules.iter().filter(|rule| rule.matches(input)) {
            let list = rule.category.list_mut(&mut detection);
            if !list.iter().any(|name| name == rule.name) {
                list.push(rule.name.to_string());
            }
        }
        detection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detect(html: &str) -> TechnologyDetection {
        let doc = RenderedDocument::from_html("https://example.com/", html).unwrap();
        TechnologyFingerprinter::detect(&doc)
    }

    #[test]
    fn test_wordpress_generator() {
        let tech = detect(
            r#"<html><head><meta name="generator" content="WordPress 6.4.2"></head><body></body></html>"#,
        );
        assert_eq!(tech.cms, vec!["WordPress"]);
    }

    #[test]
    fn test_wordpress_asset_paths_case_insensitive() {
        let tech = detect(
            r#"<html><head><link rel="stylesheet" href="/WP-CONTENT/themes/x/style.css"></head></html>"#,
        );
        assert_eq!(tech.cms, vec!["WordPress"]);
    }

    #[test]
    fn test_no_markers_detects_nothing() {
        let tech = detect("<html><head><title>Plain</title></head><body><p>Hi</p></body></html>");
        assert!(tech.is_empty());
    }

    #[test]
    fn test_dom_attribute_signals() {
        let tech = detect(
            r#"<html><body>
                <div id="__next"><div data-reactroot=""><span data-v-1a2b3c="">x</span></div></div>
                <div ng-version="17.0.0"></div>
            </body></html>"#,
        );
        assert_eq!(tech.frameworks, vec!["React", "Vue.js", "Angular", "Next.js"]);
    }

    #[test]
    fn test_rules_are_monotonic_across_categories() {
        let tech = detect(
            r#"<html><head>
                <meta name="generator" content="WordPress">
                <script src="https://ajax.googleapis.com/ajax/libs/jquery/3.7.1/jquery.min.js"></script>
                <script src="https://www.googletagmanager.com/gtag/js?id=G-XXXX"></script>
            </head><body><div data-reactroot></div></body></html>"#,
        );
        assert_eq!(tech.cms, vec!["WordPress"]);
        assert_eq!(tech.frameworks, vec!["React"]);
        assert_eq!(tech.js_libraries, vec!["jQuery"]);
        assert_eq!(tech.cdn, vec!["Google Hosted Libraries"]);
        assert_eq!(tech.analytics, vec!["Google Analytics"]);
    }

    #[test]
    fn test_server_side_markers() {
        let tech = detect(
            r#"<html><head><meta name="csrf-param" content="authenticity_token"></head><body>
                <form action="/login.php"><input type="hidden" name="csrfmiddlewaretoken" value="x"></form>
                <input type="hidden" name="__VIEWSTATE" value="abc">
            </body></html>"#,
        );
        assert_eq!(tech.programming_languages, vec!["ASP.NET", "Ruby", "Python"]);
    }

    #[test]
    fn test_globals_are_set_lookups() {
        let doc = RenderedDocument::from_html("https://example.com/", "<html></html>")
            .unwrap()
            .with_globals(["jQuery", "Shopify", "fbq", "unrelated"]);
        let tech = TechnologyFingerprinter::detect(&doc);
        assert_eq!(tech.js_libraries, vec!["jQuery"]);
        assert_eq!(tech.ecommerce, vec!["Shopify"]);
        assert_eq!(tech.analytics, vec!["Facebook Pixel"]);
    }

    #[test]
    fn test_duplicate_names_deduplicated() {
        static DUPES: &[Rule] = &[
            Rule {
                category: Category::Cdn,
                name: "Example CDN",
                signals: &[Signal::AssetUrl("cdn.example.com")],
            },
            Rule {
                category: Category::Cdn,
                name: "Example CDN",
                signals: &[Signal::LinkHref("cdn.example.com")],
            },
        ];
        let root = Element::parse_html(
            r#"<html><head><link href="https://cdn.example.com/a.css"></head></html>"#,
        );
        let globals = BTreeSet::new();
        let input = FingerprintInput::collect(&root, &globals);
        let tech = TechnologyFingerprinter::detect_with(&input, DUPES);
        assert_eq!(tech.cdn, vec!["Example CDN"]);
    }

    #[test]
    fn test_global_probes_sorted_and_distinct() {
        let probes = global_probes();
        assert!(probes.contains(&"React"));
        assert!(probes.contains(&"jQuery"));
        let mut sorted = probes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(probes, sorted);
    }
}
