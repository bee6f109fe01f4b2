//! seolens - Single-Page SEO Analysis Engine
//!
//! This crate renders a web page through headless Chromium and derives a
//! structured bundle of SEO signals from the result.
//!
//! # Features
//!
//! - **Structure**: headings, images, links, landmarks, navigation and
//!   accessibility markers, canonical/robots/Open Graph/Twitter/JSON-LD
//! - **Technology Fingerprints**: table-driven detection of CMSs,
//!   frameworks, analytics, advertising, e-commerce, CDNs and more
//! - **Content**: word count, keyword density, Flesch Reading Ease
//! - **Resources**: counts, measured transfer sizes and optimization flags
//!
//! # Architecture
//!
//! ```text
//! RenderRequest ──▶ Renderer (BrowserController, CDP)
//!                        │
//!                        ▼
//!                 RenderedDocument (immutable)
//!                        │
//!     ┌──────────────┬───┴──────────┬──────────────┐
//!     ▼              ▼              ▼              ▼
//! Structural   Fingerprinter   Content       Resources
//!     └──────────────┴───┬──────────┴──────────────┘
//!                        ▼
//!                ReportAggregator ──▶ AdvancedSeoMetrics
//! ```
//!
//! The analysis stage never performs I/O; everything it reads is on the
//! [`RenderedDocument`].
//!
//! # Quick Start
//!
//! ```rust
//! use seolens::document::RenderedDocument;
//! use seolens::engine::SeoAnalyzer;
//!
//! let doc = RenderedDocument::from_html(
//!     "https://example.com/",
//!     r#"<html><head><meta name="generator" content="WordPress 6.5"></head>
//!        <body><h1>Hello</h1></body></html>"#,
//! )?;
//!
//! let report = SeoAnalyzer::analyze(&doc);
//! assert_eq!(report.headings.h1, vec!["Hello"]);
//! assert_eq!(report.technologies.cms, vec!["WordPress"]);
//! # Ok::<(), seolens::Error>(())
//! ```
//!
//! Rendering a live page:
//!
//! ```rust,no_run
//! use seolens::browser::{BrowserConfig, BrowserController};
//! use seolens::document::RenderRequest;
//! use seolens::engine::SeoAnalyzer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let browser = BrowserController::launch(BrowserConfig::default()).await?;
//!     let analyzer = SeoAnalyzer::new();
//!
//!     let report = analyzer
//!         .analyze_url(&browser, &RenderRequest::new("https://example.com"))
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!
//!     browser.close().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod document;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod fingerprint;
pub mod metrics;
pub mod report;

// Re-exports for convenience
pub use browser::BrowserController;
pub use document::{RenderRequest, RenderedDocument, Renderer};
pub use engine::{AnalysisOutcome, AnalyzeOptions, SeoAnalyzer};
pub use error::{AnalysisError, Error, ErrorKind, Result};
pub use fingerprint::TechnologyFingerprinter;
pub use report::AdvancedSeoMetrics;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
