//! Analysis engine
//!
//! [`SeoAnalyzer`] runs the four extractors over one [`RenderedDocument`]
//! and merges their results. The extractors share nothing but the read-only
//! snapshot, so they can run on separate blocking threads; the report is
//! only built once all four have finished, and a failure in any of them
//! fails the whole run.

use crate::document::{parse_page_url, RenderRequest, RenderedDocument, Renderer};
use crate::error::{AnalysisError, Error, ExtractionError, NavigationError, Result};
use crate::extraction::{ContentAnalyzer, ResourceProfiler, StructuralExtractor};
use crate::fingerprint::TechnologyFingerprinter;
use crate::metrics::EngineMetrics;
use crate::report::{AdvancedSeoMetrics, ReportAggregator};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Per-run options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOptions {
    /// Treat a non-2xx final status as a navigation failure
    #[serde(default)]
    pub fail_on_http_error: bool,
}

/// Result body of one analyzed URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Complete report
    Metrics(Box<AdvancedSeoMetrics>),
    /// Single failure for the URL
    Error(AnalysisError),
}

/// One line of batch output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    /// URL as requested
    pub url: String,
    /// When the run finished
    pub analyzed_at: DateTime<Utc>,
    /// Report or error
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl AnalysisOutcome {
    /// Wrap a run result
    pub fn new(
        url: impl Into<String>,
        result: std::result::Result<AdvancedSeoMetrics, AnalysisError>,
    ) -> Self {
        Self {
            url: url.into(),
            analyzed_at: Utc::now(),
            outcome: match result {
                Ok(metrics) => Outcome::Metrics(Box::new(metrics)),
                Err(err) => Outcome::Error(err),
            },
        }
    }

    /// Whether the run produced a report
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Metrics(_))
    }

    /// The report, if any
    pub fn metrics(&self) -> Option<&AdvancedSeoMetrics> {
        match &self.outcome {
            Outcome::Metrics(metrics) => Some(metrics),
            Outcome::Error(_) => None,
        }
    }

    /// The error, if any
    pub fn error(&self) -> Option<&AnalysisError> {
        match &self.outcome {
            Outcome::Metrics(_) => None,
            Outcome::Error(err) => Some(err),
        }
    }
}

/// SEO analysis engine
#[derive(Debug, Clone, Default)]
pub struct SeoAnalyzer {
    options: AnalyzeOptions,
    metrics: Arc<EngineMetrics>,
}

impl SeoAnalyzer {
    /// Engine with default options and its own metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Set run options
    pub fn with_options(mut self, options: AnalyzeOptions) -> Self {
        self.options = options;
        self
    }

    /// Record into a shared metrics instance
    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Current options
    pub fn options(&self) -> &AnalyzeOptions {
        &self.options
    }

    /// Metrics recorded by this engine
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Analyze a document on the calling thread
    #[instrument(skip(doc), fields(url = %doc.url))]
    pub fn analyze(doc: &RenderedDocument) -> AdvancedSeoMetrics {
        ReportAggregator::aggregate(
            doc,
            StructuralExtractor::extract(doc),
            TechnologyFingerprinter::detect(doc),
            ContentAnalyzer::analyze(&doc.body_text),
            ResourceProfiler::profile(doc),
        )
    }

    /// Analyze a document with each extractor on the blocking pool
    #[instrument(skip(doc), fields(url = %doc.url))]
    pub async fn analyze_concurrent(doc: Arc<RenderedDocument>) -> Result<AdvancedSeoMetrics> {
        let (structural, technologies, content, performance) = tokio::try_join!(
            run_extractor("structure", doc.clone(), StructuralExtractor::extract),
            run_extractor("fingerprint", doc.clone(), TechnologyFingerprinter::detect),
            run_extractor("content", doc.clone(), |d| ContentAnalyzer::analyze(&d.body_text)),
            run_extractor("resources", doc.clone(), ResourceProfiler::profile),
        )?;

        Ok(ReportAggregator::aggregate(
            &doc,
            structural,
            technologies,
            content,
            performance,
        ))
    }

    /// Render a URL and analyze the result
    #[instrument(skip(self, renderer, request), fields(url = %request.url))]
    pub async fn analyze_url<R: Renderer>(
        &self,
        renderer: &R,
        request: &RenderRequest,
    ) -> Result<AdvancedSeoMetrics> {
        let start = Instant::now();
        self.metrics.inc_active();
        let result = self.render_and_analyze(renderer, request).await;
        self.metrics.dec_active();

        match &result {
            Ok(_) => {
                let elapsed = start.elapsed();
                self.metrics.record_analysis(elapsed);
                info!("Analyzed {} in {:?}", request.url, elapsed);
            }
            Err(err) => {
                self.metrics.record_failure(err.kind());
                warn!(kind = %err.kind(), "Analysis of {} failed: {}", request.url, err);
            }
        }
        result
    }

    async fn render_and_analyze<R: Renderer>(
        &self,
        renderer: &R,
        request: &RenderRequest,
    ) -> Result<AdvancedSeoMetrics> {
        // reject before any navigation happens
        parse_page_url(&request.url)?;

        let doc = renderer.render(request).await?;
        self.metrics.record_render();
        debug!(
            "Rendered {} (status {}, {} redirects, {}ms)",
            doc.url, doc.status, doc.redirect_count, doc.load_time_ms
        );

        if self.options.fail_on_http_error && !(200..300).contains(&doc.status) {
            return Err(NavigationError::HttpError {
                status: doc.status,
                message: format!("final response for {}", doc.url),
            }
            .into());
        }

        Self::analyze_concurrent(Arc::new(doc)).await
    }

    /// Analyze several URLs with at most `concurrency` runs in flight.
    /// Yields exactly one outcome per request, in completion order.
    #[instrument(skip(self, renderer, requests), fields(count = requests.len()))]
    pub async fn analyze_batch<R: Renderer>(
        &self,
        renderer: &R,
        requests: Vec<RenderRequest>,
        concurrency: usize,
    ) -> Vec<AnalysisOutcome> {
        let outcomes: Vec<AnalysisOutcome> = stream::iter(requests)
            .map(|request| async move {
                let result = self
                    .analyze_url(renderer, &request)
                    .await
                    .map_err(AnalysisError::from);
                AnalysisOutcome::new(request.url, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(
            "Batch finished: {} analyzed, {} failed",
            outcomes.len() - failed,
            failed
        );
        outcomes
    }
}

async fn run_extractor<T, F>(
    name: &'static str,
    doc: Arc<RenderedDocument>,
    extract: F,
) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&RenderedDocument) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || extract(&doc))
        .await
        .map_err(|e| {
            Error::from(ExtractionError::ExtractorPanicked {
                extractor: name,
                message: e.to_string(),
            })
        })
}
