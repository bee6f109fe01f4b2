//! seolens command line
//!
//! Renders each URL in headless Chromium, analyzes it and prints one JSON
//! line per URL to stdout. Logs go to stderr.

use anyhow::{bail, Context};
use clap::Parser;
use seolens::browser::{BrowserConfig, BrowserController};
use seolens::document::{RenderRequest, RenderedDocument, Viewport, DEFAULT_USER_AGENT};
use seolens::engine::{AnalysisOutcome, AnalyzeOptions, SeoAnalyzer};
use seolens::error::AnalysisError;
use std::sync::Arc;
use tracing::info;

/// seolens: single-page SEO analysis
#[derive(Parser, Debug)]
#[command(name = "seolens")]
#[command(version)]
#[command(about = "Analyze rendered web pages for SEO signals")]
struct Args {
    /// URLs to analyze
    #[arg(required = true)]
    urls: Vec<String>,

    /// Maximum pages rendered at once
    #[arg(short, long, default_value_t = 4)]
    concurrency: usize,

    /// Navigation timeout in milliseconds
    #[arg(short, long, default_value_t = 30000)]
    timeout_ms: u64,

    /// User agent to present
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Viewport as WIDTHxHEIGHT
    #[arg(long, default_value = "1920x1080", value_parser = parse_viewport)]
    viewport: Viewport,

    /// Analyze a saved HTML file as if served from the (single) URL
    #[arg(long, value_name = "PATH")]
    html: Option<std::path::PathBuf>,

    /// Report non-2xx final responses as navigation failures
    #[arg(long)]
    fail_on_http_error: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Print engine metrics to stderr when done
    #[arg(long)]
    stats: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Run in headless mode
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    headless: bool,

    /// Disable the Chromium sandbox (needed in some containers)
    #[arg(long)]
    no_sandbox: bool,

    /// Extra navigation attempts per URL
    #[arg(long, default_value_t = 0)]
    retries: u32,
}

fn parse_viewport(s: &str) -> Result<Viewport, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width = w.trim().parse().map_err(|e| format!("bad width: {}", e))?;
    let height = h.trim().parse().map_err(|e| format!("bad height: {}", e))?;
    Ok(Viewport { width, height })
}

fn print_outcome(outcome: &AnalysisOutcome, pretty: bool) -> anyhow::Result<()> {
    let line = if pretty {
        serde_json::to_string_pretty(outcome)?
    } else {
        serde_json::to_string(outcome)?
    };
    println!("{}", line);
    Ok(())
}

async fn analyze_file(
    args: &Args,
    path: &std::path::Path,
) -> anyhow::Result<Vec<AnalysisOutcome>> {
    if args.urls.len() != 1 {
        bail!("--html takes exactly one URL");
    }
    let url = &args.urls[0];
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let result = match RenderedDocument::from_html(url, &html) {
        Ok(doc) => SeoAnalyzer::analyze_concurrent(Arc::new(doc))
            .await
            .map_err(AnalysisError::from),
        Err(err) => Err(AnalysisError::from(err)),
    };
    Ok(vec![AnalysisOutcome::new(url.clone(), result)])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let analyzer = SeoAnalyzer::new().with_options(AnalyzeOptions {
        fail_on_http_error: args.fail_on_http_error,
    });

    let outcomes = if let Some(path) = &args.html {
        analyze_file(&args, path).await?
    } else {
        let config = BrowserConfig {
            headless: args.headless,
            sandbox: !args.no_sandbox,
            chrome_path: args.chrome_path.clone(),
            navigation_retries: args.retries,
            ..Default::default()
        };

        let browser = BrowserController::launch(config)
            .await
            .context("launching browser")?;

        let requests = args
            .urls
            .iter()
            .map(|url| {
                RenderRequest::new(url.clone())
                    .timeout_ms(args.timeout_ms)
                    .user_agent(args.user_agent.clone())
                    .viewport(args.viewport.width, args.viewport.height)
            })
            .collect();

        let outcomes = analyzer
            .analyze_batch(&browser, requests, args.concurrency)
            .await;
        browser.close().await.context("closing browser")?;
        outcomes
    };

    for outcome in &outcomes {
        print_outcome(outcome, args.pretty)?;
    }

    if args.stats {
        eprint!("{}", analyzer.metrics().to_prometheus_format());
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    info!("{} of {} URLs analyzed", outcomes.len() - failed, outcomes.len());
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_viewport() {
        assert_eq!(
            parse_viewport("375x812").unwrap(),
            Viewport {
                width: 375,
                height: 812
            }
        );
        assert!(parse_viewport("375").is_err());
        assert!(parse_viewport("axb").is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["seolens", "https://example.com"]).unwrap();
        assert_eq!(args.concurrency, 4);
        assert_eq!(args.timeout_ms, 30000);
        assert!(args.headless);
        assert_eq!(args.viewport, Viewport::default());
        assert!(!args.fail_on_http_error);
    }

    #[test]
    fn test_args_require_url() {
        assert!(Args::try_parse_from(["seolens"]).is_err());
    }
}
