// src/commands/analyze.rs
//! The log -> report pipeline.
//!
//! loader -> post filter/enrich -> {stats, graph, smoothing} -> charts -> report.
//! One branch point: if no post events survive the filter, print a notice and
//! stop without touching the output file.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::config::AnalyzerConfig;
use crate::services::graph::{InteractionGraph, render_graph};
use crate::services::loader::load_events;
use crate::services::plot::{SmoothedPoint, render_sentiment, smooth_sentiment};
use crate::services::posts::{EnrichedPost, enrich_posts};
use crate::services::report::{
    ReportContext, activity_table_html, interaction_table_html, load_template, render_template,
    write_report,
};
use crate::services::sentiment::{LexiconScorer, SentimentScorer};
use crate::services::stats::{BotActivity, RunSummary, bot_activity, summarize};

pub struct Analyzer {
    config: AnalyzerConfig,
    scorer: Box<dyn SentimentScorer>,
}

/// Computed statistics for one log, before anything is rendered.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub posts: Vec<EnrichedPost>,
    pub summary: RunSummary,
    pub activity: Vec<BotActivity>,
    pub graph: InteractionGraph,
    pub smoothed: Vec<SmoothedPoint>,
    pub skipped_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MentionEdge {
    pub from: String,
    pub to: String,
    pub weight: u32,
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub summary: RunSummary,
    pub activity: Vec<BotActivity>,
    pub edges: Vec<MentionEdge>,
    pub output: PathBuf,
    pub fingerprint: String,
}

#[derive(Debug)]
pub enum AnalysisOutcome {
    /// The log held no post-generating events; nothing was written.
    NoPosts,
    Report(AnalysisReport),
}

impl Analysis {
    pub fn edges(&self) -> Vec<MentionEdge> {
        self.graph
            .edges()
            .map(|((from, to), weight)| MentionEdge {
                from: from.to_string(),
                to: to.to_string(),
                weight,
            })
            .collect()
    }

    /// blake3 over the canonical JSON of the statistics. Stable across runs on
    /// the same input; excludes the generation time and the images.
    pub fn fingerprint(&self) -> String {
        let canonical = json!({
            "summary": self.summary,
            "activity": self.activity,
            "edges": self.edges(),
        });
        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self::with_scorer(config, Box::new(LexiconScorer::new()))
    }

    pub fn with_scorer(config: AnalyzerConfig, scorer: Box<dyn SentimentScorer>) -> Self {
        Self { config, scorer }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Stages 1-3 plus graph construction and smoothing. `None` when the log
    /// has no post events.
    pub fn compute(&self, log_path: &Path) -> Result<Option<Analysis>> {
        let log = load_events(log_path)?;
        if log.skipped > 0 {
            tracing::info!(skipped = log.skipped, "dropped malformed log lines");
        }

        let posts = enrich_posts(&log.records, &self.config.log, self.scorer.as_ref())
            .with_context(|| format!("enrich post events from {}", log_path.display()))?;
        if posts.is_empty() {
            return Ok(None);
        }

        let summary = summarize(&posts);
        let activity = bot_activity(&posts);
        let graph = InteractionGraph::build(&posts);
        let smoothed = smooth_sentiment(&posts);
        tracing::info!(
            posts = summary.total_posts,
            bots = summary.bot_count,
            edges = graph.edge_count(),
            "log analysed"
        );

        Ok(Some(Analysis {
            posts,
            summary,
            activity,
            graph,
            smoothed,
            skipped_lines: log.skipped,
        }))
    }

    /// Full pipeline. Writes `<out_dir>/<report.output>` on success.
    pub fn analyze_log(&self, log_path: &Path, out_dir: &Path) -> Result<AnalysisOutcome> {
        println!("Analyzing {}...", log_path.display());

        let Some(analysis) = self.compute(log_path)? else {
            println!("No posts found in log file.");
            return Ok(AnalysisOutcome::NoPosts);
        };

        let charts = &self.config.charts;
        let graph_png =
            render_graph(&analysis.graph, charts).context("render interaction graph")?;
        let plot_png =
            render_sentiment(&analysis.smoothed, charts).context("render sentiment plot")?;

        let fingerprint = analysis.fingerprint();
        let ctx = ReportContext {
            generation_time: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            summary: analysis.summary.clone(),
            bot_activity_table: activity_table_html(&analysis.activity),
            interaction_table: interaction_table_html(&analysis.graph),
            interaction_graph_base64: graph_png,
            sentiment_plot_base64: plot_png,
            data_fingerprint: fingerprint.clone(),
        };
        let template = load_template(self.config.report.template.as_deref())?;
        let html = render_template(&template, &ctx.values());

        let output = out_dir.join(&self.config.report.output);
        write_report(&output, &html)?;
        tracing::info!(path = %output.display(), fingerprint = %fingerprint, "report written");

        Ok(AnalysisOutcome::Report(AnalysisReport {
            edges: analysis.edges(),
            summary: analysis.summary,
            activity: analysis.activity,
            output,
            fingerprint,
        }))
    }
}
