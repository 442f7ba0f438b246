// src/services/report.rs
//! Report renderer: fills `{{ name }}` placeholders in the HTML template and
//! writes the document. No templating logic beyond substitution.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::services::graph::InteractionGraph;
use crate::services::stats::{BotActivity, RunSummary};
use crate::utils::fsio::write_atomic;
use crate::utils::html::escape;

pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/report_template.html");

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder regex")
});

/// Everything the template can reference.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub generation_time: String,
    pub summary: RunSummary,
    pub bot_activity_table: String,
    pub interaction_table: String,
    pub interaction_graph_base64: String,
    pub sentiment_plot_base64: String,
    pub data_fingerprint: String,
}

impl ReportContext {
    pub fn values(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("generation_time", self.generation_time.clone()),
            ("total_posts", self.summary.total_posts.to_string()),
            ("duration_minutes", format!("{:.2}", self.summary.duration_minutes)),
            ("avg_words_per_post", format!("{:.2}", self.summary.avg_words_per_post)),
            ("bot_count", self.summary.bot_count.to_string()),
            ("bot_activity_table", self.bot_activity_table.clone()),
            ("interaction_table", self.interaction_table.clone()),
            ("interaction_graph_base64", self.interaction_graph_base64.clone()),
            ("sentiment_plot_base64", self.sentiment_plot_base64.clone()),
            ("data_fingerprint", self.data_fingerprint.clone()),
        ])
    }
}

/// Load the template override, or the embedded one.
pub fn load_template(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => fs::read_to_string(p).with_context(|| format!("read template {}", p.display())),
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}

/// Substitute placeholders. Unknown names render empty.
pub fn render_template(template: &str, values: &BTreeMap<&str, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            match values.get(name) {
                Some(v) => v.clone(),
                None => {
                    tracing::warn!(placeholder = name, "template placeholder has no value");
                    String::new()
                }
            }
        })
        .into_owned()
}

pub fn activity_table_html(rows: &[BotActivity]) -> String {
    let mut html = String::from(
        "<table border=\"1\" class=\"dataframe table table-striped\">\n  <thead>\n    <tr style=\"text-align: right;\">\n      <th>bot_name</th>\n      <th>posts</th>\n      <th>avg_words</th>\n    </tr>\n  </thead>\n  <tbody>\n",
    );
    for row in rows {
        html.push_str(&format!(
            "    <tr>\n      <td>{}</td>\n      <td>{}</td>\n      <td>{:.2}</td>\n    </tr>\n",
            escape(&row.bot_name),
            row.post_count,
            row.avg_word_count
        ));
    }
    html.push_str("  </tbody>\n</table>");
    html
}

pub fn interaction_table_html(graph: &InteractionGraph) -> String {
    if graph.edge_count() == 0 {
        return "<p>No @mentions between bots.</p>".to_string();
    }
    let mut html = String::from(
        "<table class=\"table table-striped\">\n  <thead>\n    <tr><th>from</th><th>to</th><th>mentions</th></tr>\n  </thead>\n  <tbody>\n",
    );
    for ((from, to), weight) in graph.edges() {
        html.push_str(&format!(
            "    <tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(from),
            escape(to),
            weight
        ));
    }
    html.push_str("  </tbody>\n</table>");
    html
}

/// Create or overwrite the report at `path`.
pub fn write_report(path: &Path, html: &str) -> Result<()> {
    write_atomic(path, html.as_bytes()).with_context(|| format!("write report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_and_blanks_unknown() {
        let values = BTreeMap::from([("total_posts", "2".to_string())]);
        let out = render_template("<p>{{ total_posts }}|{{total_posts}}|{{ missing }}</p>", &values);
        assert_eq!(out, "<p>2|2|</p>");
    }

    #[test]
    fn leaves_non_placeholders_alone() {
        let out = render_template("{ single } {{ 1bad }}", &BTreeMap::new());
        assert_eq!(out, "{ single } {{ 1bad }}");
    }

    #[test]
    fn embedded_template_has_every_placeholder() {
        for name in [
            "generation_time",
            "total_posts",
            "duration_minutes",
            "avg_words_per_post",
            "bot_count",
            "bot_activity_table",
            "interaction_graph_base64",
            "sentiment_plot_base64",
        ] {
            assert!(DEFAULT_TEMPLATE.contains(&format!("{{{{ {name} }}}}")), "missing {name}");
        }
    }

    #[test]
    fn activity_table_escapes_names() {
        let rows = vec![BotActivity {
            bot_name: "<Dan>".into(),
            post_count: 3,
            avg_word_count: 4.5,
        }];
        let html = activity_table_html(&rows);
        assert!(html.contains("<td>&lt;Dan&gt;</td>"));
        assert!(html.contains("<td>3</td>"));
        assert!(html.contains("<td>4.50</td>"));
    }
}
