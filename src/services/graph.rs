// src/services/graph.rs
//! Directed, weighted @-mention graph between known bots, plus its raster render.
//!
//! Nodes are the distinct bot names seen in posts. An edge `sender -> bot`
//! counts the posts in which `sender` mentioned `bot`. Self-mentions and
//! unknown names never produce an edge.

use anyhow::Result;
use once_cell::sync::Lazy;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::ChartsConfig;
use crate::services::layout::{LayoutParams, spring_layout};
use crate::services::posts::EnrichedPost;
use crate::utils::fonts::{CHART_FAMILY, ensure_chart_fonts};
use crate::utils::png::rgb_to_png_base64;

static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("mention regex"));

pub const MAX_EDGE_WIDTH: f64 = 5.0;
pub const DEFAULT_EDGE_WIDTH: f64 = 1.0;

// Render constants, in data units unless noted.
const AXIS_LIMIT: f64 = 1.3;
const NODE_RADIUS_PX: u32 = 34;
const NODE_CLEARANCE: f64 = 0.11;
const ARC_RAD: f64 = 0.1;
const ARROW_LEN: f64 = 0.06;
const EDGE_PX_PER_WIDTH: f64 = 1.5;
const CURVE_SAMPLES: usize = 32;

const NODE_BLUE: RGBColor = RGBColor(135, 206, 235);
const EDGE_GRAY: RGBColor = RGBColor(128, 128, 128);

#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    nodes: Vec<String>,
    edges: BTreeMap<(String, String), u32>,
}

/// Distinct mention tokens in `content`, without the `@`.
pub fn mentions(content: &str) -> BTreeSet<&str> {
    MENTION_RE
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

impl InteractionGraph {
    pub fn new<I, S>(bots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nodes: BTreeSet<String> = bots.into_iter().map(Into::into).collect();
        Self {
            nodes: nodes.into_iter().collect(),
            edges: BTreeMap::new(),
        }
    }

    /// One node per distinct bot, edges from every post's mentions.
    pub fn build(posts: &[EnrichedPost]) -> Self {
        let mut graph = Self::new(posts.iter().map(|p| p.bot_name.clone()));
        for p in posts {
            graph.record_post(&p.bot_name, &p.content);
        }
        graph
    }

    /// Fold one post's mentions into the edge weights.
    pub fn record_post(&mut self, sender: &str, content: &str) {
        for name in mentions(content) {
            if name == sender || !self.has_node(name) {
                continue;
            }
            *self
                .edges
                .entry((sender.to_string(), name.to_string()))
                .or_insert(0) += 1;
        }
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.nodes.binary_search_by(|n| n.as_str().cmp(name)).ok()
    }

    pub fn weight(&self, from: &str, to: &str) -> Option<u32> {
        self.edges.get(&(from.to_string(), to.to_string())).copied()
    }

    /// Edges ordered by (from, to).
    pub fn edges(&self) -> impl Iterator<Item = ((&str, &str), u32)> + '_ {
        self.edges
            .iter()
            .map(|((f, t), w)| ((f.as_str(), t.as_str()), *w))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn max_weight(&self) -> Option<u32> {
        self.edges.values().copied().max()
    }

    /// Line width for an edge: linear in `weight / max_weight`, topping out at
    /// [`MAX_EDGE_WIDTH`]. Uniform [`DEFAULT_EDGE_WIDTH`] when there are no edges.
    pub fn edge_width(&self, weight: u32) -> f64 {
        match self.max_weight() {
            Some(max) if max > 0 => f64::from(weight) / f64::from(max) * MAX_EDGE_WIDTH,
            _ => DEFAULT_EDGE_WIDTH,
        }
    }
}

pub fn layout_params(charts: &ChartsConfig) -> LayoutParams {
    LayoutParams {
        iterations: charts.layout_iterations,
        k: charts.layout_k,
        seed: charts.layout_seed,
    }
}

/// Lay out and draw the graph, returning a base64 PNG.
pub fn render_graph(graph: &InteractionGraph, charts: &ChartsConfig) -> Result<String> {
    ensure_chart_fonts()?;
    let positions = spring_layout(graph, layout_params(charts));
    let (w, h) = (charts.graph_width, charts.graph_height);
    let mut buf = vec![0u8; w as usize * h as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .caption("Bot Interaction Graph (@mentions)", (CHART_FAMILY, 24))
            .margin(30)
            .build_cartesian_2d(-AXIS_LIMIT..AXIS_LIMIT, -AXIS_LIMIT..AXIS_LIMIT)?;

        let mut curves = Vec::with_capacity(graph.edge_count());
        let mut heads = Vec::with_capacity(graph.edge_count());
        for ((from, to), weight) in graph.edges() {
            let (Some(i), Some(j)) = (graph.index_of(from), graph.index_of(to)) else {
                continue;
            };
            let points = clipped_arc(positions[i], positions[j]);
            if points.len() < 2 {
                continue;
            }
            let px = (graph.edge_width(weight) * EDGE_PX_PER_WIDTH).round().max(1.0) as u32;
            heads.push(arrow_head(points[points.len() - 2], points[points.len() - 1]));
            curves.push(PathElement::new(points, EDGE_GRAY.stroke_width(px)));
        }
        chart.draw_series(curves)?;
        chart.draw_series(
            heads
                .into_iter()
                .map(|tri| Polygon::new(tri, EDGE_GRAY.filled())),
        )?;

        chart.draw_series(
            positions
                .iter()
                .map(|&p| Circle::new(p, NODE_RADIUS_PX, NODE_BLUE.mix(0.8).filled())),
        )?;

        let label = TextStyle::from((CHART_FAMILY, 14).into_font().style(FontStyle::Bold))
            .pos(Pos::new(HPos::Center, VPos::Center));
        chart.draw_series(
            graph
                .nodes()
                .iter()
                .zip(&positions)
                .map(|(name, &p)| Text::new(name.clone(), p, label.clone())),
        )?;

        root.present()?;
    }
    tracing::debug!(
        nodes = graph.nodes().len(),
        edges = graph.edge_count(),
        "interaction graph rendered"
    );
    rgb_to_png_base64(buf, w, h)
}

/// Quadratic arc bent to the left of `a -> b`, trimmed so it starts and ends
/// outside the node circles. Keeps A->B and B->A apart.
fn clipped_arc(a: (f64, f64), b: (f64, f64)) -> Vec<(f64, f64)> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let ctrl = ((a.0 + b.0) / 2.0 - ARC_RAD * dy, (a.1 + b.1) / 2.0 + ARC_RAD * dx);
    (0..=CURVE_SAMPLES)
        .map(|s| {
            let t = s as f64 / CURVE_SAMPLES as f64;
            let u = 1.0 - t;
            (
                u * u * a.0 + 2.0 * u * t * ctrl.0 + t * t * b.0,
                u * u * a.1 + 2.0 * u * t * ctrl.1 + t * t * b.1,
            )
        })
        .filter(|&p| dist(p, a) > NODE_CLEARANCE && dist(p, b) > NODE_CLEARANCE)
        .collect()
}

fn arrow_head(prev: (f64, f64), tip: (f64, f64)) -> Vec<(f64, f64)> {
    let len = dist(prev, tip).max(1e-9);
    let (ux, uy) = ((tip.0 - prev.0) / len, (tip.1 - prev.1) / len);
    let base = (tip.0 - ux * ARROW_LEN, tip.1 - uy * ARROW_LEN);
    let half = ARROW_LEN / 2.0;
    vec![
        tip,
        (base.0 - uy * half, base.1 + ux * half),
        (base.0 + uy * half, base.1 - ux * half),
    ]
}

fn dist(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}
