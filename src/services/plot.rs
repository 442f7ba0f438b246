// src/services/plot.rs
//! Sentiment trajectory: trailing moving average over posts ordered by time.

use anyhow::Result;
use chrono::NaiveDateTime;
use plotters::prelude::*;

use crate::config::ChartsConfig;
use crate::services::posts::EnrichedPost;
use crate::utils::fonts::{CHART_FAMILY, ensure_chart_fonts};
use crate::utils::png::rgb_to_png_base64;

const LINE_PURPLE: RGBColor = RGBColor(128, 0, 128);

#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedPoint {
    pub timestamp: NaiveDateTime,
    pub sentiment: f64,
    /// `None` until the window has filled.
    pub sentiment_smoothed: Option<f64>,
}

/// Roughly ten smoothing points across the run, never below 1.
pub fn window_size(total_posts: usize) -> usize {
    (total_posts / 10).max(1)
}

pub fn smooth_sentiment(posts: &[EnrichedPost]) -> Vec<SmoothedPoint> {
    let mut ordered: Vec<&EnrichedPost> = posts.iter().collect();
    ordered.sort_by_key(|p| p.timestamp);
    let window = window_size(ordered.len());

    let mut out = Vec::with_capacity(ordered.len());
    let mut running = 0.0;
    for (i, p) in ordered.iter().enumerate() {
        running += p.sentiment;
        if i >= window {
            running -= ordered[i - window].sentiment;
        }
        let smoothed = (i + 1 >= window).then(|| running / window as f64);
        out.push(SmoothedPoint {
            timestamp: p.timestamp,
            sentiment: p.sentiment,
            sentiment_smoothed: smoothed,
        });
    }
    out
}

/// Line chart of smoothed sentiment vs. minutes since the first post,
/// returned as a base64 PNG. Undefined points are left out.
pub fn render_sentiment(points: &[SmoothedPoint], charts: &ChartsConfig) -> Result<String> {
    ensure_chart_fonts()?;
    let start = points.first().map(|p| p.timestamp);
    let series: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|p| {
            let minutes = start
                .map(|s| (p.timestamp - s).num_milliseconds() as f64 / 60_000.0)
                .unwrap_or(0.0);
            p.sentiment_smoothed.map(|v| (minutes, v.clamp(-1.0, 1.0)))
        })
        .collect();
    let x_max = series
        .iter()
        .map(|p| p.0)
        .fold(0.0f64, f64::max)
        .max(1.0);

    let (w, h) = (charts.plot_width, charts.plot_height);
    let mut buf = vec![0u8; w as usize * h as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .caption("Sentiment Trajectory Over Time", (CHART_FAMILY, 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..x_max, -1f64..1f64)?;
        chart
            .configure_mesh()
            .x_desc("Time (minutes since first post)")
            .y_desc("Sentiment Polarity (Smooth)")
            .draw()?;

        chart.draw_series(LineSeries::new(series.iter().copied(), LINE_PURPLE.stroke_width(2)))?;
        chart.draw_series(
            series
                .iter()
                .map(|&p| Circle::new(p, 4, LINE_PURPLE.filled())),
        )?;

        root.present()?;
    }
    tracing::debug!(points = series.len(), "sentiment plot rendered");
    rgb_to_png_base64(buf, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::loader::EventRecord;
    use chrono::NaiveDate;

    fn post(minute: u32, sentiment: f64) -> EnrichedPost {
        EnrichedPost {
            timestamp: NaiveDate::from_ymd_opt(2026, 2, 16)
                .unwrap()
                .and_hms_opt(22, minute, 0)
                .unwrap(),
            bot_name: "Dan".into(),
            content: String::new(),
            model: None,
            word_count: 0,
            sentiment,
            record: EventRecord { line: 1, fields: Default::default() },
        }
    }

    #[test]
    fn trailing_mean_starts_once_window_fills() {
        // 20 posts -> window of 2
        let posts: Vec<_> = (0..20).map(|m| post(m, if m % 2 == 0 { 1.0 } else { 0.0 })).collect();
        let pts = smooth_sentiment(&posts);
        assert_eq!(pts.len(), 20);
        assert_eq!(pts[0].sentiment_smoothed, None);
        assert_eq!(pts[1].sentiment_smoothed, Some(0.5));
        assert!(pts[1..].iter().all(|p| p.sentiment_smoothed == Some(0.5)));
    }

    #[test]
    fn window_of_one_is_identity() {
        let posts = vec![post(0, 0.25), post(1, -0.5)];
        let pts = smooth_sentiment(&posts);
        assert_eq!(pts[0].sentiment_smoothed, Some(0.25));
        assert_eq!(pts[1].sentiment_smoothed, Some(-0.5));
    }

    #[test]
    fn orders_by_timestamp() {
        let posts = vec![post(5, -1.0), post(1, 1.0)];
        let pts = smooth_sentiment(&posts);
        assert_eq!(pts[0].sentiment, 1.0);
        assert_eq!(pts[1].sentiment, -1.0);
    }

    #[test]
    fn window_never_below_one() {
        assert_eq!(window_size(0), 1);
        assert_eq!(window_size(9), 1);
        assert_eq!(window_size(10), 1);
        assert_eq!(window_size(25), 2);
        assert_eq!(window_size(100), 10);
    }

    #[test]
    fn renders_with_titles_and_axes() {
        let charts = ChartsConfig {
            plot_width: 400,
            plot_height: 300,
            ..ChartsConfig::default()
        };
        let posts = vec![post(0, 0.5), post(3, -0.25), post(7, 0.0)];
        let png = render_sentiment(&smooth_sentiment(&posts), &charts).unwrap();
        assert!(png.starts_with("iVBOR"));

        let single = render_sentiment(&smooth_sentiment(&posts[..1]), &charts).unwrap();
        assert_ne!(png, single);
    }
}
