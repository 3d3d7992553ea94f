//! Static Chart Renderer
//! Writes the ranking charts as SVG files.
//!
//! Charts:
//! 1. Feature importances (normalized, horizontal bars)
//! 2. Correlation with the target, highest to lowest
//! 3. Top correlations as a two-column table
//! 4. Positive correlations ("what to improve")

use crate::analysis::AnalysisReport;
use crate::config::TopN;
use crate::stats::Ranking;
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const BAR_BLUE: RGBColor = RGBColor(91, 155, 213);
const BAR_RED: RGBColor = RGBColor(237, 125, 49);
const BAR_GREEN: RGBColor = RGBColor(112, 173, 71);
const GRID_GRAY: RGBColor = RGBColor(200, 200, 200);

/// Bar colour choice for a score.
#[derive(Debug, Clone, Copy)]
pub enum BarColors {
    /// One colour for every bar.
    Solid(RGBColor),
    /// Blue above zero, red below.
    Diverging,
}

impl BarColors {
    fn color(&self, score: f64) -> RGBColor {
        match self {
            BarColors::Solid(c) => *c,
            BarColors::Diverging if score < 0.0 => BAR_RED,
            BarColors::Diverging => BAR_BLUE,
        }
    }
}

/// Output file names, relative to the chart directory.
pub const IMPORTANCE_CHART: &str = "feature_importance.svg";
pub const CORRELATION_CHART: &str = "correlation_ranking.svg";
pub const CORRELATION_TABLE: &str = "correlation_table.svg";
pub const IMPROVE_CHART: &str = "what_to_improve.svg";

pub struct StaticChartRenderer {
    out_dir: PathBuf,
}

impl StaticChartRenderer {
    /// Create the output directory if needed.
    pub fn new(out_dir: impl AsRef<Path>) -> Result<Self> {
        let out_dir = out_dir.as_ref().to_path_buf();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create chart directory {}", out_dir.display()))?;
        Ok(Self { out_dir })
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(file_name)
    }

    /// Horizontal bars, first entry at the top.
    pub fn draw_bar_chart(
        &self,
        file_name: &str,
        ranking: &Ranking,
        title: &str,
        x_desc: &str,
        palette: BarColors,
    ) -> Result<PathBuf> {
        let path = self.path(file_name);
        let entries = ranking.entries();
        let n = entries.len().max(1) as i32;
        let height = (120 + 28 * n as u32).max(300);

        let (x_min, x_max) = Self::score_range(ranking);
        let labels: Vec<String> = entries.iter().map(|e| e.feature.clone()).collect();
        let label_width = labels
            .iter()
            .map(|l| l.chars().count() as i32 * 8 + 20)
            .max()
            .unwrap_or(100);

        {
            let root = SVGBackend::new(&path, (1200, height)).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 22).into_font())
                .margin(15)
                .x_label_area_size(45)
                .y_label_area_size(label_width)
                .build_cartesian_2d(x_min..x_max, (0..n).into_segmented())?;

            // Index 0 sits at the bottom, so the first entry goes to n - 1.
            let label_for = |v: &SegmentValue<i32>| match v {
                SegmentValue::CenterOf(i) => usize::try_from(n - 1 - *i)
                    .ok()
                    .and_then(|idx| labels.get(idx))
                    .cloned()
                    .unwrap_or_default(),
                _ => String::new(),
            };

            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_labels(n as usize)
                .y_label_formatter(&label_for)
                .x_desc(x_desc)
                .axis_desc_style(("sans-serif", 15).into_font())
                .draw()?;

            chart.draw_series(entries.iter().enumerate().map(|(rank, entry)| {
                let row = n - 1 - rank as i32;
                let (lo, hi) = if entry.score >= 0.0 {
                    (0.0, entry.score)
                } else {
                    (entry.score, 0.0)
                };
                Rectangle::new(
                    [
                        (lo, SegmentValue::Exact(row)),
                        (hi, SegmentValue::Exact(row + 1)),
                    ],
                    palette.color(entry.score).filled(),
                )
            }))?;

            if x_min < 0.0 {
                chart.draw_series(std::iter::once(PathElement::new(
                    vec![
                        (0.0, SegmentValue::Exact(0)),
                        (0.0, SegmentValue::Exact(n)),
                    ],
                    BLACK.stroke_width(1),
                )))?;
            }

            root.present()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        info!("Chart saved to {}", path.display());
        Ok(path)
    }

    /// Two-column table of features and scores to 3 decimals.
    pub fn draw_table(&self, file_name: &str, ranking: &Ranking, title: &str) -> Result<PathBuf> {
        let path = self.path(file_name);
        let row_h = 32u32;
        let rows = ranking.len() as u32 + 1;
        let (width, top) = (700u32, 60u32);
        let height = top + rows * row_h + 20;

        {
            let root = SVGBackend::new(&path, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;

            let title_style = ("sans-serif", 20).into_font().color(&BLACK);
            root.draw(&Text::new(title.to_string(), (20, 20), title_style))?;

            let (left, right) = (20i32, width as i32 - 20);
            let split = left + (right - left) * 3 / 4;
            let cell_style = ("sans-serif", 15).into_font().color(&BLACK);
            let header_style = ("sans-serif", 15).into_font().style(FontStyle::Bold).color(&BLACK);

            let mut cells = vec![("Feature".to_string(), "Correlation".to_string(), true)];
            cells.extend(
                ranking
                    .entries()
                    .iter()
                    .map(|e| (e.feature.clone(), format!("{:.3}", e.score), false)),
            );

            for (i, (feature, score, is_header)) in cells.into_iter().enumerate() {
                let y0 = (top + i as u32 * row_h) as i32;
                let y1 = y0 + row_h as i32;
                let fill = if is_header { GRID_GRAY.mix(0.5) } else { WHITE.mix(1.0) };
                root.draw(&Rectangle::new([(left, y0), (right, y1)], fill.filled()))?;
                root.draw(&Rectangle::new([(left, y0), (right, y1)], BLACK.stroke_width(1)))?;
                root.draw(&PathElement::new(vec![(split, y0), (split, y1)], BLACK.stroke_width(1)))?;

                let style = if is_header { &header_style } else { &cell_style };
                root.draw(&Text::new(feature, (left + 8, y0 + 9), style.clone()))?;
                root.draw(&Text::new(score, (split + 8, y0 + 9), style.clone()))?;
            }

            root.present()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        info!("Table saved to {}", path.display());
        Ok(path)
    }

    /// Draw the four report charts. A chart that fails is logged and skipped.
    pub fn render_report(&self, report: &AnalysisReport, top_n: &TopN) -> Vec<PathBuf> {
        let ranked = &report.skill_correlation;
        let results = [
            self.draw_bar_chart(
                IMPORTANCE_CHART,
                &report.importance.normalized().top(top_n.importance_chart),
                "Random Forest Feature Importances (Excluding 'Skill (Previous Match)')",
                "Normalized Importance",
                BarColors::Solid(BAR_BLUE),
            ),
            self.draw_bar_chart(
                CORRELATION_CHART,
                ranked,
                "Features Ranked by Correlation with Next Skill Rating",
                "Correlation (Descending)",
                BarColors::Diverging,
            ),
            self.draw_table(
                CORRELATION_TABLE,
                &ranked.top(top_n.correlation_table),
                &format!(
                    "Top {} Correlations with Next Skill (Table View)",
                    top_n.correlation_table
                ),
            ),
            self.draw_bar_chart(
                IMPROVE_CHART,
                &ranked.positive().top(top_n.improve_chart),
                "Focus on These Features to Potentially Improve Next Skill",
                "Correlation with Next Skill (Positive)",
                BarColors::Solid(BAR_GREEN),
            ),
        ];

        results
            .into_iter()
            .filter_map(|r| r.map_err(|e| warn!("Chart skipped: {:#}", e)).ok())
            .collect()
    }

    /// X range covering every score and zero, with a little padding.
    fn score_range(ranking: &Ranking) -> (f64, f64) {
        let (lo, hi) = ranking
            .entries()
            .iter()
            .fold((0.0f64, 0.0f64), |(lo, hi), e| (lo.min(e.score), hi.max(e.score)));
        let pad = ((hi - lo) * 0.05).max(0.01);
        (if lo < 0.0 { lo - pad } else { 0.0 }, hi + pad)
    }
}
