//! Comparative bandwidth chart.
//!
//! Split in two halves: [`ChartModel::build`] turns two sample series into
//! a complete render description (traces, reference lines, axis bounds,
//! tick labels, legend names) without touching the terminal, and
//! [`render`] draws that model once in the alternate screen and waits for
//! a key press.
//!
//! ratatui's axes are linear, so the model carries y-values in log10 space
//! and labels the ticks with the real Gbit/s values. The ticks are
//! log-spaced, which makes them evenly spaced on the log10 axis.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition},
    Frame, Terminal,
};

use crate::stats::{log_axis_range, log_ticks, SeriesStats};
use crate::telemetry::IntervalSample;

/// Number of labeled ticks on the logarithmic y-axis.
pub const TICK_COUNT: usize = 7;

/// A horizontal reference line marking one series extreme.
#[derive(Debug, Clone)]
pub struct RefLine {
    /// Legend entry, e.g. "MACsec max 4.61 Gbit/s".
    pub name: String,
    /// Points in (index, log10 Gbit/s) space.
    pub points: Vec<(f64, f64)>,
}

/// One plotted series with its reference lines.
#[derive(Debug, Clone)]
pub struct SeriesTrace {
    /// Legend entry carrying the series mean.
    pub name: String,
    pub color: Color,
    /// Line trace points in (index, log10 Gbit/s) space.
    pub points: Vec<(f64, f64)>,
    /// Dotted line at the series maximum.
    pub max_line: RefLine,
    /// Dashed line at the series minimum.
    pub min_line: RefLine,
}

/// Everything needed to draw the comparison chart.
#[derive(Debug, Clone)]
pub struct ChartModel {
    pub traces: [SeriesTrace; 2],
    /// y-axis bounds in log10 space.
    pub y_bounds: [f64; 2],
    pub y_tick_labels: Vec<String>,
    pub x_bounds: [f64; 2],
    pub x_tick_labels: Vec<String>,
}

impl ChartModel {
    /// Build the render description for two series.
    ///
    /// Returns `None` if either series is empty; stats and a log axis are
    /// undefined without data, and callers report the no-data condition
    /// instead of rendering.
    pub fn build(
        label_a: &str,
        samples_a: &[IntervalSample],
        label_b: &str,
        samples_b: &[IntervalSample],
    ) -> Option<Self> {
        let values_a: Vec<f64> = samples_a.iter().map(|s| s.gbps).collect();
        let values_b: Vec<f64> = samples_b.iter().map(|s| s.gbps).collect();
        let stats_a = SeriesStats::compute(&values_a)?;
        let stats_b = SeriesStats::compute(&values_b)?;

        let (lower, upper) = log_axis_range(&stats_a, &stats_b);
        let ticks = log_ticks(lower, upper, TICK_COUNT);
        let y_tick_labels = ticks.iter().map(|t| format!("{t:.2} Gbit/s")).collect();

        let last_index = samples_a
            .len()
            .max(samples_b.len())
            .max(1);

        let traces = [
            build_trace(label_a, Color::Red, samples_a, &stats_a, lower, last_index),
            build_trace(label_b, Color::Blue, samples_b, &stats_b, lower, last_index),
        ];

        Some(Self {
            traces,
            y_bounds: [lower.log10(), upper.log10()],
            y_tick_labels,
            x_bounds: [0.0, (last_index + 1) as f64],
            x_tick_labels: vec![
                "0".to_string(),
                format!("{}", last_index.div_ceil(2)),
                format!("{last_index}"),
            ],
        })
    }
}

fn build_trace(
    label: &str,
    color: Color,
    samples: &[IntervalSample],
    stats: &SeriesStats,
    lower: f64,
    last_index: usize,
) -> SeriesTrace {
    let points = samples
        .iter()
        .map(|s| (s.index as f64, s.gbps.max(lower).log10()))
        .collect();

    let max_y = stats.max.max(lower).log10();
    let min_y = stats.min.max(lower).log10();

    SeriesTrace {
        name: format!("{label} avg {:.2} Gbit/s", stats.mean),
        color,
        points,
        max_line: RefLine {
            name: format!("{label} max {:.2} Gbit/s", stats.max),
            points: (1..=last_index).map(|x| (x as f64, max_y)).collect(),
        },
        min_line: RefLine {
            name: format!("{label} min {:.2} Gbit/s", stats.min),
            // Every other index: renders as a dashed line.
            points: (1..=last_index)
                .step_by(2)
                .map(|x| (x as f64, min_y))
                .collect(),
        },
    }
}

/// Draw the chart once and block until any key is pressed.
///
/// This is the only terminal-touching operation in the crate. The panic
/// hook restores the terminal state so a draw failure never leaves the
/// shell in raw mode.
pub fn render(model: &ChartModel) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = (|| -> Result<()> {
        terminal.draw(|frame| draw_chart(frame, model))?;
        wait_for_key()
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn draw_chart(frame: &mut Frame, model: &ChartModel) {
    let mut datasets = Vec::with_capacity(6);
    for trace in &model.traces {
        datasets.push(
            Dataset::default()
                .name(trace.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(trace.color))
                .data(&trace.points),
        );
        datasets.push(
            Dataset::default()
                .name(trace.max_line.name.clone())
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(trace.color))
                .data(&trace.max_line.points),
        );
        datasets.push(
            Dataset::default()
                .name(trace.min_line.name.clone())
                .marker(symbols::Marker::HalfBlock)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(trace.color))
                .data(&trace.min_line.points),
        );
    }

    let block = Block::default()
        .title(" Link Bandwidth Over Time (log scale) | press any key to exit ")
        .borders(Borders::ALL);

    let chart = Chart::new(datasets)
        .block(block)
        .legend_position(Some(LegendPosition::Right))
        .hidden_legend_constraints((
            ratatui::layout::Constraint::Ratio(1, 2),
            ratatui::layout::Constraint::Ratio(1, 2),
        ))
        .x_axis(
            Axis::default()
                .title("Time (seconds)")
                .style(Style::default().fg(Color::Gray))
                .bounds(model.x_bounds)
                .labels(model.x_tick_labels.clone()),
        )
        .y_axis(
            Axis::default()
                .title("Bandwidth")
                .style(Style::default().fg(Color::Gray))
                .bounds(model.y_bounds)
                .labels(model.y_tick_labels.clone()),
        );

    frame.render_widget(chart, frame.area());
}

fn wait_for_key() -> Result<()> {
    loop {
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(_) = event::read()? {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[f64]) -> Vec<IntervalSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &gbps)| IntervalSample { index: i + 1, gbps })
            .collect()
    }

    #[test]
    fn test_build_requires_both_series_non_empty() {
        let full = samples(&[1.0, 2.0]);
        assert!(ChartModel::build("a", &full, "b", &[]).is_none());
        assert!(ChartModel::build("a", &[], "b", &full).is_none());
        assert!(ChartModel::build("a", &full, "b", &full).is_some());
    }

    #[test]
    fn test_axis_bounds_and_ticks() {
        let a = samples(&[2.0, 4.0]);
        let b = samples(&[1.0, 8.0]);
        let model = ChartModel::build("MACsec", &a, "Plain", &b).unwrap();

        // Bounds are log10 of (0.8 * 1.0, 1.2 * 8.0).
        assert!((10f64.powf(model.y_bounds[0]) - 0.8).abs() < 1e-9);
        assert!((10f64.powf(model.y_bounds[1]) - 9.6).abs() < 1e-9);
        assert_eq!(model.y_tick_labels.len(), TICK_COUNT);
        assert_eq!(model.y_tick_labels.first().unwrap(), "0.80 Gbit/s");
        assert_eq!(model.y_tick_labels.last().unwrap(), "9.60 Gbit/s");
    }

    #[test]
    fn test_legend_names_carry_stats() {
        let a = samples(&[2.0, 4.0]);
        let b = samples(&[1.0, 3.0]);
        let model = ChartModel::build("MACsec", &a, "Plain", &b).unwrap();

        assert_eq!(model.traces[0].name, "MACsec avg 3.00 Gbit/s");
        assert_eq!(model.traces[0].max_line.name, "MACsec max 4.00 Gbit/s");
        assert_eq!(model.traces[0].min_line.name, "MACsec min 2.00 Gbit/s");
        assert_eq!(model.traces[1].name, "Plain avg 2.00 Gbit/s");
    }

    #[test]
    fn test_reference_line_shapes() {
        let a = samples(&[2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let b = samples(&[1.0, 2.0]);
        let model = ChartModel::build("a", &a, "b", &b).unwrap();

        // Reference lines span the longer series.
        let max_line = &model.traces[0].max_line;
        assert_eq!(max_line.points.len(), 6);
        assert_eq!(max_line.points[0].0, 1.0);
        assert_eq!(max_line.points[5].0, 6.0);

        // Dashed minimum: every other index.
        let min_line = &model.traces[0].min_line;
        let xs: Vec<f64> = min_line.points.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_zero_values_clamped_onto_log_axis() {
        let a = samples(&[0.0, 4.0]);
        let b = samples(&[3.0, 5.0]);
        let model = ChartModel::build("a", &a, "b", &b).unwrap();

        // Every plotted y must be finite and within bounds.
        for trace in &model.traces {
            for &(_, y) in trace
                .points
                .iter()
                .chain(&trace.max_line.points)
                .chain(&trace.min_line.points)
            {
                assert!(y.is_finite());
                assert!(y >= model.y_bounds[0] - 1e-9);
                assert!(y <= model.y_bounds[1] + 1e-9);
            }
        }
    }
}
