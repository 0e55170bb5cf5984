//! Plain-terminal and JSON rendering of an analysis
//!
//! Used by the `analyze` and `inspect` commands. Rounding happens here and
//! nowhere else; the model keeps full precision.

use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

use crate::analysis::{AnalysisResult, FrameScore, Summary};
use crate::chart::{series_for, ChartSeries, ChartSource};
use crate::selection::VideoFile;

const BAR_WIDTH: usize = 24;

/// Machine-readable output for `--json`
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<&'a VideoFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Local>>,
    pub chart_source: String,
    pub result: &'a AnalysisResult,
    pub chart: ChartSeries,
}

impl<'a> JsonReport<'a> {
    pub fn new(
        result: &'a AnalysisResult,
        source: ChartSource,
        video: Option<&'a VideoFile>,
        analyzed_at: Option<DateTime<Local>>,
    ) -> Self {
        Self {
            video,
            analyzed_at,
            chart_source: source.resolve(result).to_string(),
            result,
            chart: series_for(result, source),
        }
    }
}

pub fn format_pct(value: f64) -> String {
    format!("{:.2}%", value)
}

pub fn format_score(value: f64) -> String {
    format!("{:.3}", value)
}

/// Filled/empty block bar for a 0-1 score
pub fn score_bar(value: f64, width: usize) -> String {
    let filled = (value.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn write_summary(out: &mut String, summary: &Summary) {
    let _ = writeln!(out, "  Total frames: {}", summary.total_frames);
    let _ = writeln!(
        out,
        "  Real frames:  {} ({})",
        summary.real_count,
        format_pct(summary.real_pct)
    );
    let _ = writeln!(
        out,
        "  Fake frames:  {} ({})",
        summary.fake_count,
        format_pct(summary.fake_pct)
    );
}

fn write_frame(out: &mut String, frame: &FrameScore) {
    let marker = if frame.is_anomaly {
        "✗".red().to_string()
    } else {
        "·".dimmed().to_string()
    };
    let _ = write!(
        out,
        "  {} Frame {:<8} real {}  fake {}",
        marker,
        frame.index,
        format_score(frame.real_score),
        format_score(frame.fake_score)
    );
    if !frame.preview_url.is_empty() {
        let _ = write!(out, "  {}", frame.preview_url.dimmed());
    }
    out.push('\n');
}

fn write_chart(out: &mut String, series: &ChartSeries) {
    if series.is_empty() {
        let _ = writeln!(out, "  {}", "(no frames)".dimmed());
        return;
    }
    let label_width = series.labels.iter().map(|l| l.len()).max().unwrap_or(0);
    for (label, real, fake) in series.points() {
        let _ = writeln!(
            out,
            "  {:<width$} real {} {}",
            label,
            score_bar(real, BAR_WIDTH).green(),
            format_score(real),
            width = label_width
        );
        let _ = writeln!(
            out,
            "  {:<width$} fake {} {}",
            "",
            score_bar(fake, BAR_WIDTH).red(),
            format_score(fake),
            width = label_width
        );
    }
}

/// Human-readable report: summary, anomaly list, chart, warnings
pub fn render_text(result: &AnalysisResult, source: ChartSource, title: &str) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", title.bold());
    write_summary(&mut out, &result.summary);
    if let Some(url) = &result.output_video_url {
        let _ = writeln!(out, "  Output video: {}", url);
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "{} {}",
        "Frames with anomalies (fake > real):".bold(),
        result.anomaly_count()
    );
    if result.frames.is_empty() {
        let _ = writeln!(out, "  {}", "none detected".green());
    }
    for frame in &result.frames {
        write_frame(&mut out, frame);
    }
    out.push('\n');

    let _ = writeln!(out, "{} {}", "Chart:".bold(), source.resolve(result).title());
    write_chart(&mut out, &series_for(result, source));

    if result.has_warnings() {
        out.push('\n');
        let _ = writeln!(out, "{}", "Warnings:".yellow().bold());
        for warning in &result.warnings {
            let _ = writeln!(out, "  {} {}", "!".yellow(), warning);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_json;
    use serde_json::json;

    fn sample() -> AnalysisResult {
        normalize_json(
            &json!({
                "frames_with_anomalies": [
                    {"frame_index": 3, "real_score": 0.2, "fake_score": 0.9, "frame_url": "f3.png"}
                ],
                "final_scores": {"total_frames": 10, "real_count": 9, "fake_count": 1,
                                 "real_percentage": 90, "fake_percentage": 10},
                "frame_indices": [0, 3],
                "real_scores": [0.8, 0.2],
                "fake_scores": [0.2, 0.9]
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_score_bar() {
        assert_eq!(score_bar(0.0, 4), "░░░░");
        assert_eq!(score_bar(1.0, 4), "████");
        assert_eq!(score_bar(0.5, 4), "██░░");
        // Out-of-range scores are clamped for display
        assert_eq!(score_bar(1.7, 4), "████");
        assert_eq!(score_bar(-0.2, 4), "░░░░");
    }

    #[test]
    fn test_render_text_sections() {
        colored::control::set_override(false);
        let text = render_text(&sample(), ChartSource::Anomalies, "Analysis of clip.mp4");
        assert!(text.contains("Analysis of clip.mp4"));
        assert!(text.contains("Total frames: 10"));
        assert!(text.contains("Fake frames:  1 (10.00%)"));
        assert!(text.contains("Frames with anomalies (fake > real): 1"));
        assert!(text.contains("Frame 3 "));
        assert!(text.contains("f3.png"));
        assert!(text.contains("Chart: Anomaly frames"));
        assert!(!text.contains("Warnings:"));
    }

    #[test]
    fn test_render_sampled_chart() {
        colored::control::set_override(false);
        let text = render_text(&sample(), ChartSource::Sampled, "t");
        assert!(text.contains("Chart: All sampled frames"));
        assert!(text.contains("Frame 0"));
    }

    #[test]
    fn test_json_report_carries_chart() {
        let result = sample();
        let report = JsonReport::new(&result, ChartSource::Sampled, None, None);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["chart_source"], "sampled");
        assert_eq!(value["chart"]["labels"][1], "Frame 3");
        assert_eq!(value["result"]["summary"]["fake_count"], 1);
        assert!(value.get("video").is_none());
    }

    #[test]
    fn test_json_report_names_fallback_source() {
        let mut result = sample();
        result.sampled.clear();
        let report = JsonReport::new(&result, ChartSource::Sampled, None, None);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["chart_source"], "anomalies");
        assert_eq!(value["chart"]["labels"], json!(["Frame 3"]));
    }
}
