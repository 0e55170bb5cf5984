//! Results panel: aggregate summary plus the charted frame list

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::analysis::{AnalysisResult, FrameScore};
use crate::report::{format_pct, format_score};
use crate::submission::SubmissionState;
use crate::tui::app::App;

/// Draw the results panel
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Results ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    match &app.submission {
        SubmissionState::Idle => {
            let hint = if app.selection.file().is_some() {
                "Press s to submit the selected video."
            } else {
                "Press o to choose a video."
            };
            let text = Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(text, area);
        }
        SubmissionState::Uploading => {
            let text = Paragraph::new(vec![
                Line::from("Uploading and waiting for inference…"),
                Line::from(""),
                Line::from(Span::styled(
                    "The backend replies once every sampled frame is scored.",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .block(block);
            frame.render_widget(text, area);
        }
        SubmissionState::Failed(info) => {
            let text = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Upload failed",
                    Style::default().fg(Color::Red).bold(),
                )),
                Line::from(""),
                Line::from(info.message.as_str()),
                Line::from(""),
                Line::from(Span::styled(
                    "R retry · r reset",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .wrap(Wrap { trim: true })
            .block(block);
            frame.render_widget(text, area);
        }
        SubmissionState::Succeeded(result) => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            draw_result(frame, app, result, inner);
        }
    }
}

fn draw_result(frame: &mut Frame, app: &App, result: &AnalysisResult, area: Rect) {
    let warning_rows = if result.has_warnings() { 1 } else { 0 };
    let layout = Layout::vertical([
        Constraint::Length(5 + warning_rows),
        Constraint::Min(3),
    ])
    .split(area);

    let summary = &result.summary;
    let mut lines = vec![
        Line::from(format!("Total frames: {}", summary.total_frames)),
        Line::from(vec![
            Span::raw("Real: "),
            Span::styled(
                format!("{} ({})", summary.real_count, format_pct(summary.real_pct)),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::raw("Fake: "),
            Span::styled(
                format!("{} ({})", summary.fake_count, format_pct(summary.fake_pct)),
                Style::default().fg(Color::Red),
            ),
        ]),
        Line::from(Span::styled(
            format!("Frames with anomalies (fake > real): {}", result.anomaly_count()),
            Style::default().bold(),
        )),
    ];
    if let Some(first) = result.warnings.first() {
        let more = result.warnings.len() - 1;
        let text = if more > 0 {
            format!("⚠ {} (+{} more)", first, more)
        } else {
            format!("⚠ {}", first)
        };
        lines.push(Line::from(Span::styled(text, Style::default().fg(Color::Yellow))));
    }
    lines.push(Line::from(Span::styled(
        format!("{} (c to switch)", app.chart_source().title()),
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(Paragraph::new(lines), layout[0]);

    let rows = app.result_rows();
    if rows.is_empty() {
        let none = Paragraph::new("No anomalous frames detected.")
            .style(Style::default().fg(Color::Green));
        frame.render_widget(none, layout[1]);
        return;
    }

    let visible = layout[1].height as usize;
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .skip(app.model.scroll_offset)
        .take(visible)
        .map(|(i, f)| frame_item(f, i == app.model.selected_index))
        .collect();
    frame.render_widget(List::new(items), layout[1]);
}

fn frame_item(frame: &FrameScore, selected: bool) -> ListItem<'static> {
    let flag = if frame.is_anomaly {
        Span::styled("✗ ", Style::default().fg(Color::Red))
    } else {
        Span::styled("· ", Style::default().fg(Color::DarkGray))
    };
    let mut spans = vec![
        flag,
        Span::raw(format!("Frame {:<7}", frame.index)),
        Span::styled(
            format!(" real {}", format_score(frame.real_score)),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!(" fake {}", format_score(frame.fake_score)),
            Style::default().fg(Color::Red),
        ),
    ];
    if !frame.preview_url.is_empty() {
        spans.push(Span::styled(
            format!("  {}", frame.preview_url),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let style = if selected {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };
    ListItem::new(Line::from(spans)).style(style)
}
