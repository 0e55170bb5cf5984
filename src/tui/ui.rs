//! UI rendering for the TUI

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::app::App;
use super::state;
use super::views::{chart, results};
use super::widgets::file_picker;
use crate::submission::SubmissionState;

/// Main draw function - orchestrates all rendering
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: header, selection bar, content, footer
    let main_layout = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Length(1), // Selection
        Constraint::Min(10),   // Content
        Constraint::Length(1), // Footer/status
    ])
    .split(area);

    draw_header(frame, app, main_layout[0]);
    draw_selection_bar(frame, app, main_layout[1]);

    let content_layout =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(main_layout[2]);
    results::draw(frame, app, content_layout[0]);
    chart::draw(frame, app, content_layout[1]);

    draw_footer(frame, app, main_layout[3]);

    // Draw overlays
    if app.model.help_open {
        draw_help_overlay(frame, area);
    }

    if app.model.picker_open {
        file_picker::draw(frame, app, area);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let phase = state::phase_label(&app.submission);
    let controller = app.controller();
    let timing = match state::elapsed_label(controller.started_at(), controller.settled_at()) {
        Some(took) => format!(" (took {})", took),
        None => String::new(),
    };

    let header_text = format!(
        " fakescope │ {} │ {}{}",
        app.endpoint(),
        phase,
        timing
    );

    let bg = match app.submission {
        SubmissionState::Failed(_) => Color::Red,
        SubmissionState::Uploading => Color::Yellow,
        _ => Color::Blue,
    };
    let header = Paragraph::new(header_text).style(Style::default().bg(bg).fg(Color::White).bold());

    frame.render_widget(header, area);
}

fn draw_selection_bar(frame: &mut Frame, app: &App, area: Rect) {
    let spans = match app.selection.selected() {
        Some(selected) => {
            let file = &selected.file;
            let size = file
                .size
                .map(state::format_size)
                .unwrap_or_else(|| "size unknown".to_string());
            vec![
                Span::raw(" Video: "),
                Span::styled(file.file_name.clone(), Style::default().fg(Color::Yellow).bold()),
                Span::styled(
                    format!("  {} · {}", file.mime_type, size),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw("  │ Preview: "),
                Span::styled(
                    selected.preview_uri.to_string(),
                    Style::default().fg(Color::Cyan),
                ),
            ]
        }
        None => vec![Span::styled(
            " No video selected (o to choose)",
            Style::default().fg(Color::DarkGray),
        )],
    };

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let keybinds = match app.submission {
        SubmissionState::Idle => "o:open  x:clear  s:submit  c:chart  ?:help  q:quit",
        SubmissionState::Uploading => "j/k:move  c:chart  ?:help  q:quit",
        SubmissionState::Succeeded(_) => "j/k:move  c:chart  r:reset  o:open  ?:help  q:quit",
        SubmissionState::Failed(_) => "R:retry  r:reset  o:open  ?:help  q:quit",
    };

    // Show status message if present, otherwise show keybinds
    let footer_text = if let Some((ref msg, _)) = app.status_message {
        msg.clone()
    } else {
        keybinds.to_string()
    };

    let footer = Paragraph::new(format!(" {}", footer_text))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(footer, area);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    // Center the help popup
    let popup_width = 56.min(area.width.saturating_sub(4));
    let popup_height = 24.min(area.height.saturating_sub(4));

    let popup_area = Rect {
        x: (area.width.saturating_sub(popup_width)) / 2,
        y: (area.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let help_text = r#"
  Selection
  ─────────────────────────────────
  o            Choose a video
  x            Clear the selection

  Analysis
  ─────────────────────────────────
  s, Enter     Submit for analysis
  r            Reset to idle
  R            Retry after a failure

  Results
  ─────────────────────────────────
  j/k, ↑/↓     Move up/down
  g/G          Jump to top/bottom
  c, Tab       Anomalies / all sampled
  q            Quit

  Press ? or Esc to close
"#;

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(help, popup_area);
}
