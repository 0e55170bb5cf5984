//! File picker overlay for choosing the video to analyze

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::tui::app::App;

/// Draw the file picker overlay
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    if !app.model.picker_open {
        return;
    }

    let names = app.picker.display_names();

    // Calculate popup size
    let max_file_len = names.iter().map(|f| f.chars().count()).max().unwrap_or(20);
    let popup_width = (max_file_len + 10).clamp(36, 70) as u16;
    let popup_height = (names.len() + 4).clamp(5, 20) as u16;

    let popup_area = Rect {
        x: (area.width.saturating_sub(popup_width)) / 2,
        y: (area.height.saturating_sub(popup_height)) / 2,
        width: popup_width.min(area.width),
        height: popup_height.min(area.height),
    };

    // Clear background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Select Video (Enter=choose, Esc=cancel) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner_area = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if names.is_empty() {
        let empty = Paragraph::new(format!("No videos in {}", app.dir().display()))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner_area);
        return;
    }

    let current = app
        .selection
        .file()
        .map(|f| f.path.as_path());

    let items: Vec<ListItem> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let is_cursor = i == app.model.picker_cursor;
            let is_current = current == app.picker.files.get(i).map(|p| p.as_path());

            let marker = if is_current { "●" } else { " " };

            let style = if is_cursor {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else if is_current {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };

            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Green)),
                Span::raw(" "),
                Span::styled(name.clone(), style),
            ]))
        })
        .collect();

    let list = List::new(items);
    frame.render_widget(list, inner_area);
}
