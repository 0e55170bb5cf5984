//! Grouped bar chart of real vs fake scores

use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
};

use crate::tui::app::App;
use crate::tui::state;

const BAR_WIDTH: u16 = 3;
const BAR_GAP: u16 = 0;
const GROUP_GAP: u16 = 2;

/// Draw the chart panel
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let series = app.chart_series();
    let title = format!(
        " Real vs Fake Confidence · {} ({}) ",
        app.chart_source().title(),
        series.len()
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    if series.is_empty() {
        let text = if app.submission.result().is_some() {
            "Nothing to chart: no frames were scored."
        } else {
            "Scores appear here after a successful analysis."
        };
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let inner = block.inner(area);
    let capacity = state::chart_capacity(inner.width, BAR_WIDTH, GROUP_GAP);
    let window = state::chart_window(series.len(), app.model.selected_index, capacity);

    let mut chart = BarChart::default()
        .block(block)
        .bar_width(BAR_WIDTH)
        .bar_gap(BAR_GAP)
        .group_gap(GROUP_GAP)
        .max(100);

    for (label, real, fake) in series.points().skip(window.start).take(window.len()) {
        // Drop the "Frame " prefix; the panel title says what the groups are
        let short = label.trim_start_matches("Frame ").to_string();
        let bars = [
            Bar::default()
                .value(state::bar_value(real))
                .text_value(format!("{:.0}", real * 100.0))
                .style(Style::default().fg(Color::Green)),
            Bar::default()
                .value(state::bar_value(fake))
                .text_value(format!("{:.0}", fake * 100.0))
                .style(Style::default().fg(Color::Red)),
        ];
        chart = chart.data(BarGroup::default().label(Line::from(short)).bars(&bars));
    }

    frame.render_widget(chart, area);
}
