use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::BookRecord;
use crate::stats::GrowthPoint;

/// Coloured Read/Unread pill shown on every book card.
pub(crate) fn read_badge(record: &BookRecord) -> Span<'static> {
    let (text, color) = if record.read {
        (" Read ", Color::Green)
    } else {
        (" Unread ", Color::LightRed)
    };
    Span::styled(
        text,
        Style::default()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD),
    )
}

/// Title, byline and genre rows for a book card.
pub(crate) fn book_card_lines(record: &BookRecord, selected: bool) -> Vec<Line<'static>> {
    let marker = if selected { "▶ " } else { "" };
    vec![
        Line::from(vec![
            Span::styled(
                format!("{marker}{}", record.title),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            read_badge(record),
        ]),
        Line::from(Span::styled(
            format!("by {} ({})", record.author, record.year),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            format!("Genre: {}", record.genre),
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

/// First visible row so that `selected` stays on screen when only `capacity`
/// rows fit.
pub(crate) fn scroll_start(selected: usize, capacity: usize, len: usize) -> usize {
    let capacity = capacity.max(1);
    let start = if selected >= capacity {
        selected + 1 - capacity
    } else {
        0
    };
    start.min(len.saturating_sub(capacity))
}

/// Convert the growth series into chart coordinates: x is seconds since the
/// first point, y the running count. Returns the points and the x bound.
pub(crate) fn growth_chart_points(series: &[GrowthPoint]) -> (Vec<(f64, f64)>, f64) {
    let Some(first) = series.first() else {
        return (Vec::new(), 1.0);
    };
    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|point| {
            let offset = (point.added_at - first.added_at).num_seconds() as f64;
            (offset, point.cumulative as f64)
        })
        .collect();
    let max_x = points.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);
    (points, max_x)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
