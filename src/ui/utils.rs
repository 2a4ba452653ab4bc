use ratatui::style::Color;
use ratatui::{
    layout::{Alignment, Rect, Constraint, Direction, Layout},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use crate::app::App;
use crate::history::SessionSummary;

pub fn hex_to_rgb(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    if hex.len() == 6 && hex.is_ascii() {
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);
        Color::Rgb(r, g, b)
    } else {
        Color::White
    }
}

pub fn summary_line(summary: &SessionSummary) -> String {
    let status = if summary.completed { "finished" } else { "stopped" };
    let acc = summary
        .accuracy()
        .map(|a| format!("{:.0}%", a))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "last: {} {:.0}s | chars: {} | acc: {}",
        status, summary.elapsed_secs, summary.typed_chars, acc
    )
}

pub fn render_header(f: &mut Frame, app: &App) {
    let mut header_spans = Vec::new();
    // 'main' while idle, 'sub' while typing so the brand fades out
    let brand_color = if app.is_running() {
        hex_to_rgb(&app.theme.sub)
    } else {
        hex_to_rgb(&app.theme.main)
    };

    header_spans.push(Span::styled(
        "atw",
        Style::default()
            .fg(brand_color)
            .add_modifier(ratatui::style::Modifier::BOLD),
    ));

    let mode = if app.conversion_enabled { "変換あり" } else { "変換なし" };
    header_spans.push(Span::styled(
        format!(
            " | {} | {} | {}文字",
            app.preset.label(),
            mode,
            app.line_length()
        ),
        Style::default().fg(hex_to_rgb(&app.theme.sub)),
    ));

    let header_row_area = Rect::new(0, 1, f.area().width, 1);

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Percentage(82),
            Constraint::Fill(1),
        ])
        .split(header_row_area);

    f.render_widget(Paragraph::new(Line::from(header_spans)), header_layout[1]);
}

pub fn render_footer(f: &mut Frame, app: &App) {
    let hints = if app.is_running() {
        "esc: stop".to_string()
    } else {
        "s: start | tab: duration | c: conversion | +/-: line length | esc: quit".to_string()
    };
    let text = match &app.last_summary {
        Some(summary) if !app.is_running() => format!("{}  ·  {}", summary_line(summary), hints),
        _ => hints,
    };

    let area = f.area();
    if area.height == 0 {
        return;
    }
    let footer = Paragraph::new(text)
        .style(Style::default().fg(hex_to_rgb(&app.theme.sub_alt)))
        .alignment(Alignment::Center);
    f.render_widget(footer, Rect::new(0, area.height - 1, area.width, 1));
}
