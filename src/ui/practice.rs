use crate::app::App;
use crate::prompt::chunk;
use crate::ui::utils::{hex_to_rgb, render_footer, render_header};
use crate::utils::strings;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Builds the display lines of the prompt: for each row the kanji text, the
/// kana reading (hidden in conversion mode), and the typed input for that
/// slice of the target.
pub fn prompt_lines<'a>(app: &'a App) -> Vec<Line<'a>> {
    let color_text = hex_to_rgb(&app.theme.text);
    let color_kana = hex_to_rgb(&app.theme.sub);
    let color_error = hex_to_rgb(&app.theme.error);
    let color_cursor = hex_to_rgb(&app.theme.caret);

    let target_chunks = chunk(app.target(), app.line_length());
    let input_chunks = chunk(&app.input, app.line_length());
    let cursor_row = app.input.chars().count() / app.line_length();

    let mut lines = Vec::with_capacity(app.rows.len() * 3);
    for (i, row) in app.rows.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            row.text.as_str(),
            Style::default().fg(color_text).add_modifier(Modifier::BOLD),
        )));

        if !app.conversion_enabled {
            lines.push(Line::from(Span::styled(
                row.kana.as_str(),
                Style::default().fg(color_kana),
            )));
        }

        let typed = input_chunks.get(i).map(String::as_str).unwrap_or("");
        let expected: Vec<char> = target_chunks
            .get(i)
            .map(|s| s.chars().collect())
            .unwrap_or_default();

        let mut spans: Vec<Span> = typed
            .chars()
            .enumerate()
            .map(|(j, c)| {
                let ok = expected
                    .get(j)
                    .is_some_and(|e| strings::are_characters_visually_equal(c, *e));
                let color = if ok { color_text } else { color_error };
                Span::styled(c.to_string(), Style::default().fg(color))
            })
            .collect();

        if app.is_running() && i == cursor_row {
            spans.push(Span::styled(" ", Style::default().bg(color_cursor)));
        }
        lines.push(Line::from(spans));
    }

    // input running past the last row keeps a visible caret line
    if app.is_running() && cursor_row >= app.rows.len() {
        let overflow: String = input_chunks.iter().skip(app.rows.len()).cloned().collect();
        lines.push(Line::from(vec![
            Span::styled(overflow, Style::default().fg(color_error)),
            Span::styled(" ", Style::default().bg(color_cursor)),
        ]));
    }
    lines
}

pub fn draw(f: &mut Frame, app: &App) {
    render_header(f, app);

    let lines = prompt_lines(app);
    let prompt_height = lines.len().min(u16::MAX as usize) as u16;

    let vertical_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(prompt_height.saturating_add(2)),
            Constraint::Fill(1),
        ])
        .split(f.area());

    let horizontal_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Percentage(80),
            Constraint::Fill(1),
        ])
        .split(vertical_layout[1]);

    let active_area = horizontal_layout[1];
    let inner_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(active_area);

    let timer_color = if app.is_running() {
        hex_to_rgb(&app.theme.main)
    } else {
        hex_to_rgb(&app.theme.sub)
    };
    f.render_widget(
        Paragraph::new(app.time_label.as_str())
            .alignment(Alignment::Left)
            .style(Style::default().fg(timer_color).add_modifier(Modifier::BOLD)),
        inner_chunks[0],
    );

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Left),
        inner_chunks[2],
    );

    render_footer(f, app);
}
