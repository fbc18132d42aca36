//! UI rendering

use super::app::{App, Focus};
use physician_complete::Widget;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

const NAME_WIDTH: usize = 24;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Name input
            Constraint::Min(0),    // Dropdown overlay space
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Toast line
        ])
        .split(frame.area());

    render_status_line(frame, app, chunks[2]);
    render_toast_line(frame, app, chunks[3]);

    let Some(widget) = app.widget() else {
        app.dropdown_area = None;
        return;
    };
    render_input(frame, widget, app.focus, chunks[0]);
    let dropdown = render_dropdown(frame, widget, chunks[0], chunks[1]);
    app.dropdown_area = dropdown;
}

fn render_input(frame: &mut Frame, widget: &Widget, focus: Focus, area: Rect) {
    let border_style = match focus {
        Focus::Input => Style::default().fg(Color::Yellow),
        Focus::Away => Style::default().fg(Color::DarkGray),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Physician ");

    let input = widget.input();
    let (before, after) = input.text().split_at(input.cursor());
    let mut chars = after.chars();
    let cursor_char = chars.next();
    let after_cursor = chars.as_str();

    let text_style = Style::default().fg(Color::White);
    let mut spans = vec![Span::styled(before, text_style)];
    if focus == Focus::Input {
        let cursor_style = Style::default().fg(Color::Black).bg(Color::White);
        match cursor_char {
            Some(c) => spans.push(Span::styled(c.to_string(), cursor_style)),
            None => spans.push(Span::styled("█", Style::default().fg(Color::White))),
        }
    } else if let Some(c) = cursor_char {
        spans.push(Span::styled(c.to_string(), text_style));
    }
    spans.push(Span::styled(after_cursor, text_style));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Draw the suggestion list just under the input. Returns where it went.
fn render_dropdown(frame: &mut Frame, widget: &Widget, input: Rect, space: Rect) -> Option<Rect> {
    let store = widget.store();
    if !store.is_open() || space.height < 3 {
        return None;
    }

    let height = (store.len() as u16 + 2).min(space.height);
    let area = Rect {
        x: input.x,
        y: input.bottom(),
        width: input.width,
        height,
    };

    let items: Vec<ListItem> = store
        .results()
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let line = Line::from(vec![
                Span::styled(
                    format!("{:<NAME_WIDTH$}", result.display_name()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<12}", result.npi),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(result.address_line(), Style::default().fg(Color::DarkGray)),
            ]);
            let item = ListItem::new(line);
            if store.active_index() == Some(i) {
                item.style(Style::default().bg(Color::Blue))
            } else {
                item
            }
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(Clear, area);
    frame.render_widget(List::new(items).block(block), area);
    Some(area)
}

fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![Span::styled(" Selected: ", dim)];
    match &app.last_selected {
        Some(result) => {
            spans.push(Span::styled(
                result.display_name(),
                Style::default().fg(Color::Green),
            ));
            spans.push(Span::styled(format!(" ({})", result.npi), dim));
        }
        None => spans.push(Span::styled("none", dim)),
    }

    if let Some(widget) = app.widget() {
        if widget.is_search_pending() || widget.requests_in_flight() > 0 {
            spans.push(Span::styled(" │ ", dim));
            spans.push(Span::styled("searching…", Style::default().fg(Color::Yellow)));
        }
    }

    spans.push(Span::styled(" │ Esc to quit", dim));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_toast_line(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(ref toast) = app.toast {
        let bracket = Style::default().fg(Color::DarkGray);
        let toast_style = if toast.is_error {
            Style::default().fg(Color::Red).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(Color::Blue).add_modifier(Modifier::DIM)
        };

        let spans = vec![
            Span::styled("  [", bracket),
            Span::styled(&toast.message, toast_style),
            Span::styled("]", bracket),
        ];
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
