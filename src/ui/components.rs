//! Reusable UI component helpers

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{accent, danger, inactive, success, text, text_dim};
use crate::profile::{FormMessage, MessageKind};

/// Single-line text input with a titled border. Masked fields show bullets.
pub fn input_field<'a>(label: &'a str, value: &str, focused: bool, masked: bool) -> Paragraph<'a> {
    let border_color = if focused { accent() } else { inactive() };
    let title_style = if focused {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(text_dim())
    };

    let shown = if masked {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };

    let mut spans = vec![Span::styled(shown, Style::default().fg(text()))];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(accent())));
    }

    Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(Span::styled(format!(" {} ", label), title_style))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    )
}

/// `key` in accent, then its description
pub fn key_hint(key: &'static str, desc: &'static str) -> Vec<Span<'static>> {
    vec![
        Span::styled(key, Style::default().fg(accent())),
        Span::styled(format!(" {}  ", desc), Style::default().fg(text_dim())),
    ]
}

pub fn form_message(message: &FormMessage) -> Line<'_> {
    let color = match message.kind {
        MessageKind::Success => success(),
        MessageKind::Error => danger(),
    };
    Line::from(Span::styled(message.text.as_str(), Style::default().fg(color)))
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Fixed-height box centered in `r`, clamped to fit
pub fn centered_box(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}
