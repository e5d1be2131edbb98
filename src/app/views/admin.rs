//! The admin placeholder screen. Admin accounts can sign in, but no
//! administrative operations exist in this application.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, views};

/// Draws the fixed notice.
pub fn draw(f: &mut Frame, area: Rect, _app: &App) {
    let boxed = views::centered_rect(56, 8, area);
    let block = Block::default()
        .title(" Admin ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let lines = vec![
        Line::raw(""),
        Line::raw(" Admin tools are restricted."),
        Line::raw(""),
        Line::styled(
            " This console manages no accounts or settings.",
            Style::default().fg(Color::DarkGray),
        ),
        Line::styled(
            " Contact the camp office for account changes.",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    f.render_widget(Paragraph::new(lines).block(block), boxed);
}
