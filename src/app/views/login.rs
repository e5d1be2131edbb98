//! The username/password form.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, LoginFocus, views};

/// Draws the centered login box.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
    let boxed = views::centered_rect(50, 10, area);
    let block = Block::default()
        .title(" Sign in ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut lines = vec![Line::raw("")];
    lines.push(views::field_line(
        "Username",
        app.login.username.value().to_string(),
        app.login.focus == LoginFocus::Username,
    ));
    lines.push(views::field_line(
        "Password",
        app.login.password.masked_value(),
        app.login.focus == LoginFocus::Password,
    ));
    lines.push(Line::raw(""));
    if app.login.message.is_empty() {
        lines.push(Line::raw(""));
    } else {
        lines.push(Line::styled(
            format!(" {}", app.login.message),
            Style::default().fg(Color::Red),
        ));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        " Sign in with the account from your camp booklet.",
        Style::default().fg(Color::DarkGray),
    ));

    f.render_widget(Paragraph::new(lines).block(block), boxed);
}
