//! The student dashboard: identity, balance, level progress, groupmates.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
};

use crate::{
    app::{App, views},
    core::{
        level,
        talent::Balances,
    },
};

/// Draws the four dashboard cards.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
    let Some(identity) = &app.identity else {
        return;
    };
    // Session snapshot until the first refresh lands.
    let balances = app.student.balances.unwrap_or(Balances {
        current_talent: identity.current_talent,
        max_talent: identity.max_talent,
    });

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    draw_identity_card(f, top[0], app);
    draw_level_card(f, top[1], balances);
    draw_balance_card(f, bottom[0], balances);
    draw_groupmates_card(f, bottom[1], app);
}

fn draw_identity_card(f: &mut Frame, area: Rect, app: &App) {
    let Some(identity) = &app.identity else {
        return;
    };
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!(" {}", identity.display_name),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" (@{})", identity.username),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    let mut details = Vec::new();
    if let Some(grade) = &identity.grade {
        details.push(format!("Grade {grade}"));
    }
    if let Some(church) = &identity.church {
        details.push(church.clone());
    }
    if !details.is_empty() {
        lines.push(Line::styled(
            format!(" {}", details.join(" | ")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    lines.push(match &identity.group_name {
        Some(group) => Line::raw(format!(" Group: {group}")),
        None => Line::styled(" No group assigned", Style::default().fg(Color::DarkGray)),
    });

    let block = Block::default().title(" Camper ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_level_card(f: &mut Frame, area: Rect, balances: Balances) {
    let info = level::level_for(balances.max_talent);
    let block = Block::default().title(" Level ").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let title = Paragraph::new(Line::from(Span::styled(
        format!(" Level {} - {}", info.level, info.name),
        Style::default()
            .fg(views::band_color(info.band))
            .add_modifier(Modifier::BOLD),
    )));
    f.render_widget(title, rows[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(views::band_color(info.band)))
        .ratio(level::progress_toward_next(balances.max_talent))
        .label(match level::next_threshold(balances.max_talent) {
            Some(next) => format!("{} / {next}", balances.max_talent),
            None => "top level".to_string(),
        });
    f.render_widget(gauge, rows[1]);

    let footer = match level::next_threshold(balances.max_talent) {
        Some(next) => format!(
            " {} more to level {}",
            next - balances.max_talent,
            info.level + 1
        ),
        None => " Highest level reached".to_string(),
    };
    f.render_widget(
        Paragraph::new(Line::styled(footer, Style::default().fg(Color::DarkGray))),
        rows[2],
    );
}

fn draw_balance_card(f: &mut Frame, area: Rect, balances: Balances) {
    let lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            format!(" {} talents", balances.current_talent),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::styled(
            format!(" peak balance {}", balances.max_talent),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    let block = Block::default().title(" Balance ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_groupmates_card(f: &mut Frame, area: Rect, app: &App) {
    let Some(identity) = &app.identity else {
        return;
    };
    let title = match &identity.group_name {
        Some(group) => format!(" Group - {group} "),
        None => " Group ".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    if identity.group_name.is_none() {
        f.render_widget(
            Paragraph::new(Line::styled(
                " No group assigned.",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
            area,
        );
        return;
    }
    if app.student.groupmates.is_empty() {
        f.render_widget(
            Paragraph::new(Line::styled(
                " No groupmates yet. Press r to refresh.",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .student
        .groupmates
        .iter()
        .map(|mate| {
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {:<24}", mate.display_name)),
                Span::styled(
                    format!("{:>6}", mate.current_talent),
                    Style::default().fg(Color::Yellow),
                ),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(block), area);
}
