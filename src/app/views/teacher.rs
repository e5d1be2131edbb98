//! The teacher console: search-and-grant, group split, and history tabs.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
};

use crate::{
    app::{App, GroupFocus, HistoryEntry, SearchFocus, TeacherTab, views},
    core::level,
    entities::user,
};

/// Draws the tab bar and the active tab.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let tabs = Tabs::new(vec![" Search [F1] ", " Group [F2] ", " History [F3] "])
        .select(app.teacher.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, rows[0]);

    match app.teacher.tab {
        TeacherTab::Search => draw_search_tab(f, rows[1], app),
        TeacherTab::Group => draw_group_tab(f, rows[1], app),
        TeacherTab::History => draw_history_tab(f, rows[1], app),
    }
}

fn draw_search_tab(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(46), Constraint::Min(0)])
        .split(area);

    let form = &app.teacher.search;
    let lines = vec![
        Line::raw(""),
        views::field_line(
            "Username",
            form.username.value().to_string(),
            form.focus == SearchFocus::Username,
        ),
        views::field_line(
            "Amount",
            form.amount.value().to_string(),
            form.focus == SearchFocus::Amount,
        ),
        views::field_line(
            "Reason",
            form.reason.value().to_string(),
            form.focus == SearchFocus::Reason,
        ),
        Line::raw(""),
        Line::styled(
            " Search matches the exact username.",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    let block = Block::default().title(" Give or take ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), cols[0]);

    draw_student_card(f, cols[1], form.found.as_ref());
}

fn draw_student_card(f: &mut Frame, area: Rect, found: Option<&user::Model>) {
    let block = Block::default().title(" Student ").borders(Borders::ALL);
    let Some(student) = found else {
        f.render_widget(
            Paragraph::new(Line::styled(
                " Search for a student by exact username.",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
            area,
        );
        return;
    };

    let info = level::level_for(student.max_talent);
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!(" {}", student.display_name),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" (@{})", student.username),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    let mut details = Vec::new();
    if let Some(grade) = &student.grade {
        details.push(format!("Grade {grade}"));
    }
    if let Some(group) = &student.group_name {
        details.push(format!("Group {group}"));
    }
    if !details.is_empty() {
        lines.push(Line::styled(
            format!(" {}", details.join(" | ")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    lines.push(Line::from(Span::styled(
        format!(
            " {} talents (peak {})",
            student.current_talent, student.max_talent
        ),
        Style::default().fg(Color::Yellow),
    )));
    lines.push(Line::from(Span::styled(
        format!(" Level {} - {}", info.level, info.name),
        Style::default().fg(views::band_color(info.band)),
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_group_tab(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(46), Constraint::Min(0)])
        .split(area);

    let form = &app.teacher.group;
    let mut lines = vec![
        Line::raw(""),
        views::field_line(
            "Group",
            form.label.value().to_string(),
            form.focus == GroupFocus::Label,
        ),
        views::field_line(
            "Total",
            form.total.value().to_string(),
            form.focus == GroupFocus::Total,
        ),
        views::field_line(
            "Reason",
            form.reason.value().to_string(),
            form.focus == GroupFocus::Reason,
        ),
        Line::raw(""),
    ];
    lines.push(split_preview(form.total.parse_amount(), form.members.len()));
    let block = Block::default()
        .title(" Split a lump sum ")
        .borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), cols[0]);

    draw_members_card(f, cols[1], app);
}

/// Integer-division preview of the per-member share, mirroring how the grant
/// itself will split; the remainder is never distributed.
fn split_preview(total: Option<i64>, member_count: usize) -> Line<'static> {
    let Some(total) = total.filter(|t| *t > 0) else {
        return Line::raw("");
    };
    if member_count == 0 {
        return Line::raw("");
    }
    // Group sizes are tiny; the cast cannot wrap.
    #[allow(clippy::cast_possible_wrap)]
    let per_person = total / member_count as i64;
    if per_person > 0 {
        Line::styled(
            format!(" Preview: {per_person} each to {member_count} students"),
            Style::default().fg(Color::Green),
        )
    } else {
        Line::styled(
            format!(" {total} is too small to split {member_count} ways"),
            Style::default().fg(Color::Red),
        )
    }
}

fn draw_members_card(f: &mut Frame, area: Rect, app: &App) {
    let group = &app.teacher.group;
    let title = match &group.loaded_label {
        Some(label) => format!(" Members of {label} ({}) ", group.members.len()),
        None => " Members ".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    if group.loaded_label.is_none() {
        f.render_widget(
            Paragraph::new(Line::styled(
                " Load a group by its label.",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
            area,
        );
        return;
    }
    if group.members.is_empty() {
        f.render_widget(
            Paragraph::new(Line::styled(
                " No students in this group.",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = group
        .members
        .iter()
        .map(|member| {
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {:<24}", member.display_name)),
                Span::styled(
                    format!("{:>6}", member.current_talent),
                    Style::default().fg(Color::Yellow),
                ),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(block), area);
}

fn draw_history_tab(f: &mut Frame, area: Rect, app: &App) {
    let history = &app.teacher.history;
    let block = Block::default()
        .title(format!(" My transactions ({}) ", history.entries.len()))
        .borders(Borders::ALL);

    if history.entries.is_empty() {
        f.render_widget(
            Paragraph::new(Line::styled(
                " No transactions yet.",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
            area,
        );
        return;
    }

    let visible = usize::from(area.height.saturating_sub(2));
    let items: Vec<ListItem> = history
        .entries
        .iter()
        .skip(history.scroll)
        .take(visible.max(1))
        .map(entry_item)
        .collect();
    f.render_widget(List::new(items).block(block), area);
}

fn entry_item(entry: &HistoryEntry) -> ListItem<'_> {
    let (txn, student) = entry;
    let when = txn
        .created_at
        .with_timezone(&chrono::Local)
        .format("%m-%d %H:%M");
    let amount_style = if txn.amount >= 0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    let who = student
        .as_ref()
        .map_or("(removed student)", |s| s.display_name.as_str());

    ListItem::new(Line::from(vec![
        Span::styled(format!(" {when}  "), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{:>+5}", txn.amount), amount_style),
        Span::raw(format!("  {:<6}", txn.kind.label())),
        Span::raw(format!("{who:<24}")),
        Span::styled(
            txn.reason.clone(),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}
