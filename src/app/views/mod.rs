//! Rendering for every screen - one module per screen plus shared chrome.
//!
//! Views are pure functions of [`App`] state; nothing here mutates anything
//! or touches the database.

pub mod admin;
pub mod login;
pub mod student;
pub mod teacher;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{App, Screen, TeacherTab},
    core::level::ColorBand,
    entities::Role,
};

/// Draws the whole frame: header row, active screen, status bar.
pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, rows[0], app);
    match app.screen {
        Screen::Login => login::draw(f, rows[1], app),
        Screen::Student => student::draw(f, rows[1], app),
        Screen::Teacher => teacher::draw(f, rows[1], app),
        Screen::Admin => admin::draw(f, rows[1], app),
    }
    draw_status(f, rows[2], app);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(40)])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        " Talent Bank",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    f.render_widget(title, cols[0]);

    if let Some(identity) = &app.identity {
        let who = Paragraph::new(Line::from(Span::styled(
            format!("{} ({}) ", identity.display_name, role_label(identity.role)),
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Right);
        f.render_widget(who, cols[1]);
    }
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let (label, color) = match app.screen {
        Screen::Login => ("LOGIN", Color::Cyan),
        Screen::Student => ("STUDENT", Color::Green),
        Screen::Teacher => ("TEACHER", Color::Magenta),
        Screen::Admin => ("ADMIN", Color::Red),
    };
    let text = if app.status.is_empty() {
        hints(app)
    } else {
        app.status.clone()
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {label} "),
            Style::default().fg(Color::Black).bg(color),
        ),
        Span::raw(" "),
        Span::styled(text, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn hints(app: &App) -> String {
    match app.screen {
        Screen::Login => "Tab switch | Enter submit | Esc quit".to_string(),
        Screen::Student => "r refresh | Esc logout | q quit".to_string(),
        Screen::Teacher => match app.teacher.tab {
            TeacherTab::Search => {
                "Enter search | Ctrl-g give | Ctrl-t take | Tab next field | F1-F3 tabs".to_string()
            }
            TeacherTab::Group => {
                "Enter load | Ctrl-g split | Tab next field | F1-F3 tabs".to_string()
            }
            TeacherTab::History => "r reload | j/k scroll | F1-F3 tabs | Esc logout".to_string(),
        },
        Screen::Admin => "Esc logout | q quit".to_string(),
    }
}

/// Lowercase role name for the header and cards.
pub(crate) const fn role_label(role: Role) -> &'static str {
    match role {
        Role::Student => "student",
        Role::Teacher => "teacher",
        Role::Admin => "admin",
    }
}

/// Terminal color for a level band.
pub(crate) const fn band_color(band: ColorBand) -> Color {
    match band {
        ColorBand::Bronze => Color::LightRed,
        ColorBand::Silver => Color::Gray,
        ColorBand::Gold => Color::Yellow,
        ColorBand::Platinum => Color::White,
        ColorBand::Emerald => Color::Green,
        ColorBand::Sapphire => Color::Blue,
        ColorBand::Ruby => Color::Red,
        ColorBand::Diamond => Color::Cyan,
    }
}

/// One labelled form row; the focused row gets a highlighted label and a
/// trailing cursor mark.
pub(crate) fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![
        Span::styled(format!(" {label:<10} "), label_style),
        Span::raw(value),
    ];
    if focused {
        spans.push(Span::styled("_", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

/// A rect of at most `width` x `height` centered inside `area`.
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::{
        app::AppMessage,
        core::session::{SessionIdentity, SessionStore},
        entities::{TransactionKind, transaction, user},
    };
    use ratatui::{Terminal, backend::TestBackend};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tokio::sync::mpsc;

    fn test_app() -> App {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let dir = std::env::temp_dir().join(format!("talentbank-views-{}", std::process::id()));
        let (tx, _rx) = mpsc::channel(8);
        App::new(db, SessionStore::new(dir), tx)
    }

    fn identity(role: Role) -> SessionIdentity {
        SessionIdentity {
            id: 1,
            username: "hannah".to_string(),
            display_name: "Hannah Park".to_string(),
            role,
            group_name: Some("Joshua".to_string()),
            grade: Some("8".to_string()),
            church: Some("Grace Chapel".to_string()),
            current_talent: 60,
            max_talent: 80,
        }
    }

    fn student_model(id: i64, name: &str, balance: i64) -> user::Model {
        user::Model {
            id,
            username: name.to_lowercase().replace(' ', ""),
            password_hash: "hash".to_string(),
            display_name: name.to_string(),
            role: Role::Student,
            group_name: Some("Joshua".to_string()),
            grade: Some("8".to_string()),
            church: None,
            current_talent: balance,
            max_talent: balance,
        }
    }

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_draw_login_screen() {
        let mut app = test_app();
        app.login.message = "Invalid username or password".to_string();
        let text = rendered(&app);

        assert!(text.contains("Talent Bank"));
        assert!(text.contains("Username"));
        assert!(text.contains("Password"));
        assert!(text.contains("Invalid username or password"));
        assert!(text.contains("LOGIN"));
    }

    #[test]
    fn test_draw_login_masks_password() {
        let mut app = test_app();
        app.login.password.push('s');
        app.login.password.push('3');
        app.login.password.push('c');
        let text = rendered(&app);

        assert!(text.contains("***"));
        assert!(!text.contains("s3c"));
    }

    #[test]
    fn test_draw_student_screen() {
        let mut app = test_app();
        app.screen = Screen::Student;
        app.identity = Some(identity(Role::Student));
        app.student.groupmates = vec![student_model(2, "Abby Lee", 7)];
        let text = rendered(&app);

        assert!(text.contains("Hannah Park"));
        assert!(text.contains("60"));
        // max_talent 80 sits in the second band
        assert!(text.contains("Silver"));
        assert!(text.contains("Abby Lee"));
        assert!(text.contains("Joshua"));
    }

    #[test]
    fn test_draw_student_without_group() {
        let mut app = test_app();
        app.screen = Screen::Student;
        let mut solo = identity(Role::Student);
        solo.group_name = None;
        app.identity = Some(solo);
        let text = rendered(&app);

        assert!(text.contains("No group assigned"));
    }

    #[test]
    fn test_draw_teacher_search_tab() {
        let mut app = test_app();
        app.screen = Screen::Teacher;
        app.identity = Some(identity(Role::Teacher));
        app.teacher.search.found = Some(student_model(2, "Ben Cho", 15));
        let text = rendered(&app);

        assert!(text.contains("Search"));
        assert!(text.contains("Ben Cho"));
        assert!(text.contains("15"));
    }

    #[test]
    fn test_draw_teacher_history_placeholder_for_removed_student() {
        let mut app = test_app();
        app.screen = Screen::Teacher;
        app.identity = Some(identity(Role::Teacher));
        app.teacher.tab = TeacherTab::History;
        app.handle_message(AppMessage::HistoryLoaded(vec![(
            transaction::Model {
                id: 1,
                student_id: 99,
                teacher_id: 1,
                amount: 10,
                reason: "Memory verse".to_string(),
                kind: TransactionKind::IndividualGive,
                created_at: chrono::Utc::now(),
            },
            None,
        )]));
        let text = rendered(&app);

        assert!(text.contains("Memory verse"));
        assert!(text.contains("(removed student)"));
        assert!(text.contains("+10"));
    }

    #[test]
    fn test_draw_admin_screen() {
        let mut app = test_app();
        app.screen = Screen::Admin;
        app.identity = Some(identity(Role::Admin));
        let text = rendered(&app);

        assert!(text.contains("restricted"));
        assert!(text.contains("ADMIN"));
    }
}
