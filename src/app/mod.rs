//! Terminal front end - screens, key handling, and the event loop.
//!
//! All database work runs on spawned tasks so the draw loop stays responsive.
//! While a task is in flight the app is marked busy and key input is ignored
//! until the matching [`AppMessage`] arrives, then the affected balances are
//! re-fetched rather than patched locally.

pub mod input;
pub mod views;

use std::{io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use sea_orm::DatabaseConnection;
use tokio::sync::mpsc;
use tracing::warn;

use crate::{
    core::{
        auth,
        session::{SessionIdentity, SessionStore},
        talent::{self, Balances, GroupGiveReport},
    },
    entities::{Role, transaction, user},
    errors::Result,
};
use self::input::InputField;

/// How many ledger entries the history tab fetches per load.
pub const HISTORY_LIMIT: u64 = 50;

/// A ledger entry paired with the student it concerns, when that account
/// still exists.
pub type HistoryEntry = (transaction::Model, Option<user::Model>);

/// Which screen the app is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Username/password form.
    Login,
    /// Balance, level, and groupmates for the signed-in student.
    Student,
    /// Search, group grant, and history tabs for a teacher.
    Teacher,
    /// Inert placeholder for admin accounts.
    Admin,
}

/// Tabs of the teacher screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TeacherTab {
    /// Find one student and give or take talents.
    #[default]
    Search,
    /// Split a lump sum across a group.
    Group,
    /// The teacher's own transaction log.
    History,
}

impl TeacherTab {
    /// Position in the tab bar.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Search => 0,
            Self::Group => 1,
            Self::History => 2,
        }
    }
}

/// Which login field has focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    /// The username field.
    #[default]
    Username,
    /// The password field.
    Password,
}

impl LoginFocus {
    const fn other(self) -> Self {
        match self {
            Self::Username => Self::Password,
            Self::Password => Self::Username,
        }
    }
}

/// Which search-tab field has focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SearchFocus {
    /// Exact username to look up.
    #[default]
    Username,
    /// Talent amount to give or take.
    Amount,
    /// Reason recorded on the ledger entry.
    Reason,
}

impl SearchFocus {
    const fn next(self) -> Self {
        match self {
            Self::Username => Self::Amount,
            Self::Amount => Self::Reason,
            Self::Reason => Self::Username,
        }
    }
}

/// Which group-tab field has focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GroupFocus {
    /// Group label to load.
    #[default]
    Label,
    /// Lump sum to split across the members.
    Total,
    /// Reason recorded on every ledger entry.
    Reason,
}

impl GroupFocus {
    const fn next(self) -> Self {
        match self {
            Self::Label => Self::Total,
            Self::Total => Self::Reason,
            Self::Reason => Self::Label,
        }
    }
}

/// State of the login form.
#[derive(Debug, Default)]
pub struct LoginState {
    /// Username field.
    pub username: InputField,
    /// Password field; rendered masked.
    pub password: InputField,
    /// Focused field.
    pub focus: LoginFocus,
    /// Inline message shown in the form, e.g. after a rejected sign-in.
    pub message: String,
}

impl LoginState {
    fn focused_input_mut(&mut self) -> &mut InputField {
        match self.focus {
            LoginFocus::Username => &mut self.username,
            LoginFocus::Password => &mut self.password,
        }
    }
}

/// State of the student screen.
#[derive(Debug, Default)]
pub struct StudentState {
    /// Latest fetched balances; falls back to the session snapshot until the
    /// first refresh completes.
    pub balances: Option<Balances>,
    /// Groupmates with their balances, empty when the student has no group.
    pub groupmates: Vec<user::Model>,
}

/// State of the teacher search tab.
#[derive(Debug)]
pub struct SearchTab {
    /// Exact username to look up.
    pub username: InputField,
    /// Amount to give or take.
    pub amount: InputField,
    /// Reason for the transaction.
    pub reason: InputField,
    /// Focused field.
    pub focus: SearchFocus,
    /// Result of the last search.
    pub found: Option<user::Model>,
}

impl Default for SearchTab {
    fn default() -> Self {
        Self {
            username: InputField::text(),
            amount: InputField::digits(),
            reason: InputField::text(),
            focus: SearchFocus::default(),
            found: None,
        }
    }
}

impl SearchTab {
    fn focused_input_mut(&mut self) -> &mut InputField {
        match self.focus {
            SearchFocus::Username => &mut self.username,
            SearchFocus::Amount => &mut self.amount,
            SearchFocus::Reason => &mut self.reason,
        }
    }
}

/// State of the teacher group tab.
#[derive(Debug)]
pub struct GroupTab {
    /// Group label to load.
    pub label: InputField,
    /// Lump sum to split.
    pub total: InputField,
    /// Reason for the grant.
    pub reason: InputField,
    /// Focused field.
    pub focus: GroupFocus,
    /// Label of the group whose members are loaded.
    pub loaded_label: Option<String>,
    /// Members of the loaded group.
    pub members: Vec<user::Model>,
}

impl Default for GroupTab {
    fn default() -> Self {
        Self {
            label: InputField::text(),
            total: InputField::digits(),
            reason: InputField::text(),
            focus: GroupFocus::default(),
            loaded_label: None,
            members: Vec::new(),
        }
    }
}

impl GroupTab {
    fn focused_input_mut(&mut self) -> &mut InputField {
        match self.focus {
            GroupFocus::Label => &mut self.label,
            GroupFocus::Total => &mut self.total,
            GroupFocus::Reason => &mut self.reason,
        }
    }
}

/// State of the teacher history tab.
#[derive(Debug, Default)]
pub struct HistoryTab {
    /// Fetched entries, newest first.
    pub entries: Vec<HistoryEntry>,
    /// Scroll offset into `entries`.
    pub scroll: usize,
}

/// State of the teacher screen.
#[derive(Debug, Default)]
pub struct TeacherState {
    /// Selected tab.
    pub tab: TeacherTab,
    /// Search-and-grant tab.
    pub search: SearchTab,
    /// Group-grant tab.
    pub group: GroupTab,
    /// Transaction log tab.
    pub history: HistoryTab,
}

/// Completion message posted by a spawned database task.
#[derive(Debug)]
pub enum AppMessage {
    /// Credentials verified; carries the new session identity.
    LoggedIn(SessionIdentity),
    /// Sign-in rejected; carries the message for the login form.
    LoginFailed(String),
    /// Fresh balances and groupmates for the student screen.
    StudentRefreshed {
        /// The student's own balances.
        balances: Balances,
        /// Groupmates with their balances.
        groupmates: Vec<user::Model>,
    },
    /// Result of a student search; `None` when no student matched.
    SearchComplete(Option<user::Model>),
    /// A give or take finished, successfully or not.
    GrantComplete {
        /// Outcome text for the status line.
        status: String,
        /// Re-fetched student, when the lookup after the grant succeeded.
        refreshed: Option<user::Model>,
    },
    /// Members of a searched group.
    GroupLoaded {
        /// The label that was searched.
        label: String,
        /// Students in that group.
        members: Vec<user::Model>,
    },
    /// A group grant finished.
    GroupGiveComplete {
        /// Outcome text for the status line.
        status: String,
        /// Re-fetched members, when the lookup after the grant succeeded.
        members: Option<Vec<user::Model>>,
    },
    /// The teacher's transaction log.
    HistoryLoaded(Vec<HistoryEntry>),
    /// A read failed; carries the message for the status line.
    LoadFailed(String),
}

#[derive(Clone, Copy)]
enum GrantKind {
    Give,
    Take,
}

/// Top-level application state.
#[derive(Debug)]
pub struct App {
    /// Current screen.
    pub screen: Screen,
    /// Signed-in account, if any.
    pub identity: Option<SessionIdentity>,
    /// Login form state.
    pub login: LoginState,
    /// Student screen state.
    pub student: StudentState,
    /// Teacher screen state.
    pub teacher: TeacherState,
    /// Message shown in the status bar; empty shows key hints instead.
    pub status: String,
    /// True while a spawned task is in flight.
    pub busy: bool,
    db: DatabaseConnection,
    session_store: SessionStore,
    tx: mpsc::Sender<AppMessage>,
}

impl App {
    /// Creates the app on the login screen.
    #[must_use]
    pub fn new(db: DatabaseConnection, session_store: SessionStore, tx: mpsc::Sender<AppMessage>) -> Self {
        Self {
            screen: Screen::Login,
            identity: None,
            login: LoginState::default(),
            student: StudentState::default(),
            teacher: TeacherState::default(),
            status: String::new(),
            busy: false,
            db,
            session_store,
            tx,
        }
    }

    /// Resumes a persisted session, skipping the login form when one exists.
    pub fn restore_session(&mut self) {
        if let Some(identity) = self.session_store.load() {
            self.status = format!("Resumed session for {}", identity.display_name);
            self.screen = Self::screen_for(identity.role);
            self.identity = Some(identity);
            if self.screen == Screen::Student {
                self.refresh_student();
            }
        }
    }

    const fn screen_for(role: Role) -> Screen {
        match role {
            Role::Student => Screen::Student,
            Role::Teacher => Screen::Teacher,
            Role::Admin => Screen::Admin,
        }
    }

    /// Handles one key event. Returns `false` when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }
        // A task is in flight; dropping input here is what keeps a repeated
        // submit key from applying a transaction twice.
        if self.busy {
            return true;
        }
        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Student => self.handle_student_key(key),
            Screen::Teacher => self.handle_teacher_key(key),
            Screen::Admin => self.handle_admin_key(key),
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                self.login.focus = self.login.focus.other();
            }
            KeyCode::Enter => match self.login.focus {
                LoginFocus::Username => self.login.focus = LoginFocus::Password,
                LoginFocus::Password => self.submit_login(),
            },
            KeyCode::Backspace => self.login.focused_input_mut().backspace(),
            KeyCode::Char(c) => self.login.focused_input_mut().push(c),
            _ => {}
        }
        true
    }

    fn handle_student_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return false,
            KeyCode::Esc => self.logout(),
            KeyCode::Char('r') => self.refresh_student(),
            _ => {}
        }
        true
    }

    fn handle_teacher_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.logout();
                return true;
            }
            KeyCode::F(1) => {
                self.teacher.tab = TeacherTab::Search;
                return true;
            }
            KeyCode::F(2) => {
                self.teacher.tab = TeacherTab::Group;
                return true;
            }
            KeyCode::F(3) => {
                self.teacher.tab = TeacherTab::History;
                self.load_history();
                return true;
            }
            _ => {}
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match (self.teacher.tab, key.code) {
                (TeacherTab::Search, KeyCode::Char('g')) => self.submit_grant(GrantKind::Give),
                (TeacherTab::Search, KeyCode::Char('t')) => self.submit_grant(GrantKind::Take),
                (TeacherTab::Group, KeyCode::Char('g')) => self.submit_group_give(),
                _ => {}
            }
            return true;
        }
        match self.teacher.tab {
            TeacherTab::Search => match key.code {
                KeyCode::Tab => self.teacher.search.focus = self.teacher.search.focus.next(),
                KeyCode::Enter => self.search_student(),
                KeyCode::Backspace => self.teacher.search.focused_input_mut().backspace(),
                KeyCode::Char(c) => self.teacher.search.focused_input_mut().push(c),
                _ => {}
            },
            TeacherTab::Group => match key.code {
                KeyCode::Tab => self.teacher.group.focus = self.teacher.group.focus.next(),
                KeyCode::Enter => self.load_group(),
                KeyCode::Backspace => self.teacher.group.focused_input_mut().backspace(),
                KeyCode::Char(c) => self.teacher.group.focused_input_mut().push(c),
                _ => {}
            },
            TeacherTab::History => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.teacher.history.scroll = self.teacher.history.scroll.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let last = self.teacher.history.entries.len().saturating_sub(1);
                    self.teacher.history.scroll = (self.teacher.history.scroll + 1).min(last);
                }
                KeyCode::Char('r') => self.load_history(),
                _ => {}
            },
        }
        true
    }

    fn handle_admin_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return false,
            KeyCode::Esc => self.logout(),
            _ => {}
        }
        true
    }

    fn logout(&mut self) {
        self.session_store.clear();
        self.identity = None;
        self.login = LoginState::default();
        self.student = StudentState::default();
        self.teacher = TeacherState::default();
        self.screen = Screen::Login;
        self.status = "Logged out".to_string();
    }

    /// Applies a completion message from a spawned task.
    pub fn handle_message(&mut self, msg: AppMessage) {
        self.busy = false;
        match msg {
            AppMessage::LoggedIn(identity) => {
                if let Err(e) = self.session_store.save(&identity) {
                    warn!("Failed to persist session: {e}");
                }
                self.status = format!("Welcome, {}", identity.display_name);
                self.screen = Self::screen_for(identity.role);
                self.identity = Some(identity);
                self.login = LoginState::default();
                if self.screen == Screen::Student {
                    self.refresh_student();
                }
            }
            AppMessage::LoginFailed(message) => {
                self.login.message = message;
            }
            AppMessage::StudentRefreshed {
                balances,
                groupmates,
            } => {
                if let Some(identity) = &mut self.identity {
                    identity.current_talent = balances.current_talent;
                    identity.max_talent = balances.max_talent;
                    if let Err(e) = self.session_store.save(identity) {
                        warn!("Failed to persist session: {e}");
                    }
                }
                self.student.balances = Some(balances);
                self.student.groupmates = groupmates;
                self.status = "Refreshed".to_string();
            }
            AppMessage::SearchComplete(found) => {
                match found {
                    Some(student) => {
                        self.status = format!("Found {}", student.display_name);
                        self.teacher.search.found = Some(student);
                    }
                    None => {
                        self.status = format!(
                            "No student named '{}'",
                            self.teacher.search.username.value().trim()
                        );
                        self.teacher.search.found = None;
                    }
                }
            }
            AppMessage::GrantComplete { status, refreshed } => {
                self.status = status;
                if let Some(student) = refreshed {
                    self.teacher.search.found = Some(student);
                }
            }
            AppMessage::GroupLoaded { label, members } => {
                self.status = if members.is_empty() {
                    format!("No students in group '{label}'")
                } else {
                    format!("Loaded {} students from group '{label}'", members.len())
                };
                self.teacher.group.loaded_label = Some(label);
                self.teacher.group.members = members;
            }
            AppMessage::GroupGiveComplete { status, members } => {
                self.status = status;
                if let Some(members) = members {
                    self.teacher.group.members = members;
                }
            }
            AppMessage::HistoryLoaded(entries) => {
                self.status = format!("{} entries", entries.len());
                self.teacher.history.entries = entries;
                self.teacher.history.scroll = 0;
            }
            AppMessage::LoadFailed(message) => {
                self.status = message;
            }
        }
    }

    fn submit_login(&mut self) {
        let username = self.login.username.value().trim().to_string();
        let password = self.login.password.value().to_string();
        if username.is_empty() || password.is_empty() {
            self.login.message = "Enter a username and password".to_string();
            return;
        }
        self.login.message.clear();
        let db = self.db.clone();
        let tx = self.tx.clone();
        self.busy = true;
        self.status = "Signing in...".to_string();
        tokio::spawn(async move {
            let msg = match auth::authenticate(&db, &username, &password).await {
                Ok(identity) => AppMessage::LoggedIn(identity),
                Err(e) => AppMessage::LoginFailed(e.user_message()),
            };
            let _ = tx.send(msg).await;
        });
    }

    fn refresh_student(&mut self) {
        let Some(identity) = &self.identity else {
            return;
        };
        let db = self.db.clone();
        let tx = self.tx.clone();
        let student_id = identity.id;
        let group = identity.group_name.clone();
        self.busy = true;
        self.status = "Refreshing...".to_string();
        tokio::spawn(async move {
            let balances = talent::current_balances(&db, student_id).await;
            let groupmates = match &group {
                Some(label) => crate::core::user::get_groupmates(&db, label, student_id).await,
                None => Ok(Vec::new()),
            };
            let msg = match (balances, groupmates) {
                (Ok(balances), Ok(groupmates)) => AppMessage::StudentRefreshed {
                    balances,
                    groupmates,
                },
                (Err(e), _) | (_, Err(e)) => AppMessage::LoadFailed(e.user_message()),
            };
            let _ = tx.send(msg).await;
        });
    }

    fn search_student(&mut self) {
        let username = self.teacher.search.username.value().trim().to_string();
        if username.is_empty() {
            self.status = "Enter a username to search".to_string();
            return;
        }
        let db = self.db.clone();
        let tx = self.tx.clone();
        self.busy = true;
        self.status = "Searching...".to_string();
        tokio::spawn(async move {
            let msg = match crate::core::user::get_user_by_username(&db, &username).await {
                Ok(found) => {
                    AppMessage::SearchComplete(found.filter(|u| u.role == Role::Student))
                }
                Err(e) => AppMessage::LoadFailed(e.user_message()),
            };
            let _ = tx.send(msg).await;
        });
    }

    fn submit_grant(&mut self, kind: GrantKind) {
        let Some(identity) = &self.identity else {
            return;
        };
        let Some(found) = &self.teacher.search.found else {
            self.status = "Search for a student first".to_string();
            return;
        };
        let Some(amount) = self.teacher.search.amount.parse_amount().filter(|a| *a > 0) else {
            self.status = "Enter a positive amount".to_string();
            return;
        };
        let reason = self.teacher.search.reason.value().trim().to_string();
        if reason.is_empty() {
            self.status = "Enter a reason".to_string();
            return;
        }
        let db = self.db.clone();
        let tx = self.tx.clone();
        let student_id = found.id;
        let actor_id = identity.id;
        self.busy = true;
        self.status = "Applying...".to_string();
        tokio::spawn(async move {
            let result = match kind {
                GrantKind::Give => talent::give(&db, student_id, actor_id, amount, &reason).await,
                GrantKind::Take => talent::take(&db, student_id, actor_id, amount, &reason).await,
            };
            let msg = match result {
                Ok(outcome) => {
                    let refreshed = crate::core::user::get_user_by_id(&db, student_id)
                        .await
                        .ok()
                        .flatten();
                    let verb = match kind {
                        GrantKind::Give => "Gave",
                        GrantKind::Take => "Took",
                    };
                    AppMessage::GrantComplete {
                        status: format!(
                            "{verb} {amount}; {} now has {} talents",
                            outcome.student_name, outcome.balances.current_talent
                        ),
                        refreshed,
                    }
                }
                Err(e) => AppMessage::GrantComplete {
                    status: e.user_message(),
                    refreshed: None,
                },
            };
            let _ = tx.send(msg).await;
        });
    }

    fn load_group(&mut self) {
        let label = self.teacher.group.label.value().trim().to_string();
        if label.is_empty() {
            self.status = "Enter a group label".to_string();
            return;
        }
        let db = self.db.clone();
        let tx = self.tx.clone();
        self.busy = true;
        self.status = "Loading group...".to_string();
        tokio::spawn(async move {
            let msg = match crate::core::user::get_students_in_group(&db, &label).await {
                Ok(members) => AppMessage::GroupLoaded { label, members },
                Err(e) => AppMessage::LoadFailed(e.user_message()),
            };
            let _ = tx.send(msg).await;
        });
    }

    fn submit_group_give(&mut self) {
        let Some(identity) = &self.identity else {
            return;
        };
        let Some(label) = self.teacher.group.loaded_label.clone() else {
            self.status = "Load a group first".to_string();
            return;
        };
        if self.teacher.group.members.is_empty() {
            self.status = "The loaded group has no students".to_string();
            return;
        }
        let Some(total) = self.teacher.group.total.parse_amount().filter(|t| *t > 0) else {
            self.status = "Enter a positive total".to_string();
            return;
        };
        let reason = self.teacher.group.reason.value().trim().to_string();
        if reason.is_empty() {
            self.status = "Enter a reason".to_string();
            return;
        }
        let db = self.db.clone();
        let tx = self.tx.clone();
        let members = self.teacher.group.members.clone();
        let actor_id = identity.id;
        self.busy = true;
        self.status = "Applying...".to_string();
        tokio::spawn(async move {
            let status = match talent::group_give(&db, &members, actor_id, total, &reason, &label)
                .await
            {
                Ok(report) => group_status(&report, total),
                Err(e) => e.user_message(),
            };
            let refreshed = crate::core::user::get_students_in_group(&db, &label).await.ok();
            let _ = tx
                .send(AppMessage::GroupGiveComplete {
                    status,
                    members: refreshed,
                })
                .await;
        });
    }

    fn load_history(&mut self) {
        let Some(identity) = &self.identity else {
            return;
        };
        let db = self.db.clone();
        let tx = self.tx.clone();
        let actor_id = identity.id;
        self.busy = true;
        self.status = "Loading history...".to_string();
        tokio::spawn(async move {
            let msg = match talent::history(&db, actor_id, HISTORY_LIMIT).await {
                Ok(entries) => AppMessage::HistoryLoaded(entries),
                Err(e) => AppMessage::LoadFailed(e.user_message()),
            };
            let _ = tx.send(msg).await;
        });
    }
}

fn group_status(report: &GroupGiveReport, total: i64) -> String {
    let members = report.outcomes.len();
    if report.failed() == 0 {
        format!(
            "Gave {} each to {members} students ({} of {total} distributed)",
            report.per_person,
            report.distributed()
        )
    } else if report.is_partial() {
        format!(
            "Gave {} each to {} of {members} students; {} failed",
            report.per_person,
            report.succeeded(),
            report.failed()
        )
    } else {
        format!("Group grant failed for all {members} students")
    }
}

/// Runs the terminal UI until the user quits. Restores the terminal even
/// when the event loop errors.
pub async fn run(db: DatabaseConnection, session_store: SessionStore) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = App::new(db, session_store, tx);
    app.restore_session();

    let result = run_event_loop(&mut terminal, &mut app, &mut rx).await;

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rx: &mut mpsc::Receiver<AppMessage>,
) -> Result<()> {
    loop {
        // Apply everything the spawned tasks finished since the last frame.
        while let Ok(msg) = rx.try_recv() {
            app.handle_message(msg);
        }

        terminal.draw(|f| views::draw(f, app))?;

        let event = tokio::task::block_in_place(|| -> std::io::Result<Option<Event>> {
            if event::poll(Duration::from_millis(100))? {
                Ok(Some(event::read()?))
            } else {
                Ok(None)
            }
        })?;
        if let Some(Event::Key(key)) = event {
            if !app.handle_key(key) {
                return Ok(());
            }
        }
    }
}
