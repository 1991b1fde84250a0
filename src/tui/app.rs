//! Main TUI application state and logic

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::ai::{fetch_tip, tip_provider, TipProvider, TipTicket};
use crate::cli::browser;
use crate::core::catalog::{Catalog, Confirmation};
use crate::core::clock::Clock;
use crate::core::config::Config;
use crate::core::credentials::{CredentialStore, Secret};
use crate::core::elevation::ElevationGate;
use crate::core::model::{color_family, ExerciseId, COLOR_OPTIONS};
use crate::core::portal::Portal;
use crate::core::progress::Completion;
use crate::core::store::{FileStore, KeyValueStore, PortalStore};
use crate::error::{EduQuestError, Result};
use crate::tui::event::{global_key, is_force_quit_key, AppEvent, EventHandler, GlobalKey};
use crate::tui::ui;

/// Longest accepted learner name in the register form
const MAX_NAME_LEN: usize = 40;

/// Upper bound for points typed into the exercise form
const MAX_POINTS: u32 = 1000;

/// Message type for async operation results
#[derive(Debug)]
pub enum AsyncMessage {
    /// Study tip fetched (or replaced by the fallback)
    TipLoaded { ticket: TipTicket, text: String },
}

/// Current screen in the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Register,
    Subjects,
    Subject,
    Admin,
    Settings,
}

/// List selection state
#[derive(Debug, Default)]
pub struct ListState {
    /// Currently selected index
    pub selected: usize,
    /// Total items in the list
    pub total: usize,
}

impl ListState {
    pub fn new(total: usize) -> Self {
        Self { selected: 0, total }
    }

    pub fn next(&mut self) {
        if self.total > 0 {
            self.selected = (self.selected + 1) % self.total;
        }
    }

    pub fn previous(&mut self) {
        if self.total > 0 {
            self.selected = self.selected.checked_sub(1).unwrap_or(self.total - 1);
        }
    }

    /// Update the item count, keeping the selection in range
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        if self.selected >= total {
            self.selected = total.saturating_sub(1);
        }
    }
}

/// Error popup for displaying errors that require user acknowledgment
#[derive(Debug, Clone)]
pub struct ErrorPopup {
    pub title: String,
    pub message: String,
}

/// Which part of the teacher panel has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSection {
    SubjectForm,
    ExerciseForm,
    Content,
}

impl AdminSection {
    pub fn next(self) -> Self {
        match self {
            AdminSection::SubjectForm => AdminSection::ExerciseForm,
            AdminSection::ExerciseForm => AdminSection::Content,
            AdminSection::Content => AdminSection::SubjectForm,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            AdminSection::SubjectForm => AdminSection::Content,
            AdminSection::ExerciseForm => AdminSection::SubjectForm,
            AdminSection::Content => AdminSection::ExerciseForm,
        }
    }

    /// Number of fields in a form section
    pub fn field_count(self) -> usize {
        match self {
            AdminSection::SubjectForm => 3,
            AdminSection::ExerciseForm => 6,
            AdminSection::Content => 0,
        }
    }
}

/// A row of the teacher panel's content list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRow {
    Subject(String),
    Exercise(ExerciseId),
}

/// Item awaiting delete confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Subject(String),
    Exercise { id: ExerciseId, title: String },
}

/// Subjects followed by their exercises; exercises whose subject is gone
/// are listed last so they can still be removed.
pub fn content_rows(catalog: &Catalog) -> Vec<ContentRow> {
    let mut rows = Vec::new();
    for subject in catalog.subjects() {
        rows.push(ContentRow::Subject(subject.name.clone()));
        rows.extend(
            catalog
                .exercises_for_subject(&subject.name)
                .map(|e| ContentRow::Exercise(e.id.clone())),
        );
    }
    rows.extend(
        catalog
            .exercises()
            .iter()
            .filter(|e| catalog.subject(&e.subject).is_none())
            .map(|e| ContentRow::Exercise(e.id.clone())),
    );
    rows
}

/// Main TUI application
pub struct App<S: KeyValueStore = FileStore> {
    /// Whether the app is running
    pub running: bool,
    /// Current screen
    pub current_screen: Screen,
    /// Navigation history for back navigation
    pub navigation_stack: Vec<Screen>,
    /// Application state
    pub portal: Portal<S>,
    /// Status message to display
    pub status_message: Option<String>,
    /// Whether to show the help overlay
    pub show_help: bool,
    /// Error popup (blocks input until dismissed)
    pub error_popup: Option<ErrorPopup>,

    /// Register screen name input
    pub register_input: String,
    /// Subject list selection
    pub subject_selection: ListState,
    /// Exercise list selection on the subject screen
    pub exercise_selection: ListState,

    /// Teacher password input; `Some` while the login popup is open
    pub login_input: Option<String>,
    /// Focused section of the teacher panel
    pub admin_section: AdminSection,
    /// Focused field within a form section
    pub admin_field: usize,
    /// Content list selection in the teacher panel
    pub content_selection: ListState,
    /// Pending delete awaiting confirmation
    pub confirm_delete: Option<DeleteTarget>,

    /// Settings selection
    pub settings_selection: ListState,
    /// Whether the Gemini key input is active
    pub settings_input_mode: bool,
    /// Gemini key being typed
    pub settings_api_key_input: String,
    /// Whether a Gemini key is available
    pub gemini_configured: bool,
    /// Loaded configuration
    pub config: Config,

    /// Tick counter for the loading spinner
    pub tick_counter: u64,

    tip_provider: Arc<dyn TipProvider>,
    async_tx: mpsc::Sender<AsyncMessage>,
    async_rx: mpsc::Receiver<AsyncMessage>,
}

impl App<FileStore> {
    /// Open the portal in the configured data directory
    pub fn open(data_dir: Option<PathBuf>) -> Result<Self> {
        let config = Config::load()?;
        let store = FileStore::open(config.data_dir(data_dir)?)?;
        let gate = ElevationGate::from_credentials().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "teacher password unavailable");
            ElevationGate::default()
        });
        let portal = Portal::load(PortalStore::new(store), gate, Clock::System);

        let mut app = Self::new(portal, tip_provider(), config);
        app.gemini_configured = CredentialStore::has(Secret::GeminiKey).unwrap_or(false);
        Ok(app)
    }
}

impl<S: KeyValueStore> App<S> {
    pub fn new(portal: Portal<S>, tip_provider: Arc<dyn TipProvider>, config: Config) -> Self {
        let (async_tx, async_rx) = mpsc::channel(32);
        let current_screen = if portal.is_registered() {
            Screen::Subjects
        } else {
            Screen::Register
        };
        let subject_total = portal.catalog().subjects().len();

        Self {
            running: true,
            current_screen,
            navigation_stack: Vec::new(),
            portal,
            status_message: None,
            show_help: false,
            error_popup: None,
            register_input: String::new(),
            subject_selection: ListState::new(subject_total),
            exercise_selection: ListState::default(),
            login_input: None,
            admin_section: AdminSection::SubjectForm,
            admin_field: 0,
            content_selection: ListState::default(),
            confirm_delete: None,
            settings_selection: ListState::new(3),
            settings_input_mode: false,
            settings_api_key_input: String::new(),
            gemini_configured: false,
            config,
            tick_counter: 0,
            tip_provider,
            async_tx,
            async_rx,
        }
    }

    /// Setup terminal for TUI
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode().map_err(|e| EduQuestError::Terminal(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| EduQuestError::Terminal(e.to_string()))?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).map_err(|e| EduQuestError::Terminal(e.to_string()))
    }

    /// Restore terminal to normal state
    fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode().map_err(|e| EduQuestError::Terminal(e.to_string()))?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| EduQuestError::Terminal(e.to_string()))?;
        terminal
            .show_cursor()
            .map_err(|e| EduQuestError::Terminal(e.to_string()))?;
        Ok(())
    }

    /// Run the TUI application
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = Self::setup_terminal()?;
        let mut events = EventHandler::new(Duration::from_millis(250));

        while self.running {
            terminal
                .draw(|frame| ui::render(frame, self))
                .map_err(|e| EduQuestError::Terminal(e.to_string()))?;

            while let Ok(msg) = self.async_rx.try_recv() {
                self.handle_async_message(msg);
            }

            if let Some(event) = events.next().await {
                match event {
                    AppEvent::Key(key) => self.handle_key_event(key),
                    AppEvent::Resize(_, _) => {}
                    AppEvent::Tick => self.on_tick(),
                }
            }
        }

        Self::restore_terminal(&mut terminal)?;
        Ok(())
    }

    /// Handle async message from background tasks
    pub fn handle_async_message(&mut self, msg: AsyncMessage) {
        match msg {
            AsyncMessage::TipLoaded { ticket, text } => {
                self.portal.resolve_tip(&ticket, text);
            }
        }
    }

    fn on_tick(&mut self) {
        self.tick_counter = self.tick_counter.wrapping_add(1);

        match self.portal.refresh_day() {
            Ok(true) => {
                self.status_message = Some("A new day! Your daily challenge was reset.".to_string());
            }
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "could not save day rollover"),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Key dispatch
    // ─────────────────────────────────────────────────────────────────────────

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if is_force_quit_key(&key) {
            self.quit();
            return;
        }

        // If help is shown, any key dismisses it
        if self.show_help {
            self.show_help = false;
            return;
        }

        if self.error_popup.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                self.error_popup = None;
            }
            return;
        }

        if self.confirm_delete.is_some() {
            self.handle_confirm_key(key);
            return;
        }

        if self.login_input.is_some() {
            self.handle_login_key(key);
            return;
        }

        if self.settings_input_mode {
            self.handle_settings_key(key);
            return;
        }

        // Text entry screens bypass the global handlers
        match self.current_screen {
            Screen::Register => {
                self.handle_register_key(key);
                return;
            }
            Screen::Admin if self.admin_section != AdminSection::Content => {
                self.handle_admin_form_key(key);
                return;
            }
            _ => {}
        }

        match global_key(&key) {
            Some(GlobalKey::Help) => {
                self.show_help = true;
                return;
            }
            Some(GlobalKey::Quit) if self.current_screen == Screen::Subjects => {
                self.quit();
                return;
            }
            Some(GlobalKey::Quit) | Some(GlobalKey::Back) => {
                self.go_back();
                return;
            }
            None => {}
        }

        match self.current_screen {
            Screen::Subjects => self.handle_subjects_key(key),
            Screen::Subject => self.handle_subject_key(key),
            Screen::Admin => self.handle_admin_content_key(key),
            Screen::Settings => self.handle_settings_key(key),
            Screen::Register => {}
        }
    }

    fn handle_register_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Enter => {
                let name = self.register_input.clone();
                match self.portal.register(&name) {
                    Ok(user) => {
                        self.status_message = Some(format!("Welcome, {}! 🎓", user.name));
                        self.register_input.clear();
                        self.navigation_stack.clear();
                        self.current_screen = Screen::Subjects;
                    }
                    Err(e) => self.status_message = Some(e.to_string()),
                }
            }
            KeyCode::Backspace => {
                self.register_input.pop();
            }
            KeyCode::Char(c) => {
                if self.register_input.chars().count() < MAX_NAME_LEN {
                    self.register_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_subjects_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.subject_selection.next(),
            KeyCode::Char('k') | KeyCode::Up => self.subject_selection.previous(),
            KeyCode::Enter => self.open_selected_subject(),
            KeyCode::Char('a') => self.open_admin(),
            KeyCode::Char('s') => self.navigate_to(Screen::Settings),
            KeyCode::Char('x') if self.portal.is_elevated() => {
                match self.portal.leave_elevated() {
                    Ok(()) => self.status_message = Some("Left teacher mode".to_string()),
                    Err(e) => self.show_error("Could not leave teacher mode", e),
                }
            }
            _ => {}
        }
    }

    fn handle_subject_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.exercise_selection.next(),
            KeyCode::Char('k') | KeyCode::Up => self.exercise_selection.previous(),
            KeyCode::Enter | KeyCode::Char('o') => self.open_selected_exercise(),
            KeyCode::Char('c') => self.complete_selected_exercise(),
            KeyCode::Char('r') => {
                if let Some(name) = self.portal.selected_subject().map(|s| s.name.clone()) {
                    self.select_subject(&name);
                }
            }
            _ => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Learner actions
    // ─────────────────────────────────────────────────────────────────────────

    fn open_selected_subject(&mut self) {
        let name = match self
            .portal
            .catalog()
            .subjects()
            .get(self.subject_selection.selected)
        {
            Some(subject) => subject.name.clone(),
            None => return,
        };
        if self.select_subject(&name) {
            self.navigate_to(Screen::Subject);
        }
    }

    /// Select a subject and start fetching its tip
    fn select_subject(&mut self, name: &str) -> bool {
        match self.portal.select_subject(name) {
            Ok(ticket) => {
                self.exercise_selection = ListState::new(self.portal.visible_exercises().len());
                self.spawn_tip_fetch(ticket);
                true
            }
            Err(e) => {
                self.show_error("Cannot open subject", e);
                false
            }
        }
    }

    fn spawn_tip_fetch(&self, ticket: TipTicket) {
        let tx = self.async_tx.clone();
        let provider = self.tip_provider.clone();

        tokio::spawn(async move {
            let text = fetch_tip(provider.as_ref(), &ticket.subject).await;
            let _ = tx.send(AsyncMessage::TipLoaded { ticket, text }).await;
        });
    }

    fn selected_exercise_id(&self) -> Option<ExerciseId> {
        self.portal
            .visible_exercises()
            .get(self.exercise_selection.selected)
            .map(|e| e.id.clone())
    }

    fn open_selected_exercise(&mut self) {
        let Some(id) = self.selected_exercise_id() else {
            return;
        };
        let Some(exercise) = self.portal.catalog().exercise(&id) else {
            return;
        };
        let (title, url) = (exercise.title.clone(), exercise.url.clone());

        match browser::open_link(&url) {
            Ok(true) => {
                self.status_message = Some(format!("Opened '{}'. Press c when done!", title));
            }
            Ok(false) => self.status_message = Some(format!("Open manually: {}", url)),
            Err(e) => self.show_error("Cannot open link", e),
        }
    }

    fn complete_selected_exercise(&mut self) {
        let Some(id) = self.selected_exercise_id() else {
            return;
        };

        match self.portal.complete_exercise(&id) {
            Ok(Completion::Awarded(points)) => {
                let message = if self.portal.progress().remaining_today() == 0 {
                    format!("+{} points! 🏆 Daily challenge complete!", points)
                } else {
                    format!("+{} points! ⭐", points)
                };
                self.status_message = Some(message);
            }
            Ok(Completion::AlreadyCompleted) => {
                self.status_message = Some("Already completed today".to_string());
            }
            Ok(Completion::UnknownExercise) => {
                self.show_error(
                    "Cannot complete exercise",
                    EduQuestError::NotFound(format!("Exercise '{}'", id)),
                );
            }
            Ok(Completion::NotRegistered) => {
                self.show_error("Cannot complete exercise", EduQuestError::NotRegistered);
            }
            Err(e) => self.show_error("Could not save progress", e),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Teacher mode
    // ─────────────────────────────────────────────────────────────────────────

    fn open_admin(&mut self) {
        if self.portal.is_elevated() {
            self.navigate_to(Screen::Admin);
        } else if !self.portal.gate().is_configured() {
            self.show_error("Teacher mode", EduQuestError::ElevationNotConfigured);
        } else {
            self.login_input = Some(String::new());
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        let Some(input) = self.login_input.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.login_input = None,
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            KeyCode::Enter => {
                let attempt = std::mem::take(input);
                match self.portal.enter_elevated(&attempt) {
                    Ok(()) => {
                        self.login_input = None;
                        self.navigate_to(Screen::Admin);
                        self.status_message = Some("Teacher mode unlocked".to_string());
                    }
                    Err(EduQuestError::AccessDenied) => {
                        self.status_message = Some("Incorrect password".to_string());
                    }
                    Err(e) => {
                        self.login_input = None;
                        self.show_error("Teacher mode", e);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_admin_form_key(&mut self, key: KeyEvent) {
        let section = self.admin_section;
        let field_count = section.field_count();

        match key.code {
            KeyCode::Esc => self.go_back(),
            KeyCode::Tab => self.focus_section(section.next()),
            KeyCode::BackTab => self.focus_section(section.previous()),
            KeyCode::Down => self.admin_field = (self.admin_field + 1) % field_count,
            KeyCode::Up => {
                self.admin_field = self.admin_field.checked_sub(1).unwrap_or(field_count - 1)
            }
            KeyCode::Left => self.cycle_field(false),
            KeyCode::Right => self.cycle_field(true),
            KeyCode::Enter => match section {
                AdminSection::SubjectForm => self.submit_subject_form(),
                AdminSection::ExerciseForm => self.submit_exercise_form(),
                AdminSection::Content => {}
            },
            KeyCode::Backspace => {
                if section == AdminSection::ExerciseForm && self.admin_field == 5 {
                    self.portal.exercise_form.points /= 10;
                } else if let Some(text) = self.focused_text_field() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if section == AdminSection::ExerciseForm && self.admin_field == 5 {
                    if let Some(digit) = c.to_digit(10) {
                        let points = &mut self.portal.exercise_form.points;
                        *points = (*points * 10 + digit).min(MAX_POINTS);
                    }
                } else if let Some(text) = self.focused_text_field() {
                    text.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_admin_content_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => self.focus_section(self.admin_section.next()),
            KeyCode::BackTab => self.focus_section(self.admin_section.previous()),
            KeyCode::Char('j') | KeyCode::Down => self.content_selection.next(),
            KeyCode::Char('k') | KeyCode::Up => self.content_selection.previous(),
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(),
            _ => {}
        }
    }

    fn focus_section(&mut self, section: AdminSection) {
        self.admin_section = section;
        self.admin_field = 0;
        if section == AdminSection::Content {
            self.content_selection
                .set_total(content_rows(self.portal.catalog()).len());
        }
    }

    /// The text buffer behind the focused form field, if it is a text field
    fn focused_text_field(&mut self) -> Option<&mut String> {
        match (self.admin_section, self.admin_field) {
            (AdminSection::SubjectForm, 0) => Some(&mut self.portal.subject_form.name),
            (AdminSection::SubjectForm, 1) => Some(&mut self.portal.subject_form.icon),
            (AdminSection::ExerciseForm, 0) => Some(&mut self.portal.exercise_form.title),
            (AdminSection::ExerciseForm, 1) => Some(&mut self.portal.exercise_form.description),
            (AdminSection::ExerciseForm, 2) => Some(&mut self.portal.exercise_form.url),
            _ => None,
        }
    }

    /// Cycle a choice field (color, subject, difficulty, points)
    fn cycle_field(&mut self, forward: bool) {
        match (self.admin_section, self.admin_field) {
            (AdminSection::SubjectForm, 2) => {
                let tokens: Vec<&str> = COLOR_OPTIONS.iter().map(|(token, _)| *token).collect();
                let current = color_family(&self.portal.subject_form.color);
                let next = cycle_index(&tokens, |t| color_family(t) == current, forward);
                if let Some(token) = next.and_then(|i| tokens.get(i)) {
                    self.portal.subject_form.color = token.to_string();
                }
            }
            (AdminSection::ExerciseForm, 3) => {
                let names: Vec<String> = self
                    .portal
                    .catalog()
                    .subjects()
                    .iter()
                    .map(|s| s.name.clone())
                    .collect();
                let current = self.portal.exercise_form.subject.clone();
                let next = cycle_index(&names, |n| *n == current, forward);
                if let Some(name) = next.and_then(|i| names.get(i)) {
                    self.portal.exercise_form.subject = name.clone();
                }
            }
            (AdminSection::ExerciseForm, 4) => {
                let difficulty = &mut self.portal.exercise_form.difficulty;
                *difficulty = if forward {
                    difficulty.next()
                } else {
                    difficulty.next().next()
                };
            }
            (AdminSection::ExerciseForm, 5) => {
                let points = &mut self.portal.exercise_form.points;
                *points = if forward {
                    (*points + 5).min(MAX_POINTS)
                } else {
                    points.saturating_sub(5)
                };
            }
            _ => {}
        }
    }

    fn submit_subject_form(&mut self) {
        match self.portal.submit_subject_form() {
            Ok(name) => {
                self.status_message = Some(format!("Subject '{}' added", name));
                self.subject_selection
                    .set_total(self.portal.catalog().subjects().len());
                if self.portal.exercise_form.subject.is_empty() {
                    self.portal.exercise_form.subject = name;
                }
                self.admin_field = 0;
            }
            Err(e) => self.show_error("Could not add subject", e),
        }
    }

    fn submit_exercise_form(&mut self) {
        match self.portal.submit_exercise_form() {
            Ok(id) => {
                let title = self
                    .portal
                    .catalog()
                    .exercise(&id)
                    .map(|e| e.title.clone())
                    .unwrap_or_default();
                self.status_message = Some(format!("Exercise '{}' added", title));
                self.admin_field = 0;
            }
            Err(e) => self.show_error("Could not add exercise", e),
        }
    }

    fn request_delete(&mut self) {
        let rows = content_rows(self.portal.catalog());
        let target = match rows.get(self.content_selection.selected) {
            Some(ContentRow::Subject(name)) => DeleteTarget::Subject(name.clone()),
            Some(ContentRow::Exercise(id)) => {
                let title = self
                    .portal
                    .catalog()
                    .exercise(id)
                    .map(|e| e.title.clone())
                    .unwrap_or_default();
                DeleteTarget::Exercise {
                    id: id.clone(),
                    title,
                }
            }
            None => return,
        };
        self.confirm_delete = Some(target);
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let confirmed = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return,
        };
        let Some(target) = self.confirm_delete.take() else {
            return;
        };
        let confirmation = Confirmation::from_bool(confirmed);

        let result = match &target {
            DeleteTarget::Subject(name) => self
                .portal
                .remove_subject(name, confirmation)
                .map(|removed| format!("Removed '{}' and {} exercise(s)", name, removed.len())),
            DeleteTarget::Exercise { id, .. } => self
                .portal
                .remove_exercise(id, confirmation)
                .map(|removed| format!("Removed '{}'", removed.title)),
        };

        match result {
            Ok(message) => {
                self.status_message = Some(message);
                self.content_selection
                    .set_total(content_rows(self.portal.catalog()).len());
                self.subject_selection
                    .set_total(self.portal.catalog().subjects().len());
            }
            Err(EduQuestError::Cancelled) => {
                self.status_message = Some("Cancelled".to_string());
            }
            Err(e) => self.show_error("Could not delete", e),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_settings_key(&mut self, key: KeyEvent) {
        if self.settings_input_mode {
            match key.code {
                KeyCode::Esc => {
                    self.settings_input_mode = false;
                    self.settings_api_key_input.clear();
                    self.status_message = Some("Cancelled".to_string());
                }
                KeyCode::Enter => {
                    if !self.settings_api_key_input.is_empty() {
                        match CredentialStore::store(Secret::GeminiKey, &self.settings_api_key_input)
                        {
                            Ok(()) => {
                                self.gemini_configured = true;
                                self.tip_provider = tip_provider();
                                self.status_message = Some("Gemini API key saved".to_string());
                            }
                            Err(e) => {
                                self.status_message = Some(format!("Error saving key: {}", e));
                            }
                        }
                    }
                    self.settings_input_mode = false;
                    self.settings_api_key_input.clear();
                }
                KeyCode::Backspace => {
                    self.settings_api_key_input.pop();
                }
                KeyCode::Char(c) => {
                    if self.settings_api_key_input.len() < 100 {
                        self.settings_api_key_input.push(c);
                    }
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.settings_selection.next(),
            KeyCode::Char('k') | KeyCode::Up => self.settings_selection.previous(),
            KeyCode::Enter | KeyCode::Char(' ') => match self.settings_selection.selected {
                0 => {
                    self.settings_input_mode = true;
                    self.settings_api_key_input.clear();
                    self.status_message =
                        Some("Enter API key (hidden) then press Enter".to_string());
                }
                1 => self.cycle_gemini_model(),
                _ => {}
            },
            KeyCode::Right | KeyCode::Char('+') if self.settings_selection.selected == 2 => {
                self.adjust_tip_length(10)
            }
            KeyCode::Left | KeyCode::Char('-') if self.settings_selection.selected == 2 => {
                self.adjust_tip_length(-10)
            }
            _ => {}
        }
    }

    /// Cycle to the next Gemini model and save
    fn cycle_gemini_model(&mut self) {
        self.config.set_gemini_model(self.config.gemini_model.next());
        self.save_config(format!("Model: {}", self.config.gemini_model.display_name()));
    }

    fn adjust_tip_length(&mut self, delta: i64) {
        let wanted = (i64::from(self.config.tip_max_chars) + delta).clamp(0, i64::from(u32::MAX));
        match self.config.set_tip_max_chars(wanted as u32) {
            Ok(()) => {
                self.save_config(format!("Tips up to {} characters", self.config.tip_max_chars))
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    fn save_config(&mut self, success: String) {
        match self.config.save() {
            Ok(()) => {
                self.tip_provider = tip_provider();
                self.status_message = Some(success);
            }
            Err(e) => self.status_message = Some(format!("Error saving config: {}", e)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    /// Navigate to a new screen
    pub fn navigate_to(&mut self, screen: Screen) {
        self.navigation_stack.push(self.current_screen);
        self.current_screen = screen;
        self.status_message = None;

        if screen == Screen::Admin {
            self.focus_section(AdminSection::SubjectForm);
        }
    }

    pub fn go_back(&mut self) {
        if self.current_screen == Screen::Subject {
            self.portal.clear_selection();
        }

        if let Some(screen) = self.navigation_stack.pop() {
            self.current_screen = screen;
            self.status_message = None;
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    fn show_error(&mut self, title: &str, error: EduQuestError) {
        tracing::debug!(title, error = %error, "showing error popup");
        self.error_popup = Some(ErrorPopup {
            title: title.to_string(),
            message: error.to_string(),
        });
    }
}

/// Index of the item after (or before) the current one, wrapping around.
/// Starts at the first item when nothing matches.
fn cycle_index<T>(items: &[T], is_current: impl Fn(&T) -> bool, forward: bool) -> Option<usize> {
    if items.is_empty() {
        return None;
    }
    let len = items.len();
    Some(match items.iter().position(is_current) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;

    use crate::core::store::MemoryStore;

    struct EchoProvider;

    #[async_trait]
    impl TipProvider for EchoProvider {
        async fn tip(&self, subject: &str) -> Result<String> {
            Ok(format!("You can do {subject}!"))
        }
    }

    fn app() -> App<MemoryStore> {
        let portal = Portal::load(
            PortalStore::new(MemoryStore::new()),
            ElevationGate::with_password("teach"),
            Clock::fixed(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()),
        );
        App::new(portal, Arc::new(EchoProvider), Config::default())
    }

    fn press(app: &mut App<MemoryStore>, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn registered_app() -> App<MemoryStore> {
        let mut app = app();
        type_text(&mut app, "Ana");
        press(&mut app, KeyCode::Enter);
        app
    }

    #[test]
    fn test_register_screen_gates_everything() {
        let mut app = app();
        assert_eq!(app.current_screen, Screen::Register);

        type_text(&mut app, "A");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_screen, Screen::Register);
        assert!(app.status_message.is_some());

        type_text(&mut app, "na");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_screen, Screen::Subjects);
        assert_eq!(app.portal.user().unwrap().name, "Ana");
    }

    #[tokio::test]
    async fn test_open_subject_loads_tip_and_completes() {
        let mut app = registered_app();

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_screen, Screen::Subject);
        assert!(app.portal.tips().is_loading());

        let msg = app.async_rx.recv().await.unwrap();
        app.handle_async_message(msg);
        assert_eq!(app.portal.tips().text(), Some("You can do Math!"));

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.portal.user().unwrap().total_points, 10);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.portal.user().unwrap().total_points, 10);
        assert_eq!(app.status_message.as_deref(), Some("Already completed today"));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.current_screen, Screen::Subjects);
        assert!(app.portal.selected_subject().is_none());
    }

    #[tokio::test]
    async fn test_tip_for_previous_subject_is_dropped() {
        let mut app = registered_app();

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.portal.selected_subject().map(|s| s.name.as_str()),
            Some("Portuguese")
        );

        for _ in 0..2 {
            let msg = app.async_rx.recv().await.unwrap();
            app.handle_async_message(msg);
        }
        assert_eq!(app.portal.tips().text(), Some("You can do Portuguese!"));
    }

    #[test]
    fn test_teacher_login_and_add_subject() {
        let mut app = registered_app();

        press(&mut app, KeyCode::Char('a'));
        assert!(app.login_input.is_some());
        type_text(&mut app, "nope");
        press(&mut app, KeyCode::Enter);
        assert!(app.login_input.is_some());
        assert!(!app.portal.is_elevated());

        type_text(&mut app, "teach");
        press(&mut app, KeyCode::Enter);
        assert!(app.login_input.is_none());
        assert_eq!(app.current_screen, Screen::Admin);

        type_text(&mut app, "Art");
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "🎨");
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        let art = app.portal.catalog().subject("Art").unwrap();
        assert_eq!(art.icon, "🎨");
        assert_eq!(art.color, "bg-rose-500 text-rose-600");
        assert_eq!(app.subject_selection.total, 7);
    }

    #[test]
    fn test_delete_with_confirmation() {
        let mut app = registered_app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "teach");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.admin_section, AdminSection::Content);

        // First row is the Math subject
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(
            app.confirm_delete,
            Some(DeleteTarget::Subject("Math".to_string()))
        );
        press(&mut app, KeyCode::Char('n'));
        assert!(app.portal.catalog().subject("Math").is_some());
        assert_eq!(app.status_message.as_deref(), Some("Cancelled"));

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.portal.catalog().subject("Math").is_none());
        assert_eq!(app.portal.catalog().exercises().len(), 6);
        assert_eq!(app.subject_selection.total, 5);
    }

    #[test]
    fn test_content_rows_groups_exercises_under_subjects() {
        let app = registered_app();
        let rows = content_rows(app.portal.catalog());
        assert_eq!(rows.len(), 6 + 8);
        assert_eq!(rows[0], ContentRow::Subject("Math".to_string()));
        assert_eq!(rows[1], ContentRow::Exercise(ExerciseId::from("m1")));
    }

    #[test]
    fn test_cycle_index() {
        let items = ["a", "b", "c"];
        assert_eq!(cycle_index(&items, |i| *i == "c", true), Some(0));
        assert_eq!(cycle_index(&items, |i| *i == "a", false), Some(2));
        assert_eq!(cycle_index(&items, |i| *i == "z", true), Some(0));
        assert_eq!(cycle_index::<&str>(&[], |_| true, true), None);
    }
}
