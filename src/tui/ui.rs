//! Main UI renderer

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap};

use crate::ai::TipStatus;
use crate::core::model::COLOR_OPTIONS;
use crate::core::store::KeyValueStore;
use crate::tui::app::{content_rows, AdminSection, App, ContentRow, DeleteTarget, Screen};
use crate::tui::theme::Theme;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the whole frame
pub fn render<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_content(frame, chunks[1], app);
    render_status_bar(frame, chunks[2], app);

    if app.login_input.is_some() {
        render_login_popup(frame, app);
    }
    if let Some(target) = &app.confirm_delete {
        render_confirm_popup(frame, target);
    }
    if app.error_popup.is_some() {
        render_error_popup(frame, app);
    }
    if app.show_help {
        render_help_overlay(frame, app);
    }
}

fn render_header<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let screen_name = match app.current_screen {
        Screen::Register => "Welcome".to_string(),
        Screen::Subjects => "Subjects".to_string(),
        Screen::Subject => app
            .portal
            .selected_subject()
            .map(|s| format!("{} {}", s.icon, s.name))
            .unwrap_or_default(),
        Screen::Admin => "Teacher Panel".to_string(),
        Screen::Settings => "Settings".to_string(),
    };

    let mut spans = vec![Span::styled(
        format!(" 🎓 EduQuest │ {} ", screen_name),
        Theme::header(),
    )];
    if app.portal.is_elevated() {
        spans.push(Span::styled(
            " TEACHER ",
            Style::default().bg(Theme::TEACHER).fg(Color::Black),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn render_content<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    match app.current_screen {
        Screen::Register => render_register(frame, area, app),
        Screen::Subjects => render_subjects(frame, area, app),
        Screen::Subject => render_subject(frame, area, app),
        Screen::Admin => render_admin(frame, area, app),
        Screen::Settings => render_settings(frame, area, app),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Learner screens
// ─────────────────────────────────────────────────────────────────────────────

fn render_register<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let popup = centered_rect(50, 11, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Turn studying into a game!",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "  Complete exercises, earn points, beat your daily goal.",
            Theme::muted(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Your name: ", Theme::label()),
            Span::styled("[", Style::default().fg(Theme::REWARD)),
            Span::raw(app.register_input.clone()),
            Span::styled("█", Style::default().fg(Theme::REWARD)),
            Span::styled("]", Style::default().fg(Theme::REWARD)),
        ]),
        Line::from(""),
        Line::from(Span::styled("  [Enter] Start  [Esc] Quit", Theme::muted())),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Welcome to EduQuest ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Theme::PRIMARY)),
    );
    frame.render_widget(paragraph, popup);
}

fn render_subjects<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    render_daily_challenge(frame, chunks[0], app);

    let catalog = app.portal.catalog();
    let items: Vec<ListItem> = catalog
        .subjects()
        .iter()
        .enumerate()
        .map(|(i, subject)| {
            let count = catalog.exercise_count(&subject.name);
            let line = Line::from(vec![
                Span::raw(format!("  {} ", subject.icon)),
                Span::styled(
                    format!("{:<20}", subject.name),
                    Style::default()
                        .fg(Theme::subject(&subject.color))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{} exercises", count), Theme::muted()),
            ]);
            let item = ListItem::new(line);
            if i == app.subject_selection.selected {
                item.style(Theme::selected())
            } else {
                item
            }
        })
        .collect();

    let list = if items.is_empty() {
        List::new(vec![ListItem::new("  No subjects yet")])
    } else {
        List::new(items)
    };
    frame.render_widget(
        list.block(Block::default().title(" Subjects ").borders(Borders::ALL)),
        chunks[1],
    );

    let help = if app.portal.is_elevated() {
        " [Enter] Open  [a] Teacher panel  [x] Leave teacher mode  [s] Settings  [q] Quit"
    } else {
        " [Enter] Open  [a] Teacher mode  [s] Settings  [q] Quit"
    };
    frame.render_widget(Paragraph::new(help).style(Theme::muted()), chunks[2]);
}

fn render_daily_challenge<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let Some(user) = app.portal.user() else {
        return;
    };
    let progress = app.portal.progress();
    let percent = progress.progress_percent();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(3)])
        .split(area);

    let greeting = Line::from(vec![
        Span::styled(format!(" Hi, {}! ", user.name), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("⭐ {} points", user.total_points),
            Style::default().fg(Theme::REWARD),
        ),
    ]);
    frame.render_widget(Paragraph::new(greeting), chunks[0]);

    let label = if progress.remaining_today() == 0 {
        format!("{}/{} 🏆 Goal reached!", progress.completed_count(), user.daily_goal)
    } else {
        format!("{}/{} completed today", progress.completed_count(), user.daily_goal)
    };
    let gauge = Gauge::default()
        .block(Block::default().title(" Daily Challenge ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Theme::SUCCESS).bg(Color::Black))
        .percent(u16::from(percent))
        .label(label);
    frame.render_widget(gauge, chunks[1]);
}

fn render_subject<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let accent = app
        .portal
        .selected_subject()
        .map(|s| Theme::subject(&s.color))
        .unwrap_or(Theme::PRIMARY);

    let tip = match app.portal.tips().status() {
        TipStatus::Loading => Line::from(Span::styled(
            format!(
                " {} Thinking of a tip...",
                SPINNER[(app.tick_counter as usize) % SPINNER.len()]
            ),
            Theme::muted(),
        )),
        TipStatus::Ready(text) => Line::from(format!(" 💡 {}", text)),
        TipStatus::Idle => Line::from(""),
    };
    let tip_panel = Paragraph::new(tip).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(" Study Tip ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent)),
    );
    frame.render_widget(tip_panel, chunks[0]);

    let exercises = app.portal.visible_exercises();
    let items: Vec<ListItem> = if exercises.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "  No exercises here yet",
            Theme::muted(),
        )))]
    } else {
        exercises
            .iter()
            .enumerate()
            .map(|(i, exercise)| {
                let done = app.portal.progress().is_completed(&exercise.id);
                let mark = if done {
                    Span::styled("  ✓ ", Style::default().fg(Theme::SUCCESS))
                } else {
                    Span::raw("  ○ ")
                };
                let title_style = if done {
                    Theme::muted().add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };

                let mut lines = vec![Line::from(vec![
                    mark,
                    Span::styled(exercise.title.clone(), title_style),
                    Span::raw("  "),
                    Span::styled(
                        exercise.difficulty.label(),
                        Style::default().fg(Theme::difficulty(exercise.difficulty)),
                    ),
                    Span::styled(
                        format!("  +{} pts", exercise.points),
                        Style::default().fg(Theme::REWARD),
                    ),
                ])];
                if !exercise.description.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("    {}", exercise.description),
                        Theme::muted(),
                    )));
                }

                let item = ListItem::new(lines);
                if i == app.exercise_selection.selected {
                    item.style(Style::default().bg(Color::DarkGray))
                } else {
                    item
                }
            })
            .collect()
    };

    frame.render_widget(
        List::new(items).block(Block::default().title(" Exercises ").borders(Borders::ALL)),
        chunks[1],
    );

    let help = " [Enter] Open link  [c] Mark completed  [r] New tip  [Esc] Back";
    frame.render_widget(Paragraph::new(help).style(Theme::muted()), chunks[2]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Teacher panel
// ─────────────────────────────────────────────────────────────────────────────

fn render_admin<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(outer[0]);
    let forms = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(8)])
        .split(columns[0]);

    let subject_form = &app.portal.subject_form;
    let color_label = COLOR_OPTIONS
        .iter()
        .find(|(token, _)| *token == subject_form.color)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| subject_form.color.clone());
    let focus = |section: AdminSection, field: usize| {
        app.admin_section == section && app.admin_field == field
    };

    let subject_lines = vec![
        form_line("Name", &subject_form.name, focus(AdminSection::SubjectForm, 0), false),
        form_line("Icon", &subject_form.icon, focus(AdminSection::SubjectForm, 1), false),
        form_line("Color", &color_label, focus(AdminSection::SubjectForm, 2), true),
    ];
    frame.render_widget(
        Paragraph::new(subject_lines).block(section_block(
            " New Subject ",
            app.admin_section == AdminSection::SubjectForm,
        )),
        forms[0],
    );

    let exercise_form = &app.portal.exercise_form;
    let subject_label = if exercise_form.subject.is_empty() {
        "(choose with ←/→)".to_string()
    } else {
        exercise_form.subject.clone()
    };
    let exercise_lines = vec![
        form_line("Title", &exercise_form.title, focus(AdminSection::ExerciseForm, 0), false),
        form_line(
            "Description",
            &exercise_form.description,
            focus(AdminSection::ExerciseForm, 1),
            false,
        ),
        form_line("Link", &exercise_form.url, focus(AdminSection::ExerciseForm, 2), false),
        form_line("Subject", &subject_label, focus(AdminSection::ExerciseForm, 3), true),
        form_line(
            "Difficulty",
            exercise_form.difficulty.label(),
            focus(AdminSection::ExerciseForm, 4),
            true,
        ),
        form_line(
            "Points",
            &exercise_form.points.to_string(),
            focus(AdminSection::ExerciseForm, 5),
            true,
        ),
    ];
    frame.render_widget(
        Paragraph::new(exercise_lines).block(section_block(
            " New Exercise ",
            app.admin_section == AdminSection::ExerciseForm,
        )),
        forms[1],
    );

    render_content_list(frame, columns[1], app);

    let help = match app.admin_section {
        AdminSection::Content => " [Tab] Next section  [j/k] Move  [d] Delete  [Esc] Back",
        _ => " [Tab] Next section  [↑/↓] Field  [←/→] Choose  [Enter] Save  [Esc] Back",
    };
    frame.render_widget(Paragraph::new(help).style(Theme::muted()), outer[1]);
}

fn render_content_list<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let catalog = app.portal.catalog();
    let focused = app.admin_section == AdminSection::Content;

    let items: Vec<ListItem> = content_rows(catalog)
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let line = match row {
                ContentRow::Subject(name) => {
                    let subject = catalog.subject(name);
                    let icon = subject.map(|s| s.icon.as_str()).unwrap_or("");
                    let color = subject
                        .map(|s| Theme::subject(&s.color))
                        .unwrap_or(Theme::PRIMARY);
                    Line::from(Span::styled(
                        format!(" {} {}", icon, name),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ))
                }
                ContentRow::Exercise(id) => {
                    let (title, points) = catalog
                        .exercise(id)
                        .map(|e| (e.title.as_str(), e.points))
                        .unwrap_or(("?", 0));
                    Line::from(vec![
                        Span::raw(format!("    • {}", title)),
                        Span::styled(format!("  +{}", points), Theme::muted()),
                    ])
                }
            };
            let item = ListItem::new(line);
            if focused && i == app.content_selection.selected {
                item.style(Theme::selected())
            } else {
                item
            }
        })
        .collect();

    frame.render_widget(
        List::new(items).block(section_block(" Content ", focused)),
        area,
    );
}

fn form_line(label: &str, value: &str, focused: bool, choice: bool) -> Line<'static> {
    let marker = if focused { " ▶ " } else { "   " };
    let mut spans = vec![
        Span::raw(marker),
        Span::styled(format!("{:<12}", label), Theme::label()),
    ];
    if choice {
        spans.push(Span::styled(
            format!("‹ {} ›", value),
            Style::default().fg(if focused { Theme::REWARD } else { Color::White }),
        ));
    } else {
        spans.push(Span::raw(value.to_string()));
        if focused {
            spans.push(Span::styled("█", Style::default().fg(Theme::REWARD)));
        }
    }
    Line::from(spans)
}

fn section_block(title: &str, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Theme::TEACHER)
    } else {
        Theme::normal()
    };
    Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(border)
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

fn render_settings<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let sel = app.settings_selection.selected;
    let marker = |row: usize| if sel == row { " ▶ " } else { "   " };

    let gemini_line = if app.settings_input_mode {
        Line::from(vec![
            Span::raw(" ▶ "),
            Span::styled("Gemini API:  ", Theme::label()),
            Span::styled("[", Style::default().fg(Theme::REWARD)),
            Span::raw("•".repeat(app.settings_api_key_input.chars().count())),
            Span::styled("█]", Style::default().fg(Theme::REWARD)),
        ])
    } else {
        let (text, color) = if app.gemini_configured {
            ("Configured ✓", Theme::SUCCESS)
        } else {
            ("Not configured (tips use a fallback)", Color::Yellow)
        };
        Line::from(vec![
            Span::raw(marker(0)),
            Span::styled("Gemini API:  ", Theme::label()),
            Span::styled(text, Style::default().fg(color)),
        ])
    };

    let model_line = Line::from(vec![
        Span::raw(marker(1)),
        Span::styled("AI Model:    ", Theme::label()),
        Span::raw(app.config.gemini_model.display_name()),
        Span::styled("  (Enter to cycle)", Theme::muted()),
    ]);

    let tip_line = Line::from(vec![
        Span::raw(marker(2)),
        Span::styled("Tip length:  ", Theme::label()),
        Span::raw(format!("{} characters", app.config.tip_max_chars)),
        Span::styled("  (←/→ to adjust)", Theme::muted()),
    ]);

    let teacher_status = if app.portal.gate().is_configured() {
        "Teacher password is set"
    } else {
        "No teacher password. Run: eduquest config set admin-password <PASSWORD>"
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Study Tips",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        gemini_line,
        model_line,
        tip_line,
        Line::from(""),
        Line::from(Span::styled(format!("  {}", teacher_status), Theme::muted())),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Settings ")
                .borders(Borders::ALL)
                .border_style(Theme::normal()),
        ),
        chunks[0],
    );

    let help_bar = if app.settings_input_mode {
        " [Enter] Save  [Esc] Cancel"
    } else {
        " [j/k] Navigate  [Enter] Edit  [Esc] Back"
    };
    frame.render_widget(Paragraph::new(help_bar).style(Theme::muted()), chunks[1]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Status bar and overlays
// ─────────────────────────────────────────────────────────────────────────────

fn render_status_bar<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let status_text = if let Some(msg) = &app.status_message {
        format!(" {}", msg)
    } else if let Some(user) = app.portal.user() {
        format!(" {} │ ⭐ {} pts │ ? for help ", user.name, user.total_points)
    } else {
        " ? for help ".to_string()
    };

    let status = Paragraph::new(status_text)
        .style(Theme::status_bar())
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, area);
}

fn render_login_popup<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let area = centered_rect(44, 7, frame.area());
    frame.render_widget(Clear, area);

    let masked = "•".repeat(app.login_input.as_ref().map_or(0, |s| s.chars().count()));
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Password: ", Theme::label()),
            Span::raw(masked),
            Span::styled("█", Style::default().fg(Theme::REWARD)),
        ]),
        Line::from(""),
        Line::from(Span::styled("  [Enter] Unlock  [Esc] Cancel", Theme::muted())),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Teacher Mode ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Theme::TEACHER)),
            )
            .style(Style::default().bg(Color::Black)),
        area,
    );
}

fn render_confirm_popup(frame: &mut Frame, target: &DeleteTarget) {
    let area = centered_rect(56, 7, frame.area());
    frame.render_widget(Clear, area);

    let question = match target {
        DeleteTarget::Subject(name) => {
            format!("  Delete '{}' and all of its exercises?", name)
        }
        DeleteTarget::Exercise { title, .. } => format!("  Delete '{}'?", title),
    };
    let lines = vec![
        Line::from(""),
        Line::from(question),
        Line::from(""),
        Line::from(Span::styled("  [y] Delete  [n] Keep", Theme::muted())),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(" Confirm ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Theme::ERROR)),
            )
            .style(Style::default().bg(Color::Black)),
        area,
    );
}

fn render_error_popup<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let Some(popup) = &app.error_popup else {
        return;
    };
    let area = centered_rect(60, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = vec![Line::from("")];
    lines.extend(popup.message.lines().map(|l| Line::from(format!("  {}", l))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  [Enter] Dismiss", Theme::muted())));

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(format!(" {} ", popup.title))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Theme::ERROR)),
            )
            .style(Style::default().bg(Color::Black)),
        area,
    );
}

fn render_help_overlay<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let area = frame.area();
    let popup_width = (area.width * 60 / 100).min(60);
    let popup_height = (area.height * 70 / 100).min(16);
    let popup_area = centered_rect(popup_width, popup_height, area);

    frame.render_widget(Clear, popup_area);

    let (title, help_lines) = get_help_content(app.current_screen);
    let text: Vec<Line> = help_lines
        .into_iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("  {:12}", key), Style::default().fg(Theme::PRIMARY)),
                Span::raw(desc),
            ])
        })
        .collect();

    let help = Paragraph::new(text)
        .block(
            Block::default()
                .title(format!(" {} ", title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().bg(Color::Black));
    frame.render_widget(help, popup_area);
}

/// Help content for the current screen
fn get_help_content(screen: Screen) -> (&'static str, Vec<(&'static str, &'static str)>) {
    match screen {
        Screen::Register => (
            "Help - Welcome",
            vec![("Enter", "Register and start"), ("Esc", "Quit")],
        ),
        Screen::Subjects => (
            "Help - Subjects",
            vec![
                ("j / ↓", "Move down"),
                ("k / ↑", "Move up"),
                ("Enter", "Open subject"),
                ("a", "Teacher mode"),
                ("x", "Leave teacher mode"),
                ("s", "Settings"),
                ("q", "Quit application"),
                ("?", "Show this help"),
            ],
        ),
        Screen::Subject => (
            "Help - Exercises",
            vec![
                ("j / ↓", "Move down"),
                ("k / ↑", "Move up"),
                ("Enter / o", "Open link in browser"),
                ("c", "Mark as completed"),
                ("r", "Get a new tip"),
                ("Esc", "Back to subjects"),
                ("?", "Show this help"),
            ],
        ),
        Screen::Admin => (
            "Help - Teacher Panel",
            vec![
                ("Tab", "Next section"),
                ("Shift+Tab", "Previous section"),
                ("↑ / ↓", "Move between fields"),
                ("← / →", "Change a choice"),
                ("Enter", "Save form"),
                ("d", "Delete (content list)"),
                ("Esc", "Back"),
            ],
        ),
        Screen::Settings => (
            "Help - Settings",
            vec![
                ("j / ↓", "Move down"),
                ("k / ↑", "Move up"),
                ("Enter", "Edit setting"),
                ("← / →", "Adjust tip length"),
                ("Esc", "Go back"),
                ("?", "Show this help"),
            ],
        ),
    }
}

/// A `width` x `height` rectangle centered in `area`, clipped to fit
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
