mod components;

use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::api::models::{ManagedUser, UserStatus};
use crate::app::{App, Popup, Screen};
use crate::config::ThemeConfig;
use crate::login::{LoginField, LoginMode};
use crate::profile::ProfileField;
use crate::session::gate::GateState;
use crate::session::Role;
use crate::theme::Theme;
use components::{centered_box, centered_rect, form_message, input_field, key_hint};

static THEME: OnceLock<Theme> = OnceLock::new();

/// Apply configured colors. Only the first call has any effect.
pub fn init_theme(config: &ThemeConfig) {
    let _ = THEME.set(Theme::from_config(config));
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),               // Info line
            Constraint::Min(8),                  // Screen body
            Constraint::Length(1),               // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    match app.screen {
        Screen::Login => draw_login(f, app, chunks[1]),
        Screen::Dashboard => draw_dashboard(f, app, chunks[1]),
        Screen::Profile => draw_profile(f, app, chunks[1]),
    }
    draw_footer(f, app, chunks[2]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::Help => draw_help_popup(f),
        Popup::Confirm => draw_confirm_popup(f, app),
        Popup::Alert => draw_alert_popup(f, app),
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: status message > signed-in identity > server
    let line = if let Some(ref status) = app.status_message {
        Line::from(vec![
            Span::styled(status, Style::default().fg(warning())),
        ])
    } else if let Some(session) = app.session() {
        Line::from(vec![
            Span::styled(&session.full_name, Style::default().fg(text())),
            Span::styled(" │ ", Style::default().fg(text_dim())),
            Span::styled(&session.email, Style::default().fg(text_dim())),
            Span::styled(" │ ", Style::default().fg(text_dim())),
            role_badge(session.role),
        ])
    } else if !app.api_url.is_empty() {
        Line::from(vec![
            Span::styled(format!("Not signed in │ {}", app.api_url), Style::default().fg(text_dim())),
        ])
    } else {
        Line::from(vec![
            Span::styled("Not signed in", Style::default().fg(text_dim())),
        ])
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn role_badge(role: Role) -> Span<'static> {
    match role {
        Role::Admin => Span::styled(
            " Admin Access ",
            Style::default().fg(Color::Black).bg(accent()).add_modifier(Modifier::BOLD),
        ),
        Role::User => Span::styled(role.label(), Style::default().fg(header())),
    }
}

fn status_badge(status: UserStatus) -> Span<'static> {
    let color = match status {
        UserStatus::Active => success(),
        UserStatus::Inactive => danger(),
    };
    Span::styled(status.label(), Style::default().fg(color).add_modifier(Modifier::BOLD))
}

fn last_login(user: &ManagedUser) -> String {
    match user.last_login {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => "Never".to_string(),
    }
}

fn draw_login(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.login;
    let fields = form.fields();
    let height = 4 + fields.len() as u16 * 3 + 2;
    let box_area = centered_box(60, height, area);

    let title = match form.mode {
        LoginMode::SignIn => " Sign in ",
        LoginMode::SignUp => " Create account ",
    };
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(accent()).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));
    let inner = block.inner(box_area);
    f.render_widget(Clear, box_area);
    f.render_widget(block, box_area);

    let mut constraints = vec![Constraint::Length(1)];
    constraints.extend(fields.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    if let Some(ref notice) = form.notice {
        f.render_widget(
            Paragraph::new(Span::styled(notice, Style::default().fg(warning()))).alignment(Alignment::Center),
            rows[0],
        );
    }

    for (i, field) in fields.iter().enumerate() {
        let (label, value, masked) = match field {
            LoginField::FullName => ("Full name", form.full_name.as_str(), false),
            LoginField::Email => ("Email", form.email.as_str(), false),
            LoginField::Password => ("Password", form.password.as_str(), true),
        };
        f.render_widget(input_field(label, value, form.focus == *field, masked), rows[i + 1]);
    }

    let after = fields.len() + 1;
    if let Some(ref error) = form.error {
        f.render_widget(
            Paragraph::new(Span::styled(error, Style::default().fg(danger()))).alignment(Alignment::Center),
            rows[after],
        );
    }

    let switch_hint = match form.mode {
        LoginMode::SignIn => "create an account",
        LoginMode::SignUp => "back to sign in",
    };
    let mut hint = key_hint("Enter", "submit");
    hint.extend(key_hint("F2", switch_hint));
    f.render_widget(
        Paragraph::new(Line::from(hint)).alignment(Alignment::Center),
        rows[after + 1],
    );
}

fn draw_dashboard(f: &mut Frame, app: &App, area: Rect) {
    if app.gate.state() == GateState::Admin {
        draw_user_table(f, app, area);
    } else {
        draw_welcome(f, app, area);
    }
}

fn draw_welcome(f: &mut Frame, app: &App, area: Rect) {
    let card = centered_box(56, 9, area);
    f.render_widget(Clear, card);

    let lines = match app.session() {
        Some(session) => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Welcome, {}", session.full_name),
                Style::default().fg(text()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(&session.email, Style::default().fg(text_dim()))),
            Line::from(vec![
                Span::styled("Role: ", Style::default().fg(text_dim())),
                role_badge(session.role),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(text_dim())),
                Span::styled("p", Style::default().fg(accent())),
                Span::styled(" to edit your profile", Style::default().fg(text_dim())),
            ]),
        ],
        None => vec![Line::from(Span::styled("Loading...", Style::default().fg(text_dim())))],
    };

    let welcome = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(Span::styled(" Dashboard ", Style::default().fg(accent()).add_modifier(Modifier::BOLD)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        );
    f.render_widget(welcome, card);
}

fn draw_user_table(f: &mut Frame, app: &App, area: Rect) {
    let list = &app.admin;
    let self_id = app.session().map(|s| s.id);

    let block = Block::default()
        .title(Span::styled(
            format!(" Users ({}) ", list.total),
            Style::default().fg(accent()).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(page_indicator(list.page, list.total_pages, list.has_prev(), list.has_next())).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));

    // Responsive columns based on width
    let show_login = area.width > 90;

    let mut titles = vec!["Name", "Email", "Role", "Status"];
    if show_login {
        titles.push("Last login");
    }
    titles.push("Action");
    let header = Row::new(
        titles
            .into_iter()
            .map(|t| Span::styled(t, Style::default().fg(header())))
            .collect::<Vec<_>>(),
    );

    let rows: Vec<Row> = if list.loading && list.users.is_empty() {
        vec![Row::new(vec![
            Span::styled("  Loading...", Style::default().fg(text_dim())),
        ])]
    } else if list.users.is_empty() {
        vec![Row::new(vec![
            Span::styled("  No users", Style::default().fg(text_dim())),
        ])]
    } else {
        list.users
            .iter()
            .enumerate()
            .map(|(i, user)| {
                let action = if Some(user.id) == self_id {
                    Span::styled("(you)", Style::default().fg(text_dim()))
                } else {
                    Span::styled(user.status.action_label(), Style::default().fg(accent()))
                };

                let row_style = if i == list.selected {
                    Style::default().bg(bg_selected()).fg(text())
                } else {
                    Style::default()
                };

                let mut cells = vec![
                    Span::styled(&user.full_name, Style::default().fg(text())),
                    Span::styled(&user.email, Style::default().fg(text_dim())),
                    Span::styled(user.role.label(), Style::default().fg(text_dim())),
                    status_badge(user.status),
                ];
                if show_login {
                    cells.push(Span::styled(last_login(user), Style::default().fg(text_dim())));
                }
                cells.push(action);

                Row::new(cells).style(row_style)
            })
            .collect()
    };

    let widths = if show_login {
        vec![
            Constraint::Percentage(20),
            Constraint::Percentage(28),
            Constraint::Percentage(8),
            Constraint::Percentage(10),
            Constraint::Percentage(20),
            Constraint::Percentage(14),
        ]
    } else {
        vec![
            Constraint::Percentage(25),
            Constraint::Percentage(35),
            Constraint::Percentage(10),
            Constraint::Percentage(12),
            Constraint::Percentage(18),
        ]
    };

    let table = Table::new(rows, widths)
        .header(header.style(Style::default()))
        .block(block);

    f.render_widget(table, area);
}

fn page_indicator(page: u32, total_pages: u32, has_prev: bool, has_next: bool) -> Vec<Span<'static>> {
    let arrow = |enabled: bool, s: &'static str| {
        Span::styled(s, Style::default().fg(if enabled { accent() } else { inactive() }))
    };
    vec![
        arrow(has_prev, " ◀ "),
        Span::styled(format!("Page {} of {}", page, total_pages), Style::default().fg(text())),
        arrow(has_next, " ▶ "),
    ]
}

fn draw_profile(f: &mut Frame, app: &App, area: Rect) {
    let editor = &app.profile;
    let box_area = centered_box(60, 16, area);

    let block = Block::default()
        .title(Span::styled(" Profile ", Style::default().fg(accent()).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));
    let inner = block.inner(box_area);
    f.render_widget(Clear, box_area);
    f.render_widget(block, box_area);

    if !editor.loaded {
        f.render_widget(
            Paragraph::new(Span::styled("Loading...", Style::default().fg(text_dim()))).alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(
        input_field("Full name", &editor.full_name, editor.focus == ProfileField::FullName, false),
        rows[0],
    );
    f.render_widget(
        input_field("Email", &editor.email, editor.focus == ProfileField::Email, false),
        rows[1],
    );
    f.render_widget(
        input_field("New password (optional)", &editor.password, editor.focus == ProfileField::Password, true),
        rows[2],
    );

    if let Some(ref message) = editor.message {
        f.render_widget(Paragraph::new(form_message(message)).alignment(Alignment::Center), rows[3]);
    }

    let mut hint = key_hint("Enter", "save");
    hint.extend(key_hint("Esc", "back"));
    f.render_widget(Paragraph::new(Line::from(hint)).alignment(Alignment::Center), rows[4]);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();

    match app.screen {
        Screen::Login => {
            spans.extend(key_hint("Tab", "next field"));
            spans.extend(key_hint("F2", "sign in/up"));
            spans.extend(key_hint("Ctrl+C", "quit"));
        }
        Screen::Profile => {
            spans.extend(key_hint("Tab", "next field"));
            spans.extend(key_hint("Enter", "save"));
            spans.extend(key_hint("Esc", "back"));
        }
        Screen::Dashboard => {
            if app.gate.state() == GateState::Admin {
                spans.extend(key_hint("j/k", "select"));
                spans.extend(key_hint("←/→", "page"));
                spans.extend(key_hint("Space", "toggle"));
                spans.extend(key_hint("r", "refresh"));
            }
            spans.extend(key_hint("p", "profile"));
            spans.extend(key_hint("o", "logout"));
            spans.extend(key_hint("?", "help"));
            spans.extend(key_hint("q", "quit"));
        }
    }

    let footer = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(header()).add_modifier(Modifier::BOLD)))
    };
    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), Style::default().fg(accent())),
            Span::raw(desc),
        ])
    };

    let help_text = vec![
        section("═══ Users (admin) ═══"),
        key("↑/↓ j/k", "Move selection"),
        key("←/→ h/l", "Previous/next page"),
        key("Space", "Activate/deactivate selected user"),
        key("r", "Reload current page"),
        Line::from(""),
        section("═══ Account ═══"),
        key("p", "Edit your profile"),
        key("o", "Log out"),
        Line::from(""),
        section("═══ Forms ═══"),
        key("Tab", "Next field"),
        key("Enter", "Submit"),
        key("F2", "Switch between sign in and sign up"),
        key("Esc", "Leave the profile editor"),
        Line::from(""),
        section("═══ Quick Start ═══"),
        key("admindash", "Launch this TUI"),
        key("--status", "Print session as JSON"),
        key("--logout", "Forget the saved session"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" admindash Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn draw_confirm_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_box(50, 7, f.area());

    f.render_widget(Clear, popup_area);

    let message = app
        .admin
        .pending
        .as_ref()
        .map(|p| p.prompt())
        .unwrap_or_else(|| "Confirm?".to_string());

    let confirm = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(warning()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y", Style::default().fg(success()).add_modifier(Modifier::BOLD)),
            Span::raw(" Yes   "),
            Span::styled("n", Style::default().fg(danger()).add_modifier(Modifier::BOLD)),
            Span::raw(" No"),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Confirm ", Style::default().fg(warning())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(warning())),
    )
    .alignment(Alignment::Center);

    f.render_widget(confirm, popup_area);
}

fn draw_alert_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_box(56, 8, f.area());

    f.render_widget(Clear, popup_area);

    let mut lines = vec![Line::from("")];
    lines.extend(
        app.alert
            .as_deref()
            .unwrap_or("Something went wrong")
            .lines()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(text())))),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(key_hint("Enter", "dismiss")));

    let alert = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(" Error ", Style::default().fg(danger())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(danger())),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(alert, popup_area);
}
