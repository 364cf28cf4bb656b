use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Instant;

use crate::admin::AdminUserList;
use crate::api::{ApiError, DashboardApi, FailureKind, HttpApi};
use crate::config::AppConfig;
use crate::login::LoginForm;
use crate::profile::ProfileEditor;
use crate::session::gate::{GateState, SessionGate};
use crate::session::{Session, SessionStore};

/// Status messages clear after this many seconds
const STATUS_MESSAGE_SECONDS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Confirm,
    Alert,
    Help,
}

pub struct App {
    api: Arc<dyn DashboardApi>,
    pub gate: SessionGate,
    pub screen: Screen,
    pub popup: Popup,

    pub login: LoginForm,
    pub admin: AdminUserList,
    pub profile: ProfileEditor,

    // Alert popup text
    pub alert: Option<String>,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    pub api_url: String,
}

impl App {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let api = HttpApi::new(config.api_url.clone())?;
        let gate = SessionGate::new(SessionStore::default_location()?);

        let mut app = Self::with_parts(Arc::new(api), gate);
        app.api_url = config.api_url.clone();
        app.start().await?;
        Ok(app)
    }

    pub fn with_parts(api: Arc<dyn DashboardApi>, gate: SessionGate) -> Self {
        Self {
            api,
            gate,
            screen: Screen::Login,
            popup: Popup::None,
            login: LoginForm::default(),
            admin: AdminUserList::default(),
            profile: ProfileEditor::default(),
            alert: None,
            status_message: None,
            status_message_time: None,
            api_url: String::new(),
        }
    }

    /// Read the persisted session and pick the first screen
    pub async fn start(&mut self) -> Result<()> {
        if self.gate.enter() == GateState::Loading {
            let token = self.gate.token().map(str::to_string);
            self.api.set_token(token).await;
        }
        self.show_dashboard().await
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    fn show_alert(&mut self, msg: impl Into<String>) {
        self.alert = Some(msg.into());
        self.popup = Popup::Alert;
    }

    /// Whether keys are being typed into a form
    pub fn accepts_text(&self) -> bool {
        self.popup == Popup::None && matches!(self.screen, Screen::Login | Screen::Profile)
    }

    pub fn session(&self) -> Option<&Session> {
        self.gate.session()
    }

    /// Route the viewer by role. Admins get page 1 of the user list.
    async fn show_dashboard(&mut self) -> Result<()> {
        match self.gate.resolve() {
            GateState::Admin => {
                self.screen = Screen::Dashboard;
                self.admin = AdminUserList::default();
                self.load_admin_page(1).await?;
            }
            GateState::User => {
                self.screen = Screen::Dashboard;
            }
            GateState::Unauthenticated | GateState::Loading => {
                self.screen = Screen::Login;
            }
        }
        Ok(())
    }

    async fn load_admin_page(&mut self, page: u32) -> Result<()> {
        if let Err(e) = self.admin.fetch(self.api.as_ref(), page).await {
            self.handle_api_error(e, "Failed to fetch users").await?;
        }
        Ok(())
    }

    /// Authentication failures log out, validation failures go to the status
    /// line, anything else becomes an alert
    async fn handle_api_error(&mut self, err: ApiError, context: &str) -> Result<()> {
        match err.kind() {
            FailureKind::Authentication => self.force_logout().await?,
            FailureKind::Validation => self.set_status(format!("{}: {}", context, err)),
            FailureKind::Unknown => {
                tracing::error!("{}: {}", context, err);
                self.show_alert(format!("{}\n{}", context, err));
            }
        }
        Ok(())
    }

    async fn force_logout(&mut self) -> Result<()> {
        self.gate.unauthorized()?;
        self.reset_to_login().await;
        self.login.notice = Some("Session expired, please log in again".to_string());
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.gate.logout()?;
        self.reset_to_login().await;
        self.set_status("Logged out");
        Ok(())
    }

    async fn reset_to_login(&mut self) {
        self.api.set_token(None).await;
        self.login = LoginForm::default();
        self.admin = AdminUserList::default();
        self.profile = ProfileEditor::default();
        self.screen = Screen::Login;
        self.popup = Popup::None;
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key).await;
        }

        match self.screen {
            Screen::Login => self.handle_login_key(key).await,
            Screen::Dashboard => self.handle_dashboard_key(key).await,
            Screen::Profile => self.handle_profile_key(key).await,
        }
    }

    async fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')) {
                    self.popup = Popup::None;
                }
            }
            Popup::Alert => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
                    self.alert = None;
                    self.popup = Popup::None;
                }
            }
            Popup::Confirm => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.popup = Popup::None;
                    self.confirm_toggle().await?;
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.admin.cancel_toggle();
                    self.popup = Popup::None;
                }
                _ => {}
            },
            Popup::None => {}
        }
        Ok(())
    }

    async fn handle_login_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.login.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.login.focus_prev(),
            KeyCode::F(2) => self.login.toggle_mode(),
            KeyCode::Backspace => self.login.backspace(),
            KeyCode::Enter => self.submit_login().await?,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.login.push_char(c)
            }
            _ => {}
        }
        Ok(())
    }

    async fn submit_login(&mut self) -> Result<()> {
        match self.login.submit(self.api.as_ref()).await {
            Ok(Some(auth)) => {
                let session = Session::from_login(auth.token, &auth.user);
                self.api.set_token(Some(session.token.clone())).await;
                self.gate.login(session)?;
                self.login = LoginForm::default();
                self.show_dashboard().await?;
            }
            Ok(None) => {}
            // Rejections are already shown in the form
            Err(e) if e.kind() == FailureKind::Validation => {}
            Err(e) => self.handle_api_error(e, "Login failed").await?,
        }
        Ok(())
    }

    async fn handle_dashboard_key(&mut self, key: KeyEvent) -> Result<()> {
        let is_admin = self.gate.state() == GateState::Admin;

        match key.code {
            KeyCode::Char('p') => self.open_profile().await?,
            KeyCode::Char('o') => self.logout().await?,
            KeyCode::Char('?') => self.popup = Popup::Help,

            KeyCode::Char('j') | KeyCode::Down if is_admin => self.admin.move_down(),
            KeyCode::Char('k') | KeyCode::Up if is_admin => self.admin.move_up(),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp if is_admin => {
                if let Err(e) = self.admin.prev_page(self.api.as_ref()).await {
                    self.handle_api_error(e, "Failed to fetch users").await?;
                }
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown if is_admin => {
                if let Err(e) = self.admin.next_page(self.api.as_ref()).await {
                    self.handle_api_error(e, "Failed to fetch users").await?;
                }
            }
            KeyCode::Char('r') if is_admin => {
                let page = self.admin.page;
                self.load_admin_page(page).await?;
            }
            KeyCode::Char(' ') | KeyCode::Enter if is_admin => self.request_toggle(),
            _ => {}
        }
        Ok(())
    }

    fn request_toggle(&mut self) {
        let Some(self_id) = self.session().map(|s| s.id) else {
            return;
        };
        if self.admin.selected_user().is_none() {
            return;
        }
        if self.admin.request_toggle(self_id).is_some() {
            self.popup = Popup::Confirm;
        } else {
            self.set_status("You cannot change your own status");
        }
    }

    async fn confirm_toggle(&mut self) -> Result<()> {
        match self.admin.confirm_toggle(self.api.as_ref()).await {
            Ok(Some(status)) => self.set_status(format!("Status changed to {}", status.label())),
            Ok(None) => {}
            Err(e) if e.kind() == FailureKind::Authentication => self.force_logout().await?,
            Err(e) => {
                tracing::error!("Status update failed: {}", e);
                self.show_alert("Failed to update status");
            }
        }
        Ok(())
    }

    async fn open_profile(&mut self) -> Result<()> {
        self.profile = ProfileEditor::default();
        self.screen = Screen::Profile;
        if let Err(e) = self.profile.load(self.api.as_ref()).await {
            // Nothing to edit without the profile
            self.screen = Screen::Dashboard;
            self.handle_api_error(e, "Failed to load profile").await?;
        }
        Ok(())
    }

    async fn handle_profile_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.screen = Screen::Dashboard,
            KeyCode::Tab | KeyCode::Down => self.profile.focus = self.profile.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.profile.focus = self.profile.focus.prev(),
            KeyCode::Backspace => self.profile.backspace(),
            KeyCode::Enter => self.save_profile().await?,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.profile.push_char(c)
            }
            _ => {}
        }
        Ok(())
    }

    async fn save_profile(&mut self) -> Result<()> {
        match self.profile.submit(self.api.as_ref()).await {
            Ok(Some(user)) => {
                self.gate.update_identity(&user.full_name, &user.email)?;
                // Keep our own row in the cached admin page in step too
                if let Some(row) = self.admin.users.iter_mut().find(|u| u.id == user.id) {
                    row.full_name = user.full_name.clone();
                    row.email = user.email.clone();
                }
            }
            Ok(None) => {}
            Err(e) if e.kind() == FailureKind::Validation => {}
            Err(e) => self.handle_api_error(e, "Update failed").await?,
        }
        Ok(())
    }

    pub async fn tick(&mut self) -> Result<()> {
        // Clear status message after 3 seconds
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_SECONDS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
        Ok(())
    }
}
