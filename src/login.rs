use crate::api::models::AuthResponse;
use crate::api::{ApiError, DashboardApi};

/// Same rule the server applies on signup
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    FullName,
    Email,
    Password,
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub mode: LoginMode,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    /// Shown above the form after a forced logout
    pub notice: Option<String>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            mode: LoginMode::SignIn,
            full_name: String::new(),
            email: String::new(),
            password: String::new(),
            focus: LoginField::Email,
            error: None,
            notice: None,
        }
    }
}

/// `something@something.something`
pub fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

impl LoginForm {
    pub fn fields(&self) -> &'static [LoginField] {
        match self.mode {
            LoginMode::SignIn => &[LoginField::Email, LoginField::Password],
            LoginMode::SignUp => &[LoginField::FullName, LoginField::Email, LoginField::Password],
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LoginMode::SignIn => LoginMode::SignUp,
            LoginMode::SignUp => LoginMode::SignIn,
        };
        self.focus = self.fields()[0];
        self.error = None;
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + 1) % fields.len()];
    }

    pub fn focus_prev(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[idx.checked_sub(1).unwrap_or(fields.len() - 1)];
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::FullName => &mut self.full_name,
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.field_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.field_mut().pop();
    }

    /// Client-side checks before anything is sent
    pub fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err("Email and password are required".to_string());
        }
        if self.mode == LoginMode::SignUp {
            if self.full_name.trim().is_empty() {
                return Err("Full name is required".to_string());
            }
            if !looks_like_email(self.email.trim()) {
                return Err("Invalid email".to_string());
            }
            if self.password.len() < MIN_PASSWORD_LEN {
                return Err(format!("Password min {} chars", MIN_PASSWORD_LEN));
            }
        }
        Ok(())
    }

    /// Sign in or sign up. `Ok(None)` means the form refused to send.
    pub async fn submit(
        &mut self,
        api: &dyn DashboardApi,
    ) -> Result<Option<AuthResponse>, ApiError> {
        self.error = None;
        if let Err(msg) = self.validate() {
            self.error = Some(msg);
            return Ok(None);
        }

        let email = self.email.trim().to_string();
        let result = match self.mode {
            LoginMode::SignIn => api.login(&email, &self.password).await,
            LoginMode::SignUp => api.signup(self.full_name.trim(), &email, &self.password).await,
        };

        match result {
            Ok(auth) => {
                self.password.clear();
                self.notice = None;
                Ok(Some(auth))
            }
            Err(e) => {
                if let ApiError::Rejected { message, .. } = &e {
                    self.error = Some(message.clone());
                }
                Err(e)
            }
        }
    }
}
