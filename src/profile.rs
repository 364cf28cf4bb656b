//! Profile editor: name, email and an optional new password

use crate::api::models::{ManagedUser, ProfileUpdate};
use crate::api::{ApiError, DashboardApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FullName,
    Email,
    Password,
}

impl ProfileField {
    pub fn next(self) -> Self {
        match self {
            ProfileField::FullName => ProfileField::Email,
            ProfileField::Email => ProfileField::Password,
            ProfileField::Password => ProfileField::FullName,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ProfileField::FullName => ProfileField::Password,
            ProfileField::Email => ProfileField::FullName,
            ProfileField::Password => ProfileField::Email,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// Inline message under the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl FormMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Error, text: text.into() }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileEditor {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub focus: ProfileField,
    pub message: Option<FormMessage>,
    pub loaded: bool,
}

impl Default for ProfileEditor {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            password: String::new(),
            focus: ProfileField::FullName,
            message: None,
            loaded: false,
        }
    }
}

impl ProfileEditor {
    pub async fn load(&mut self, api: &dyn DashboardApi) -> Result<(), ApiError> {
        let user = api.get_profile().await?;
        self.fill(&user);
        self.message = None;
        self.loaded = true;
        Ok(())
    }

    fn fill(&mut self, user: &ManagedUser) {
        self.full_name = user.full_name.clone();
        self.email = user.email.clone();
        self.password.clear();
    }

    pub fn field_mut(&mut self) -> &mut String {
        match self.focus {
            ProfileField::FullName => &mut self.full_name,
            ProfileField::Email => &mut self.email,
            ProfileField::Password => &mut self.password,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.field_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.field_mut().pop();
    }

    /// What a submit would send. `None` when required fields are blank.
    pub fn update(&self) -> Option<ProfileUpdate> {
        let full_name = self.full_name.trim();
        let email = self.email.trim();
        if full_name.is_empty() || email.is_empty() {
            return None;
        }
        Some(ProfileUpdate {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
        })
    }

    /// Send the form. On success the form shows what the server stored and the
    /// saved user is returned so the session can follow it.
    pub async fn submit(
        &mut self,
        api: &dyn DashboardApi,
    ) -> Result<Option<ManagedUser>, ApiError> {
        self.message = None;

        let Some(update) = self.update() else {
            self.message = Some(FormMessage::error("Full name and email are required"));
            return Ok(None);
        };

        match api.update_profile(&update).await {
            Ok(user) => {
                self.fill(&user);
                self.message = Some(FormMessage::success("Profile updated successfully!"));
                tracing::info!("Profile saved for {}", user.email);
                Ok(Some(user))
            }
            Err(e) => {
                if let ApiError::Rejected { message, .. } = &e {
                    self.message = Some(FormMessage::error(message.clone()));
                }
                Err(e)
            }
        }
    }
}
