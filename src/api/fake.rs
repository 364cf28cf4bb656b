//! In-memory account API for exercising the dashboard without a server

use async_trait::async_trait;
use std::sync::Mutex;

use super::error::ApiError;
use super::models::{AuthResponse, ManagedUser, ProfileUpdate, UserPage, UserStatus};
use super::DashboardApi;
use crate::session::Role;

pub const PER_PAGE: usize = 10;

/// Canned failure for the next call
#[derive(Debug, Clone)]
pub enum Failure {
    Unauthorized,
    Rejected(String),
    Server,
}

impl Failure {
    fn into_error(self) -> ApiError {
        match self {
            Failure::Unauthorized => ApiError::Unauthorized,
            Failure::Rejected(message) => ApiError::Rejected { status: 400, message },
            Failure::Server => ApiError::Server {
                status: 500,
                message: "Internal Server Error".to_string(),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub users: Vec<ManagedUser>,
    pub password: String,
    pub current_user: i64,
    pub token: Option<String>,
    pub list_calls: Vec<u32>,
    pub status_calls: Vec<(i64, UserStatus)>,
    pub profile_updates: Vec<ProfileUpdate>,
    pub fail_next: Option<Failure>,
}

#[derive(Debug, Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
}

pub fn user(id: i64, role: Role, status: UserStatus) -> ManagedUser {
    ManagedUser {
        id,
        full_name: format!("User {}", id),
        email: format!("user{}@example.com", id),
        role,
        status,
        last_login: None,
    }
}

impl FakeApi {
    /// `count` accounts; id 1 is the admin, the rest are active users
    pub fn with_users(count: i64) -> Self {
        let users = (1..=count)
            .map(|id| {
                let role = if id == 1 { Role::Admin } else { Role::User };
                user(id, role, UserStatus::Active)
            })
            .collect();
        Self {
            state: Mutex::new(FakeState {
                users,
                password: "password123".to_string(),
                current_user: 1,
                ..FakeState::default()
            }),
        }
    }

    pub fn fail_next(&self, failure: Failure) {
        self.state.lock().unwrap().fail_next = Some(failure);
    }

    pub fn list_calls(&self) -> Vec<u32> {
        self.state.lock().unwrap().list_calls.clone()
    }

    pub fn status_calls(&self) -> Vec<(i64, UserStatus)> {
        self.state.lock().unwrap().status_calls.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.lock().unwrap().token.clone()
    }

    pub fn user_status(&self, id: i64) -> Option<UserStatus> {
        let state = self.state.lock().unwrap();
        state.users.iter().find(|u| u.id == id).map(|u| u.status)
    }

    fn take_failure(state: &mut FakeState) -> Result<(), ApiError> {
        match state.fail_next.take() {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    fn authorized(state: &FakeState) -> Result<(), ApiError> {
        match state.token {
            Some(_) => Ok(()),
            None => Err(ApiError::Unauthorized),
        }
    }

    fn current(state: &FakeState) -> Result<ManagedUser, ApiError> {
        Self::authorized(state)?;
        state
            .users
            .iter()
            .find(|u| u.id == state.current_user)
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn set_token(&self, token: Option<String>) {
        self.state.lock().unwrap().token = token;
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;

        let user = state.users.iter().find(|u| u.email == email).cloned();
        match user {
            Some(user) if password == state.password => {
                if user.status == UserStatus::Inactive {
                    return Err(Failure::Rejected("Account inactive".to_string()).into_error());
                }
                state.current_user = user.id;
                Ok(AuthResponse {
                    token: format!("token-{}", user.id),
                    user,
                })
            }
            _ => Err(ApiError::Rejected {
                status: 401,
                message: "Invalid email or password".to_string(),
            }),
        }
    }

    async fn signup(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;

        if state.users.iter().any(|u| u.email == email) {
            return Err(Failure::Rejected("Email exists".to_string()).into_error());
        }
        let id = state.users.len() as i64 + 1;
        let mut new_user = user(id, Role::User, UserStatus::Active);
        new_user.full_name = full_name.to_string();
        new_user.email = email.to_string();
        state.users.push(new_user.clone());
        state.password = password.to_string();
        state.current_user = id;

        Ok(AuthResponse {
            token: format!("token-{}", id),
            user: new_user,
        })
    }

    async fn list_users(&self, page: u32) -> Result<UserPage, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls.push(page);
        Self::take_failure(&mut state)?;
        Self::authorized(&state)?;

        let total = state.users.len();
        let pages = total.div_ceil(PER_PAGE) as u32;
        let start = (page.saturating_sub(1) as usize) * PER_PAGE;
        let users = state.users.iter().skip(start).take(PER_PAGE).cloned().collect();

        Ok(UserPage {
            users,
            total: total as u64,
            pages,
        })
    }

    async fn set_user_status(&self, user_id: i64, status: UserStatus) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.status_calls.push((user_id, status));
        Self::take_failure(&mut state)?;
        Self::authorized(&state)?;

        match state.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.status = status;
                Ok(())
            }
            None => Err(ApiError::Rejected {
                status: 404,
                message: "Not Found".to_string(),
            }),
        }
    }

    async fn get_profile(&self) -> Result<ManagedUser, ApiError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        Self::current(&state)
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<ManagedUser, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.profile_updates.push(update.clone());
        Self::take_failure(&mut state)?;
        let current = Self::current(&state)?;

        if let Some(password) = &update.password {
            state.password = password.clone();
        }
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == current.id)
            .ok_or(ApiError::Unauthorized)?;
        user.full_name = update.full_name.clone();
        user.email = update.email.clone();
        Ok(user.clone())
    }
}
