pub mod client;
pub mod error;
pub mod models;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;

pub use client::HttpApi;
pub use error::{ApiError, FailureKind};
use models::{AuthResponse, ManagedUser, ProfileUpdate, UserPage, UserStatus};

/// Default base URL of the account API
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";

/// The REST surface the dashboard talks to
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Token attached as `Authorization: Bearer` to every later request
    async fn set_token(&self, token: Option<String>);

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;

    async fn signup(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError>;

    /// One page of accounts, 1-indexed
    async fn list_users(&self, page: u32) -> Result<UserPage, ApiError>;

    async fn set_user_status(&self, user_id: i64, status: UserStatus) -> Result<(), ApiError>;

    async fn get_profile(&self) -> Result<ManagedUser, ApiError>;

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<ManagedUser, ApiError>;
}
