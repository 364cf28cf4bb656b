use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::{server_message, ApiError};
use super::models::{
    AuthResponse, LoginRequest, ManagedUser, ProfileResponse, ProfileUpdate, SignupRequest,
    StatusUpdate, UserPage, UserStatus,
};
use super::DashboardApi;

/// reqwest-backed client for the account API
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    token_store: Arc<RwLock<Option<String>>>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        tracing::info!("API client using base URL: {}", base_url);

        Ok(Self {
            client,
            base_url,
            token_store: Arc::new(RwLock::new(None)),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token_store.read().await.as_ref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send with the bearer token; a 401 drops the token
    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = self.authorized(builder).await.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        tracing::debug!("Request failed with status {}: {}", status, body);
        let err = ApiError::from_status(status.as_u16(), &body);
        if matches!(err, ApiError::Unauthorized) {
            *self.token_store.write().await = None;
        }
        Err(err)
    }

    /// Login/signup: there is no session to expire, so 401 is a plain rejection
    async fn send_credentials(&self, builder: RequestBuilder) -> Result<AuthResponse, ApiError> {
        let response = self.authorized(builder).await.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return decode(&body);
        }

        tracing::debug!("Credentials refused with status {}: {}", status, body);
        match ApiError::from_status(status.as_u16(), &body) {
            ApiError::Unauthorized => Err(ApiError::Rejected {
                status: status.as_u16(),
                message: server_message(&body)
                    .unwrap_or_else(|| "Invalid email or password".to_string()),
            }),
            err => Err(err),
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn set_token(&self, token: Option<String>) {
        *self.token_store.write().await = token;
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = self.client.post(self.url("auth/login")).json(&body);
        self.send_credentials(request).await
    }

    async fn signup(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = SignupRequest {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = self.client.post(self.url("auth/signup")).json(&body);
        self.send_credentials(request).await
    }

    async fn list_users(&self, page: u32) -> Result<UserPage, ApiError> {
        tracing::debug!("Fetching user page {}", page);
        let request = self
            .client
            .get(self.url("admin/users"))
            .query(&[("page", page)]);
        decode(&self.send(request).await?)
    }

    async fn set_user_status(&self, user_id: i64, status: UserStatus) -> Result<(), ApiError> {
        let request = self
            .client
            .patch(self.url(&format!("admin/users/{}/status", user_id)))
            .json(&StatusUpdate { status });
        self.send(request).await?;
        Ok(())
    }

    async fn get_profile(&self) -> Result<ManagedUser, ApiError> {
        let request = self.client.get(self.url("user/profile"));
        decode(&self.send(request).await?)
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<ManagedUser, ApiError> {
        let request = self.client.put(self.url("user/profile")).json(update);
        let response: ProfileResponse = decode(&self.send(request).await?)?;
        if let Some(message) = &response.message {
            tracing::debug!("Profile update: {}", message);
        }
        Ok(response.user)
    }
}
