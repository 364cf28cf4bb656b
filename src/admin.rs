//! Admin user list: one cached page of accounts with confirmed status toggles

use crate::api::models::{ManagedUser, UserStatus};
use crate::api::{ApiError, DashboardApi};

/// A status flip waiting for the viewer's y/n
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    pub user_id: i64,
    pub full_name: String,
    pub from: UserStatus,
}

impl PendingToggle {
    pub fn to(&self) -> UserStatus {
        self.from.toggled()
    }

    pub fn prompt(&self) -> String {
        format!("{} {}?", self.from.action_label(), self.full_name)
    }
}

#[derive(Debug, Clone)]
pub struct AdminUserList {
    pub users: Vec<ManagedUser>,
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub selected: usize,
    pub loading: bool,
    pub pending: Option<PendingToggle>,
}

impl Default for AdminUserList {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            page: 1,
            total_pages: 1,
            total: 0,
            selected: 0,
            loading: true,
            pending: None,
        }
    }
}

impl AdminUserList {
    /// Fetch `page` and replace the cached page. The cache is untouched on failure.
    pub async fn fetch(&mut self, api: &dyn DashboardApi, page: u32) -> Result<(), ApiError> {
        self.loading = true;
        let result = api.list_users(page.max(1)).await;
        self.loading = false;

        let fetched = result?;
        self.users = fetched.users;
        self.total = fetched.total;
        // An empty collection still has one (empty) page
        self.total_pages = fetched.pages.max(1);
        self.page = page.clamp(1, self.total_pages);
        if self.selected >= self.users.len() {
            self.selected = self.users.len().saturating_sub(1);
        }
        Ok(())
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub async fn next_page(&mut self, api: &dyn DashboardApi) -> Result<bool, ApiError> {
        if !self.has_next() {
            return Ok(false);
        }
        self.selected = 0;
        self.fetch(api, self.page + 1).await?;
        Ok(true)
    }

    pub async fn prev_page(&mut self, api: &dyn DashboardApi) -> Result<bool, ApiError> {
        if !self.has_prev() {
            return Ok(false);
        }
        self.selected = 0;
        self.fetch(api, self.page - 1).await?;
        Ok(true)
    }

    pub fn move_down(&mut self) {
        if !self.users.is_empty() {
            self.selected = (self.selected + 1) % self.users.len();
        }
    }

    pub fn move_up(&mut self) {
        if !self.users.is_empty() {
            self.selected = self.selected.checked_sub(1).unwrap_or(self.users.len() - 1);
        }
    }

    pub fn selected_user(&self) -> Option<&ManagedUser> {
        self.users.get(self.selected)
    }

    /// Ask to flip the selected row. Nothing is pending for your own row.
    pub fn request_toggle(&mut self, self_id: i64) -> Option<&PendingToggle> {
        let user = self.users.get(self.selected)?;
        if user.id == self_id {
            return None;
        }
        self.pending = Some(PendingToggle {
            user_id: user.id,
            full_name: user.full_name.clone(),
            from: user.status,
        });
        self.pending.as_ref()
    }

    pub fn cancel_toggle(&mut self) {
        self.pending = None;
    }

    /// Send the confirmed flip and update the cached row on success
    pub async fn confirm_toggle(
        &mut self,
        api: &dyn DashboardApi,
    ) -> Result<Option<UserStatus>, ApiError> {
        let Some(pending) = self.pending.take() else {
            return Ok(None);
        };

        let new_status = pending.to();
        api.set_user_status(pending.user_id, new_status).await?;

        if let Some(user) = self.users.iter_mut().find(|u| u.id == pending.user_id) {
            user.status = new_status;
        }
        tracing::info!("User {} is now {}", pending.user_id, new_status.label());
        Ok(Some(new_status))
    }
}
