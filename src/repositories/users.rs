use super::ApiClient;
use crate::models::users::{
    PasswordUpdate, ProfileUpdate, Theme, ThemeUpdate, User, UserResponse,
};

#[derive(Clone)]
pub struct UserRepository {
    api: ApiClient,
}

impl UserRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn save_profile(&self, name: &str, email: &str) -> Result<User, anyhow::Error> {
        let payload = ProfileUpdate {
            name: name.to_string(),
            email: email.to_string(),
        };
        let response: UserResponse = self.api.put("/api/user/profile", &payload).await?;

        Ok(response.user)
    }

    pub async fn save_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), anyhow::Error> {
        let payload = PasswordUpdate {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        let _: serde_json::Value = self.api.put("/api/user/password", &payload).await?;

        Ok(())
    }

    pub async fn save_theme(&self, theme: Theme) -> Result<(), anyhow::Error> {
        let _: serde_json::Value = self
            .api
            .put("/api/user/theme", &ThemeUpdate { theme })
            .await?;

        Ok(())
    }
}
