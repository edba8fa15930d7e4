use async_trait::async_trait;

use super::{AccountSource, ServiceError};
use crate::models::users::{Session, SessionHandle, Theme, User};
use crate::repositories::users::UserRepository;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[async_trait]
impl AccountSource for UserRepository {
    async fn update_profile(&self, name: &str, email: &str) -> Result<User, ServiceError> {
        self.save_profile(name, email)
            .await
            .map_err(|e| ServiceError::from_repository("Profile", e))
    }

    async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        self.save_password(current_password, new_password)
            .await
            .map_err(|e| ServiceError::from_repository("Password", e))
    }

    async fn update_theme(&self, theme: Theme) -> Result<(), ServiceError> {
        self.save_theme(theme)
            .await
            .map_err(|e| ServiceError::from_repository("Theme", e))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordForm {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.new_password != self.confirm_password {
            return Err(ServiceError::Validation("As senhas não coincidem".to_string()));
        }

        // Counted in UTF-16 units, like the browser form it mirrors.
        if self.new_password.encode_utf16().count() < MIN_PASSWORD_LENGTH {
            return Err(ServiceError::Validation(format!(
                "A nova senha deve ter pelo menos {} caracteres",
                MIN_PASSWORD_LENGTH
            )));
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Email,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordField {
    Current,
    New,
    Confirm,
}

/// Account settings page: profile, password and appearance. Unlike the
/// referral and delivery views, failures here are surfaced in `error`.
pub struct SettingsViewModel<S> {
    source: S,
    session: SessionHandle,
    prefers_dark: bool,
    profile: ProfileForm,
    password: PasswordForm,
    theme: Theme,
    busy: bool,
    message: Option<String>,
    error: Option<String>,
}

impl<S: AccountSource> SettingsViewModel<S> {
    pub fn new(source: S, session: SessionHandle, prefers_dark: bool) -> Self {
        let user = session.snapshot().user;
        let profile = user
            .as_ref()
            .map(|user| ProfileForm {
                name: user.name.clone(),
                email: user.email.clone(),
            })
            .unwrap_or_default();
        let theme = user.map(|user| user.theme).unwrap_or_default();

        Self {
            source,
            session,
            prefers_dark,
            profile,
            password: PasswordForm::default(),
            theme,
            busy: false,
            message: None,
            error: None,
        }
    }

    pub fn session(&self) -> Session {
        self.session.snapshot()
    }

    pub fn profile(&self) -> &ProfileForm {
        &self.profile
    }

    pub fn password(&self) -> &PasswordForm {
        &self.password
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_profile_field(&mut self, field: ProfileField, value: &str) {
        match field {
            ProfileField::Name => self.profile.name = value.to_string(),
            ProfileField::Email => self.profile.email = value.to_string(),
        }
        self.clear_feedback();
    }

    pub fn set_password_field(&mut self, field: PasswordField, value: &str) {
        match field {
            PasswordField::Current => self.password.current_password = value.to_string(),
            PasswordField::New => self.password.new_password = value.to_string(),
            PasswordField::Confirm => self.password.confirm_password = value.to_string(),
        }
        self.clear_feedback();
    }

    pub async fn submit_profile(&mut self) -> Result<(), ServiceError> {
        self.start();
        if let Err(e) = self.ensure_session() {
            return self.finish(Err(e), "", "");
        }

        let result = self
            .source
            .update_profile(&self.profile.name, &self.profile.email)
            .await;

        let result = result.map(|user| {
            log::info!("Profile updated for user {}.", user.id);
            self.session.set_user(user);
        });
        self.finish(result, "Perfil atualizado com sucesso!", "Erro ao atualizar perfil")
    }

    pub async fn submit_password(&mut self) -> Result<(), ServiceError> {
        self.start();

        if let Err(e) = self.ensure_session().and_then(|_| self.password.validate()) {
            return self.finish(Err(e), "", "");
        }

        let result = self
            .source
            .update_password(&self.password.current_password, &self.password.new_password)
            .await;

        if result.is_ok() {
            self.password = PasswordForm::default();
        }
        self.finish(result, "Senha alterada com sucesso!", "Erro ao alterar senha")
    }

    /// Selects `theme` and persists it. Returns whether the dark appearance
    /// is in effect once the server accepted the change.
    pub async fn change_theme(&mut self, theme: Theme) -> Result<bool, ServiceError> {
        self.theme = theme;
        self.start();
        if let Err(e) = self.ensure_session() {
            self.finish(Err(e), "", "")?;
        }

        let result = self.source.update_theme(theme).await;
        if result.is_ok() {
            self.session.update_user(|user| user.theme = theme);
        }

        self.finish(result, "Tema atualizado com sucesso!", "Erro ao atualizar tema")?;
        Ok(theme.is_dark(self.prefers_dark))
    }

    /// Ends the session when the user confirmed. Returns whether it ended.
    /// Every client sharing the session handle stops sending the token.
    pub fn logout(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }

        log::info!("Ending session.");
        self.session.end();
        true
    }

    fn ensure_session(&self) -> Result<(), ServiceError> {
        if self.session.is_active() {
            Ok(())
        } else {
            Err(ServiceError::SessionEnded)
        }
    }

    fn start(&mut self) {
        self.busy = true;
        self.clear_feedback();
    }

    fn finish(
        &mut self,
        result: Result<(), ServiceError>,
        success: &str,
        fallback: &str,
    ) -> Result<(), ServiceError> {
        self.busy = false;

        match result {
            Ok(()) => {
                self.message = Some(success.to_string());
                Ok(())
            }
            Err(e) => {
                log::warn!("Settings update failed: {}", e);
                self.error = Some(e.banner(fallback));
                Err(e)
            }
        }
    }

    fn clear_feedback(&mut self) {
        self.message = None;
        self.error = None;
    }
}
