use async_trait::async_trait;

use crate::models::{
    deliveries::DeliveriesResponse,
    referrals::ReferralStats,
    users::{Theme, User},
};
use crate::repositories::ApiRejection;

pub mod account;
pub mod deliveries;
pub mod referrals;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Rejected by server ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },
    #[error("Communication error: {0} - {1}")]
    Communication(String, String),
    #[error("Platform error: {0}")]
    Platform(String),
    #[error("No data loaded")]
    NoData,
    #[error("Session ended")]
    SessionEnded,
}

impl ServiceError {
    /// Wraps a repository failure, keeping the server's rejection message
    /// when there is one.
    pub fn from_repository(resource: &str, error: anyhow::Error) -> Self {
        match error.downcast_ref::<ApiRejection>() {
            Some(rejection) => ServiceError::Rejected {
                status: rejection.status,
                message: rejection.message.clone(),
            },
            None => ServiceError::Communication(resource.to_string(), format!("{:#}", error)),
        }
    }

    /// Text for the error banner of a view: validation and server messages
    /// are shown as-is, everything else becomes `fallback`.
    pub fn banner(&self, fallback: &str) -> String {
        match self {
            ServiceError::Validation(message) => message.clone(),
            ServiceError::Rejected {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            ServiceError::SessionEnded => "Sessão encerrada. Entre novamente.".to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[async_trait]
pub trait ReferralSource: Send + Sync {
    async fn fetch_referral_stats(&self) -> Result<ReferralStats, ServiceError>;
}

#[async_trait]
pub trait DeliverySource: Send + Sync {
    async fn fetch_deliveries(&self) -> Result<DeliveriesResponse, ServiceError>;
}

#[async_trait]
pub trait AccountSource: Send + Sync {
    async fn update_profile(&self, name: &str, email: &str) -> Result<User, ServiceError>;

    async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError>;

    async fn update_theme(&self, theme: Theme) -> Result<(), ServiceError>;
}
