use super::ApiClient;
use crate::models::referrals::{ReferralStats, ReferralStatsResponse};

#[derive(Clone)]
pub struct ReferralRepository {
    api: ApiClient,
}

impl ReferralRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_referral_stats(&self) -> Result<ReferralStats, anyhow::Error> {
        let response: ReferralStatsResponse = self.api.get("/api/referrals").await?;
        Ok(response.referral_stats)
    }
}
