use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Flat bonus credited for every referred user that made a first deposit.
pub const ACTIVE_REFERRAL_BONUS: f64 = 10.0;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralStats {
    pub referral_code: String,
    pub referral_link: String,
    #[serde(default)]
    pub total_earnings: f64,
    #[serde(default)]
    pub total_referred: u32,
    #[serde(default)]
    pub active_referred: u32,
    #[serde(default)]
    pub referred_users: Vec<ReferredUser>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferredUser {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub date_referred: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralStatsResponse {
    pub referral_stats: ReferralStats,
}

impl ReferralStats {
    pub fn active_users(&self) -> impl Iterator<Item = &ReferredUser> {
        self.referred_users.iter().filter(|user| user.is_active)
    }
}
