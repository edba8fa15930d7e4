pub mod deliveries;
pub mod referrals;
pub mod users;
