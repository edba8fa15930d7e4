use super::ApiClient;
use crate::models::deliveries::DeliveriesResponse;

#[derive(Clone)]
pub struct DeliveryRepository {
    api: ApiClient,
}

impl DeliveryRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_deliveries(&self) -> Result<DeliveriesResponse, anyhow::Error> {
        self.api.get("/api/user/deliveries").await
    }
}
