use async_trait::async_trait;
use chrono::FixedOffset;

use super::{DeliverySource, ServiceError};
use crate::models::deliveries::{
    DeliveriesResponse, DeliveryCounts, DeliveryRecord, DeliveryStatus,
};
use crate::repositories::deliveries::DeliveryRepository;
use crate::utils::format_date;

#[async_trait]
impl DeliverySource for DeliveryRepository {
    async fn fetch_deliveries(&self) -> Result<DeliveriesResponse, ServiceError> {
        self.get_deliveries()
            .await
            .map_err(|e| ServiceError::from_repository("Deliveries", e))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DeliveryFilter {
    #[default]
    All,
    Pending,
    Shipped,
    Delivered,
}

impl DeliveryFilter {
    pub const ALL: [DeliveryFilter; 4] = [
        DeliveryFilter::All,
        DeliveryFilter::Pending,
        DeliveryFilter::Shipped,
        DeliveryFilter::Delivered,
    ];

    pub fn matches(self, status: &DeliveryStatus) -> bool {
        match self {
            DeliveryFilter::All => true,
            DeliveryFilter::Pending => *status == DeliveryStatus::Pending,
            DeliveryFilter::Shipped => *status == DeliveryStatus::Shipped,
            DeliveryFilter::Delivered => *status == DeliveryStatus::Delivered,
        }
    }

    pub fn count(self, counts: &DeliveryCounts) -> u32 {
        match self {
            DeliveryFilter::All => counts.all,
            DeliveryFilter::Pending => counts.pending,
            DeliveryFilter::Shipped => counts.shipped,
            DeliveryFilter::Delivered => counts.delivered,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeliveryFilter::All => "📦 Todos",
            DeliveryFilter::Pending => "⏳ Pendente",
            DeliveryFilter::Shipped => "🚚 Enviado",
            DeliveryFilter::Delivered => "✅ Entregue",
        }
    }

    fn status_text(self) -> &'static str {
        match self {
            DeliveryFilter::All => "Desconhecido",
            DeliveryFilter::Pending => DeliveryStatus::Pending.badge().label,
            DeliveryFilter::Shipped => DeliveryStatus::Shipped.badge().label,
            DeliveryFilter::Delivered => DeliveryStatus::Delivered.badge().label,
        }
    }
}

/// Returns the deliveries matching `filter`, keeping their order.
pub fn filter_deliveries(
    deliveries: &[DeliveryRecord],
    filter: DeliveryFilter,
) -> Vec<&DeliveryRecord> {
    deliveries
        .iter()
        .filter(|delivery| filter.matches(&delivery.status))
        .collect()
}

pub struct DeliveriesViewModel<S> {
    source: S,
    offset: FixedOffset,
    loading: bool,
    deliveries: Vec<DeliveryRecord>,
    counts: DeliveryCounts,
    selected: DeliveryFilter,
}

impl<S: DeliverySource> DeliveriesViewModel<S> {
    pub fn new(source: S, offset: FixedOffset) -> Self {
        Self {
            source,
            offset,
            loading: true,
            deliveries: Vec::new(),
            counts: DeliveryCounts::default(),
            selected: DeliveryFilter::All,
        }
    }

    pub async fn load(&mut self) {
        if !self.loading {
            return;
        }

        match self.source.fetch_deliveries().await {
            Ok(response) => {
                log::info!("Loaded {} deliveries.", response.deliveries.len());
                self.deliveries = response.deliveries;
                self.counts = response.filters;
            }
            Err(e) => log::error!("Could not fetch deliveries: {}", e),
        }

        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn counts(&self) -> DeliveryCounts {
        self.counts
    }

    pub fn selected(&self) -> DeliveryFilter {
        self.selected
    }

    pub fn select_filter(&mut self, filter: DeliveryFilter) {
        self.selected = filter;
    }

    pub fn visible(&self) -> Vec<&DeliveryRecord> {
        filter_deliveries(&self.deliveries, self.selected)
    }

    pub fn filter_button(&self, filter: DeliveryFilter) -> String {
        format!("{} ({})", filter.label(), filter.count(&self.counts))
    }

    pub fn empty_message(&self) -> String {
        match self.selected {
            DeliveryFilter::All => "Você ainda não possui solicitações de entrega. \
                 Ganhe prêmios nas raspadinhas para solicitar entregas!"
                .to_string(),
            filter => format!(
                "Nenhuma entrega com status \"{}\" encontrada.",
                filter.status_text()
            ),
        }
    }

    /// Dated milestones of a delivery, in display order.
    pub fn timeline(&self, delivery: &DeliveryRecord) -> Vec<(&'static str, String)> {
        let mut timeline = vec![("Pedido em", format_date(&delivery.created_at, &self.offset))];

        if let Some(shipped_at) = &delivery.shipped_at {
            timeline.push(("Enviado em", format_date(shipped_at, &self.offset)));
        }
        if let Some(delivered_at) = &delivery.delivered_at {
            timeline.push(("Entregue em", format_date(delivered_at, &self.offset)));
        }

        timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::deliveries::Product;
    use crate::utils::brasilia_offset;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        response: Option<DeliveriesResponse>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(response: Option<DeliveriesResponse>) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DeliverySource for FakeSource {
        async fn fetch_deliveries(&self) -> Result<DeliveriesResponse, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().ok_or(ServiceError::Communication(
                "Deliveries".to_string(),
                "timed out".to_string(),
            ))
        }
    }

    fn delivery(id: &str, status: &str) -> DeliveryRecord {
        DeliveryRecord {
            id: id.to_string(),
            product: Product {
                name: format!("Prêmio {}", id),
                description: String::new(),
                category: None,
            },
            status: DeliveryStatus::from(status.to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap(),
            shipped_at: None,
            delivered_at: None,
            tracking_code: None,
            address: None,
        }
    }

    fn sample() -> Vec<DeliveryRecord> {
        vec![
            delivery("1", "pending"),
            delivery("2", "shipped"),
            delivery("3", "returned"),
            delivery("4", "pending"),
            delivery("5", "delivered"),
        ]
    }

    fn ids(records: &[&DeliveryRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_filter_all_returns_everything() {
        let deliveries = sample();
        let filtered = filter_deliveries(&deliveries, DeliveryFilter::All);

        assert_eq!(ids(&filtered), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_filter_by_status_keeps_order() {
        let deliveries = sample();

        for filter in DeliveryFilter::ALL {
            let filtered = filter_deliveries(&deliveries, filter);
            assert!(filtered.iter().all(|d| filter.matches(&d.status)));
        }

        let pending = filter_deliveries(&deliveries, DeliveryFilter::Pending);
        assert_eq!(ids(&pending), vec!["1", "4"]);
        let shipped = filter_deliveries(&deliveries, DeliveryFilter::Shipped);
        assert_eq!(ids(&shipped), vec!["2"]);
        let delivered = filter_deliveries(&deliveries, DeliveryFilter::Delivered);
        assert_eq!(ids(&delivered), vec!["5"]);
        assert_eq!(deliveries.len(), 5);
    }

    #[tokio::test]
    async fn test_view_model_filters_and_counts() {
        let counts = DeliveryCounts {
            all: 5,
            pending: 2,
            shipped: 1,
            delivered: 1,
        };
        let mut vm = DeliveriesViewModel::new(
            FakeSource::new(Some(DeliveriesResponse {
                deliveries: sample(),
                filters: counts,
            })),
            brasilia_offset(),
        );

        vm.load().await;
        vm.load().await;
        assert_eq!(vm.source.calls(), 1);
        assert!(!vm.is_loading());
        assert_eq!(vm.visible().len(), 5);
        assert_eq!(vm.filter_button(DeliveryFilter::Pending), "⏳ Pendente (2)");

        vm.select_filter(DeliveryFilter::Shipped);
        assert_eq!(ids(&vm.visible()), vec!["2"]);
        assert_eq!(vm.timeline(vm.visible()[0]), vec![("Pedido em", "01/02/2024".to_string())]);
    }

    #[tokio::test]
    async fn test_failed_load_is_empty() {
        let mut vm = DeliveriesViewModel::new(FakeSource::new(None), brasilia_offset());

        vm.load().await;
        vm.load().await;

        assert_eq!(vm.source.calls(), 1);
        assert!(!vm.is_loading());
        assert!(vm.visible().is_empty());
        assert_eq!(vm.counts(), DeliveryCounts::default());
        assert!(vm.empty_message().starts_with("Você ainda não possui"));

        vm.select_filter(DeliveryFilter::Delivered);
        assert_eq!(
            vm.empty_message(),
            "Nenhuma entrega com status \"Entregue\" encontrada."
        );
    }
}
