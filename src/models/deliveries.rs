use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum DeliveryStatus {
    Pending,
    Shipped,
    Delivered,
    /// Any status this client does not know about, kept verbatim.
    Unrecognized(String),
}

impl From<String> for DeliveryStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => DeliveryStatus::Pending,
            "shipped" => DeliveryStatus::Shipped,
            "delivered" => DeliveryStatus::Delivered,
            _ => DeliveryStatus::Unrecognized(value),
        }
    }
}

impl From<DeliveryStatus> for String {
    fn from(status: DeliveryStatus) -> Self {
        match status {
            DeliveryStatus::Pending => "pending".to_string(),
            DeliveryStatus::Shipped => "shipped".to_string(),
            DeliveryStatus::Delivered => "delivered".to_string(),
            DeliveryStatus::Unrecognized(value) => value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusBadge {
    pub color: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

const PENDING_BADGE: StatusBadge = StatusBadge {
    color: "bg-yellow-900 text-yellow-300 border-yellow-600",
    label: "Pendente",
    icon: "⏳",
};

const SHIPPED_BADGE: StatusBadge = StatusBadge {
    color: "bg-blue-900 text-blue-300 border-blue-600",
    label: "Enviado",
    icon: "🚚",
};

const DELIVERED_BADGE: StatusBadge = StatusBadge {
    color: "bg-green-900 text-green-300 border-green-600",
    label: "Entregue",
    icon: "✅",
};

const FALLBACK_BADGE: StatusBadge = StatusBadge {
    color: "bg-gray-900 text-gray-300 border-gray-600",
    label: "Desconhecido",
    icon: "📦",
};

impl DeliveryStatus {
    pub fn badge(&self) -> StatusBadge {
        match self {
            DeliveryStatus::Pending => PENDING_BADGE,
            DeliveryStatus::Shipped => SHIPPED_BADGE,
            DeliveryStatus::Delivered => DELIVERED_BADGE,
            DeliveryStatus::Unrecognized(_) => FALLBACK_BADGE,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl Product {
    pub fn icon(&self) -> &'static str {
        match self.category.as_deref() {
            Some("electronics") => "📱",
            Some("cosmetics") => "💄",
            Some("vehicle") => "🏍️",
            _ => "📦",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl DeliveryAddress {
    pub fn lines(&self) -> [String; 3] {
        let street = match self.complement.as_deref() {
            Some(complement) if !complement.is_empty() => {
                format!("{}, {}, {}", self.street, self.number, complement)
            }
            _ => format!("{}, {}", self.street, self.number),
        };

        [
            street,
            format!("{} - {}/{}", self.neighborhood, self.city, self.state),
            format!("CEP: {}", self.zip_code),
        ]
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub product: Product,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tracking_code: Option<String>,
    #[serde(default)]
    pub address: Option<DeliveryAddress>,
}

impl DeliveryRecord {
    /// Tracking is offered only while the package is in transit.
    pub fn is_trackable(&self) -> bool {
        self.status == DeliveryStatus::Shipped && self.tracking_code.is_some()
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DeliveryCounts {
    pub all: u32,
    pub pending: u32,
    pub shipped: u32,
    pub delivered: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DeliveriesResponse {
    #[serde(default)]
    pub deliveries: Vec<DeliveryRecord>,
    #[serde(default)]
    pub filters: DeliveryCounts,
}
