//! Account, payment and order data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CartItem, Money, money};

/// Shipping address stored against a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub full_name: String,
    #[serde(alias = "line1", alias = "street")]
    pub address_line1: String,
    #[serde(alias = "line2")]
    pub address_line2: String,
    pub city: String,
    #[serde(alias = "postalCode", alias = "zip")]
    pub postcode: String,
    pub country: String,
    pub phone: String,
}

impl Address {
    /// Minimum fields required to ship a parcel.
    pub fn is_complete(&self) -> bool {
        [&self.full_name, &self.address_line1, &self.city, &self.postcode]
            .iter()
            .all(|f| !f.trim().is_empty())
    }
}

/// A line sent to the payment endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLine {
    pub listing_id: String,
    pub title: String,
    pub quantity: u32,
    #[serde(with = "money::decimal")]
    pub unit_price: Money,
}

impl From<&CartItem> for PaymentLine {
    fn from(item: &CartItem) -> Self {
        Self {
            listing_id: item.id.clone(),
            title: item.title.clone(),
            quantity: item.quantity,
            unit_price: item.price,
        }
    }
}

/// Body of `POST /payments/create-payment`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub user_id: String,
    pub items: Vec<PaymentLine>,
    #[serde(with = "money::decimal")]
    pub amount: Money,
    pub currency: String,
    pub shipping_address: Address,
}

/// Payment session handed back by the upstream for the hosted provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentSession {
    #[serde(alias = "paymentReference", alias = "id")]
    pub reference: String,
    /// Opaque value passed to the provider widget
    pub client_secret: Option<String>,
    pub checkout_url: Option<String>,
    #[serde(with = "money::decimal")]
    pub amount: Money,
}

/// Result of `POST /payments/success/{reference}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentConfirmation {
    pub success: bool,
    #[serde(alias = "_id")]
    pub order_id: Option<String>,
    pub message: Option<String>,
}

/// Fulfilment status as reported upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Unknown => "unknown",
        }
    }

    /// Whether the order can still change.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Paid | OrderStatus::Processing | OrderStatus::Shipped
        )
    }
}

/// A line on a placed order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderLine {
    #[serde(alias = "listing", alias = "bookId")]
    pub listing_id: String,
    pub title: String,
    pub quantity: u32,
    #[serde(with = "money::decimal", alias = "unitPrice")]
    pub price: Money,
}

/// A placed order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    pub status: OrderStatus,
    #[serde(alias = "orderItems")]
    pub items: Vec<OrderLine>,
    #[serde(with = "money::decimal", alias = "totalPrice", alias = "totalAmount")]
    pub total: Money,
    pub shipping_address: Option<Address>,
    pub tracking_number: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_tolerates_upstream_naming() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "o-1",
            "status": "shipped",
            "orderItems": [{"listing": "b-1", "title": "Dune", "quantity": 2, "unitPrice": "4.50"}],
            "totalPrice": 9.0,
            "createdAt": "2026-03-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(order.id, "o-1");
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.items[0].price.pence(), 450);
        assert_eq!(order.total.pence(), 900);
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_unknown_status() {
        let order: Order = serde_json::from_value(serde_json::json!({"status": "lost"})).unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
        assert!(!order.status.is_open());
    }

    #[test]
    fn test_address_completeness() {
        let mut addr = Address {
            full_name: "Ada".into(),
            address_line1: "1 Lane".into(),
            city: "Leeds".into(),
            ..Address::default()
        };
        assert!(!addr.is_complete());
        addr.postcode = "LS1 1AA".into();
        assert!(addr.is_complete());
    }
}
