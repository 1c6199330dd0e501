use crate::domain::money::Amount;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Price of a single result check for one examination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPricing {
    pub id: String,
    pub name: String,
    pub price: Amount,
    pub currency: String,
    pub description: String,
}

/// A discounted bulk purchase option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkTier {
    pub quantity: u32,
    pub price_per_unit: Amount,
    pub discount: String,
    pub total_price: Amount,
}

impl BulkTier {
    /// Total computed from quantity and unit price, independent of the quoted `total_price`.
    pub fn total(&self) -> Amount {
        self.price_per_unit * self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub exam_id: String,
    pub index_number: String,
    pub contact: String,
    /// Display total only; the processor confirms the authoritative amount.
    pub expected_total: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub pin: String,
    pub serial: String,
    pub confirmed_total: Amount,
    pub currency: String,
}

/// A PIN/Serial pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checker {
    pub pin: String,
    pub serial: String,
}

/// Credentials handed to the buyer after a single purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCredentials {
    pub pin: String,
    pub serial: String,
    pub exam_type: String,
    pub index_number: String,
    pub delivered_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeDispatch {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub success: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectGrade {
    pub name: String,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub student_name: String,
    pub index_number: String,
    pub exam_year: String,
    pub exam_type: String,
    pub subjects: Vec<SubjectGrade>,
    pub aggregate: u32,
    pub pin: String,
    pub serial: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub date: NaiveDate,
    pub quantity: u32,
    pub status: OrderStatus,
    pub codes: Vec<Checker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: usize,
    pub total_codes: u64,
    pub delivered_orders: usize,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        Self {
            total_orders: orders.len(),
            total_codes: orders.iter().map(|o| u64::from(o.quantity)).sum(),
            delivered_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Delivered)
                .count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderHistory {
    pub orders: Vec<Order>,
    pub stats: OrderStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: usize,
    pub total_codes: u64,
    pub delivered_orders: usize,
    pub pending_orders: usize,
    pub last_updated: DateTime<Utc>,
}
