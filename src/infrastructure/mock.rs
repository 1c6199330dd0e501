//! Simulated backend.
//!
//! No payment is processed and no message is sent. Each call sleeps for its
//! configured latency and answers with fixed or randomly generated data.

use super::in_memory::InMemoryOrderStore;
use crate::config::MockConfig;
use crate::domain::auth::CustomerSession;
use crate::domain::catalog::{
    BulkTier, Checker, CodeDispatch, DashboardStats, ExamPricing, ExamResult, Order, OrderHistory,
    OrderStats, OrderStatus, PaymentReceipt, PaymentRequest, SubjectGrade, Verification,
};
use crate::domain::money::Amount;
use crate::domain::ports::{
    MomoGateway, OrderRepository, PaymentProcessor, PricingProvider, ResultsProvider,
    VerificationService,
};
use crate::domain::session::MomoPaymentRequest;
use crate::error::{GateError, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use rand::Rng;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// The only code the simulated verification service accepts.
pub const DEMO_OTP: &str = "123456";

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

fn transaction_id() -> String {
    format!("TXN-{}-{}", Utc::now().timestamp_millis(), base36(6))
}

fn checker_pin() -> String {
    let number = rand::thread_rng().gen_range(1000..=9999);
    format!("{}{number}", base36(4))
}

fn checker_serial() -> String {
    let number = rand::thread_rng().gen_range(100_000_000..=999_999_999u32);
    format!("WA{}{number}", Utc::now().year())
}

fn order_codes(quantity: u32) -> Vec<Checker> {
    (0..quantity)
        .map(|_| Checker {
            pin: format!("RG-{}", base36(9)),
            serial: format!("SN-{}", base36(12)),
        })
        .collect()
}

async fn simulate(latency_ms: u64) {
    if latency_ms > 0 {
        tokio::time::sleep(Duration::from_millis(latency_ms)).await;
    }
}

fn seeded_orders() -> Vec<Order> {
    [("ORD-001", (2024, 12, 23), 50), ("ORD-002", (2024, 12, 20), 100)]
        .into_iter()
        .filter_map(|(id, (y, m, d), quantity)| {
            Some(Order {
                id: id.to_string(),
                date: NaiveDate::from_ymd_opt(y, m, d)?,
                quantity,
                status: OrderStatus::Delivered,
                codes: order_codes(quantity),
            })
        })
        .collect()
}

/// Simulated implementation of every customer-facing port.
#[derive(Debug, Clone)]
pub struct MockBackend {
    latency: MockConfig,
    placed: InMemoryOrderStore,
    next_order: Arc<AtomicU32>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

impl MockBackend {
    pub fn new(latency: MockConfig) -> Self {
        Self {
            latency,
            placed: InMemoryOrderStore::new(),
            next_order: Arc::new(AtomicU32::new(3)),
        }
    }

    async fn all_orders(&self) -> Vec<Order> {
        let mut orders = seeded_orders();
        orders.extend(self.placed.all().await);
        orders
    }
}

#[async_trait]
impl PricingProvider for MockBackend {
    async fn exam_pricing(&self) -> Result<Vec<ExamPricing>> {
        simulate(self.latency.exam_pricing_ms).await;
        Ok(vec![
            ExamPricing {
                id: "wassce".to_string(),
                name: "WASSCE".to_string(),
                price: Amount::new(dec!(50))?,
                currency: "GHS".to_string(),
                description: "West African Senior School Certificate Examination".to_string(),
            },
            ExamPricing {
                id: "bece".to_string(),
                name: "BECE".to_string(),
                price: Amount::new(dec!(30))?,
                currency: "GHS".to_string(),
                description: "Basic Education Certificate Examination".to_string(),
            },
        ])
    }

    async fn bulk_pricing(&self) -> Result<Vec<BulkTier>> {
        simulate(self.latency.bulk_pricing_ms).await;
        [(10, dec!(45), "10% off"), (50, dec!(40), "20% off"), (100, dec!(35), "30% off")]
            .into_iter()
            .map(|(quantity, unit, discount)| {
                let price_per_unit = Amount::new(unit)?;
                Ok(BulkTier {
                    quantity,
                    price_per_unit,
                    discount: discount.to_string(),
                    total_price: price_per_unit * quantity,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PaymentProcessor for MockBackend {
    async fn process_payment(&self, request: &PaymentRequest) -> Result<PaymentReceipt> {
        simulate(self.latency.process_payment_ms).await;
        let receipt = PaymentReceipt {
            transaction_id: transaction_id(),
            pin: checker_pin(),
            serial: checker_serial(),
            confirmed_total: request.expected_total,
            currency: "GHS".to_string(),
        };
        tracing::info!(
            transaction_id = %receipt.transaction_id,
            exam_id = %request.exam_id,
            total = %receipt.confirmed_total,
            "payment processed"
        );
        Ok(receipt)
    }
}

#[async_trait]
impl VerificationService for MockBackend {
    async fn send_code(&self, contact: &str) -> Result<CodeDispatch> {
        simulate(self.latency.send_code_ms).await;
        tracing::info!(contact, "verification code sent");
        Ok(CodeDispatch {
            success: true,
            message: "Verification code sent".to_string(),
        })
    }

    async fn verify_code(&self, _contact: &str, code: &str) -> Result<Verification> {
        simulate(self.latency.verify_code_ms).await;
        let success = code == DEMO_OTP;
        Ok(Verification {
            success,
            token: success.then(|| format!("mock_session_{}", Utc::now().timestamp_millis())),
        })
    }
}

#[async_trait]
impl ResultsProvider for MockBackend {
    async fn fetch_results(
        &self,
        index_number: &str,
        pin: &str,
        serial: &str,
    ) -> Result<ExamResult> {
        simulate(self.latency.fetch_results_ms).await;
        let subjects = [
            ("English Language", "B2"),
            ("Mathematics", "A1"),
            ("Integrated Science", "B3"),
            ("Social Studies", "A1"),
            ("Physics", "B2"),
            ("Chemistry", "B3"),
            ("Biology", "C4"),
            ("Elective Mathematics", "B2"),
        ]
        .into_iter()
        .map(|(name, grade)| SubjectGrade {
            name: name.to_string(),
            grade: grade.to_string(),
        })
        .collect();

        Ok(ExamResult {
            student_name: "SAMPLE STUDENT".to_string(),
            index_number: index_number.to_string(),
            exam_year: "2024".to_string(),
            exam_type: "WASSCE".to_string(),
            subjects,
            aggregate: 12,
            pin: pin.to_string(),
            serial: serial.to_string(),
        })
    }
}

#[async_trait]
impl OrderRepository for MockBackend {
    async fn user_orders(&self) -> Result<OrderHistory> {
        simulate(self.latency.user_orders_ms).await;
        let orders = self.all_orders().await;
        let stats = OrderStats::from_orders(&orders);
        Ok(OrderHistory { orders, stats })
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats> {
        simulate(self.latency.dashboard_stats_ms).await;
        let stats = OrderStats::from_orders(&self.all_orders().await);
        Ok(DashboardStats {
            total_orders: stats.total_orders,
            total_codes: stats.total_codes,
            delivered_orders: stats.delivered_orders,
            pending_orders: stats.total_orders - stats.delivered_orders,
            last_updated: Utc::now(),
        })
    }

    async fn place_bulk_order(&self, session: &CustomerSession, tier: &BulkTier) -> Result<Order> {
        if tier.quantity == 0 {
            return Err(GateError::ValidationError(
                "Bulk order quantity must be positive".to_string(),
            ));
        }
        simulate(self.latency.bulk_order_ms).await;
        let number = self.next_order.fetch_add(1, Ordering::SeqCst);
        let order = Order {
            id: format!("ORD-{number:03}"),
            date: Utc::now().date_naive(),
            quantity: tier.quantity,
            status: OrderStatus::Delivered,
            codes: order_codes(tier.quantity),
        };
        tracing::info!(
            order_id = %order.id,
            contact = session.contact(),
            quantity = tier.quantity,
            total = %tier.total(),
            "bulk order placed"
        );
        self.placed.store(order.clone()).await;
        Ok(order)
    }
}

/// Simulated mobile-money gateway.
///
/// Records every initiation request and optionally fails all of them with a
/// fixed message.
#[derive(Debug, Clone, Default)]
pub struct MockMomoGateway {
    latency_ms: u64,
    failure: Option<String>,
    requests: Arc<Mutex<Vec<MomoPaymentRequest>>>,
}

impl MockMomoGateway {
    pub fn new(latency_ms: u64) -> Self {
        Self {
            latency_ms,
            ..Self::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub async fn requests(&self) -> Vec<MomoPaymentRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl MomoGateway for MockMomoGateway {
    async fn initiate(&self, request: &MomoPaymentRequest) -> Result<()> {
        self.requests.lock().await.push(request.clone());
        simulate(self.latency_ms).await;
        match &self.failure {
            Some(message) => Err(GateError::InitiationError(message.clone())),
            None => {
                tracing::info!(
                    network = %request.network,
                    amount = %request.amount,
                    "approval prompt sent"
                );
                Ok(())
            }
        }
    }
}
