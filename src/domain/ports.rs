use super::auth::{AdminSession, CustomerSession, ImportSummary, PinPage};
use super::catalog::{
    BulkTier, CodeDispatch, DashboardStats, ExamPricing, ExamResult, Order, OrderHistory,
    PaymentReceipt, PaymentRequest, Verification,
};
use super::session::MomoPaymentRequest;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait PricingProvider: Send + Sync {
    async fn exam_pricing(&self) -> Result<Vec<ExamPricing>>;
    async fn bulk_pricing(&self) -> Result<Vec<BulkTier>>;
}

/// Sends the mobile-money approval prompt to the payer's handset.
#[async_trait]
pub trait MomoGateway: Send + Sync {
    async fn initiate(&self, request: &MomoPaymentRequest) -> Result<()>;
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn process_payment(&self, request: &PaymentRequest) -> Result<PaymentReceipt>;
}

#[async_trait]
pub trait VerificationService: Send + Sync {
    async fn send_code(&self, contact: &str) -> Result<CodeDispatch>;
    async fn verify_code(&self, contact: &str, code: &str) -> Result<Verification>;
}

#[async_trait]
pub trait ResultsProvider: Send + Sync {
    async fn fetch_results(&self, index_number: &str, pin: &str, serial: &str)
    -> Result<ExamResult>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn user_orders(&self) -> Result<OrderHistory>;
    async fn dashboard_stats(&self) -> Result<DashboardStats>;
    async fn place_bulk_order(&self, session: &CustomerSession, tier: &BulkTier) -> Result<Order>;
}

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn login(&self, password: &str) -> Result<AdminSession>;
    async fn stats(&self, session: &AdminSession) -> Result<serde_json::Value>;
    async fn pins(&self, session: &AdminSession, page: u32) -> Result<PinPage>;
    async fn import_pins(
        &self,
        session: &AdminSession,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<ImportSummary>;
}

pub type DynPricingProvider = Arc<dyn PricingProvider>;
pub type DynMomoGateway = Arc<dyn MomoGateway>;
pub type DynPaymentProcessor = Arc<dyn PaymentProcessor>;
pub type DynVerificationService = Arc<dyn VerificationService>;
pub type DynResultsProvider = Arc<dyn ResultsProvider>;
pub type DynOrderRepository = Arc<dyn OrderRepository>;
pub type DynAdminApi = Arc<dyn AdminApi>;
