//! Single-result purchase for students and parents.

use crate::domain::catalog::{AccessCredentials, ExamPricing, ExamResult, PaymentRequest};
use crate::domain::ports::{
    DynPaymentProcessor, DynPricingProvider, DynResultsProvider, ResultsProvider,
};
use crate::domain::sanitize;
use crate::domain::validation::{self, FormValidator, Rule};
use crate::error::{GateError, Result};
use crate::guard::SubmitGuard;
use std::sync::Arc;

pub const INDEX_NUMBER: &str = "indexNumber";
pub const PHONE: &str = "phone";
pub const EMAIL: &str = "email";

pub const CONTACT_REQUIRED: &str = "Please enter a phone number or email address";
pub const NO_EXAM_SELECTED: &str = "Please select an examination";

/// The purchase form: index number plus at least one way to deliver the codes.
pub fn checkout_form() -> FormValidator {
    FormValidator::new(
        [(INDEX_NUMBER, ""), (PHONE, ""), (EMAIL, "")],
        [
            (INDEX_NUMBER, vec![Rule::Required, Rule::IndexNumber]),
            (PHONE, vec![Rule::Phone]),
            (EMAIL, vec![Rule::Email]),
        ],
    )
}

fn first_error(form: &FormValidator) -> String {
    form.errors()
        .values()
        .flatten()
        .next()
        .cloned()
        .unwrap_or_else(|| validation::REQUIRED.to_string())
}

pub struct SingleCheckout {
    pricing: DynPricingProvider,
    payments: DynPaymentProcessor,
    results: DynResultsProvider,
    guard: SubmitGuard,
    exams: Vec<ExamPricing>,
    selected: Option<ExamPricing>,
    credentials: Option<AccessCredentials>,
}

impl SingleCheckout {
    /// Creates a new `SingleCheckout` instance.
    ///
    /// # Arguments
    ///
    /// * `pricing` - Source of the per-exam checker prices.
    /// * `payments` - Processor that charges the buyer and issues a PIN/Serial pair.
    /// * `results` - Provider used to view results with the issued credentials.
    /// * `guard` - Guard that drops duplicate checkout submissions.
    pub fn new(
        pricing: DynPricingProvider,
        payments: DynPaymentProcessor,
        results: DynResultsProvider,
        guard: SubmitGuard,
    ) -> Self {
        Self {
            pricing,
            payments,
            results,
            guard,
            exams: Vec::new(),
            selected: None,
            credentials: None,
        }
    }

    /// Fetches the exam prices and keeps them for [`SingleCheckout::select_exam`].
    pub async fn load_pricing(&mut self) -> Result<&[ExamPricing]> {
        self.exams = self.pricing.exam_pricing().await?;
        Ok(&self.exams)
    }

    /// Selects a loaded exam by id, ignoring case.
    ///
    /// # Arguments
    ///
    /// * `exam_id` - The exam id, for example `wassce`.
    pub fn select_exam(&mut self, exam_id: &str) -> Result<&ExamPricing> {
        let exam = self
            .exams
            .iter()
            .find(|e| e.id.eq_ignore_ascii_case(exam_id))
            .cloned()
            .ok_or_else(|| GateError::NotFound(format!("examination {exam_id}")))?;
        Ok(self.selected.insert(exam))
    }

    pub fn selected(&self) -> Option<&ExamPricing> {
        self.selected.as_ref()
    }

    pub fn credentials(&self) -> Option<&AccessCredentials> {
        self.credentials.as_ref()
    }

    /// Validates the form and pays for the selected exam.
    ///
    /// `Ok(None)` means the submit guard dropped a duplicate submission.
    pub async fn checkout(
        &mut self,
        form: &mut FormValidator,
    ) -> Result<Option<AccessCredentials>> {
        let exam = self
            .selected
            .clone()
            .ok_or_else(|| GateError::ValidationError(NO_EXAM_SELECTED.to_string()))?;
        if !form.validate_all() {
            return Err(GateError::ValidationError(first_error(form)));
        }

        let contact = if !form.value(PHONE).trim().is_empty() {
            sanitize::compact_phone(form.value(PHONE))
        } else {
            sanitize::sanitize_email(form.value(EMAIL))
        };
        if contact.is_empty() {
            return Err(GateError::ValidationError(CONTACT_REQUIRED.to_string()));
        }

        let request = PaymentRequest {
            exam_id: exam.id.clone(),
            index_number: sanitize::sanitize_index_number(form.value(INDEX_NUMBER)),
            contact,
            expected_total: exam.price,
        };
        let payments = Arc::clone(&self.payments);
        let Some(outcome) = self
            .guard
            .run(|| async move {
                let receipt = payments.process_payment(&request).await;
                receipt.map(|r| (request, r))
            })
            .await
        else {
            return Ok(None);
        };
        let (request, receipt) = outcome?;

        if receipt.confirmed_total != request.expected_total {
            tracing::warn!(
                expected = %request.expected_total,
                confirmed = %receipt.confirmed_total,
                "processor confirmed a different total"
            );
        }
        tracing::info!(
            transaction_id = %receipt.transaction_id,
            exam = %exam.name,
            "checker purchased"
        );

        let credentials = AccessCredentials {
            pin: receipt.pin,
            serial: receipt.serial,
            exam_type: exam.name,
            index_number: request.index_number,
            delivered_to: request.contact,
        };
        self.credentials = Some(credentials.clone());
        form.reset();
        Ok(Some(credentials))
    }

    /// Fetches results for the credentials bought in this checkout.
    pub async fn view_results(&self) -> Result<ExamResult> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| GateError::NotFound("purchased credentials".to_string()))?;
        self.results
            .fetch_results(&credentials.index_number, &credentials.pin, &credentials.serial)
            .await
    }
}

/// Checks a set of credentials the user typed in and fetches their results.
pub async fn lookup_results(
    provider: &dyn ResultsProvider,
    index_number: &str,
    pin: &str,
    serial: &str,
) -> Result<ExamResult> {
    let index_number = sanitize::sanitize_index_number(index_number);
    let pin = sanitize::sanitize_pin_serial(pin);
    let serial = sanitize::sanitize_pin_serial(serial);
    let problem = validation::required(&index_number)
        .or_else(|| validation::index_number(&index_number))
        .or_else(|| validation::required(&pin))
        .or_else(|| validation::pin(&pin))
        .or_else(|| validation::required(&serial))
        .or_else(|| validation::serial(&serial));
    if let Some(message) = problem {
        return Err(GateError::ValidationError(message.to_string()));
    }
    provider.fetch_results(&index_number, &pin, &serial).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockConfig;
    use crate::domain::money::Amount;
    use crate::infrastructure::mock::MockBackend;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn single() -> SingleCheckout {
        let backend = Arc::new(MockBackend::new(MockConfig::instant()));
        SingleCheckout::new(
            backend.clone(),
            backend.clone(),
            backend,
            SubmitGuard::new(Duration::from_millis(1000)),
        )
    }

    fn filled_form(index: &str, phone: &str, email: &str) -> FormValidator {
        let mut form = checkout_form();
        form.change(INDEX_NUMBER, index);
        form.change(PHONE, phone);
        form.change(EMAIL, email);
        form
    }

    #[tokio::test]
    async fn test_checkout_yields_credentials() {
        let mut checkout = single();
        checkout.load_pricing().await.unwrap();
        let exam = checkout.select_exam("WASSCE").unwrap();
        assert_eq!(exam.price, Amount::new(dec!(50)).unwrap());

        let mut form = filled_form("1234567890", "0545142658", "");
        let credentials = checkout.checkout(&mut form).await.unwrap().unwrap();
        assert_eq!(credentials.exam_type, "WASSCE");
        assert_eq!(credentials.delivered_to, "0545142658");
        assert_eq!(credentials.index_number, "1234567890");
        assert_eq!(form.value(INDEX_NUMBER), "");

        let result = checkout.view_results().await.unwrap();
        assert_eq!(result.pin, credentials.pin);
    }

    #[tokio::test]
    async fn test_checkout_requires_contact() {
        let mut checkout = single();
        checkout.load_pricing().await.unwrap();
        checkout.select_exam("bece").unwrap();

        let mut form = filled_form("1234567890", "", "");
        let err = checkout.checkout(&mut form).await.unwrap_err();
        assert!(matches!(err, GateError::ValidationError(ref m) if m == CONTACT_REQUIRED));

        let mut form = filled_form("1234567890", "", "parent@example.com");
        let credentials = checkout.checkout(&mut form).await.unwrap().unwrap();
        assert_eq!(credentials.delivered_to, "parent@example.com");
    }

    #[tokio::test]
    async fn test_checkout_reports_field_errors() {
        let mut checkout = single();
        checkout.load_pricing().await.unwrap();
        checkout.select_exam("wassce").unwrap();

        let mut form = filled_form("12345", "0545142658", "");
        let err = checkout.checkout(&mut form).await.unwrap_err();
        assert!(matches!(
            err,
            GateError::ValidationError(ref m) if m == validation::SHORT_INDEX_NUMBER
        ));
        assert_eq!(form.field_error(INDEX_NUMBER), Some(validation::SHORT_INDEX_NUMBER));
    }

    #[tokio::test]
    async fn test_unknown_exam_and_missing_selection() {
        let mut checkout = single();
        checkout.load_pricing().await.unwrap();
        assert!(matches!(checkout.select_exam("gce"), Err(GateError::NotFound(_))));

        let mut form = filled_form("1234567890", "0545142658", "");
        assert!(matches!(
            checkout.checkout(&mut form).await,
            Err(GateError::ValidationError(_))
        ));
        assert!(matches!(checkout.view_results().await, Err(GateError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_resubmission_is_dropped() {
        let mut checkout = single();
        checkout.load_pricing().await.unwrap();
        checkout.select_exam("wassce").unwrap();

        let mut form = filled_form("1234567890", "0545142658", "");
        assert!(checkout.checkout(&mut form).await.unwrap().is_some());
        let mut form = filled_form("1234567890", "0545142658", "");
        assert!(checkout.checkout(&mut form).await.unwrap().is_none());

        tokio::time::advance(Duration::from_millis(1000)).await;
        assert!(checkout.checkout(&mut form).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lookup_results_validates_input() {
        let backend = MockBackend::new(MockConfig::instant());
        let err = lookup_results(&backend, "1234567890", "ABC", "WA2024000000001")
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::ValidationError(ref m) if m == validation::SHORT_PIN));

        let result = lookup_results(&backend, "1234567890", "abcd1234", "wa2024000000001")
            .await
            .unwrap();
        assert_eq!(result.pin, "ABCD1234");
        assert_eq!(result.serial, "WA2024000000001");
    }
}
