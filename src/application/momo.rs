//! Drives a [`PaymentModal`] against a mobile-money gateway.
//!
//! The modal decides every transition. This driver runs the effects it asks
//! for (gateway call, prompt delay) and races each of them against the close
//! signal, so closing the modal drops whatever was in flight.

use crate::domain::money::Amount;
use crate::domain::ports::DynMomoGateway;
use crate::domain::session::{Effect, ModalEvent, PaymentModal, PaymentSession, PaymentSuccess};
use crate::error::{GateError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Closes the checkout from another task.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    closed: Arc<watch::Sender<bool>>,
}

impl CloseHandle {
    pub fn close(&self) {
        self.closed.send_replace(true);
    }
}

pub struct MomoCheckout {
    modal: PaymentModal,
    gateway: DynMomoGateway,
    prompt_delay: Duration,
    closed: Arc<watch::Sender<bool>>,
}

impl MomoCheckout {
    /// Creates a new `MomoCheckout` instance with the modal closed.
    ///
    /// # Arguments
    ///
    /// * `amount` - The amount the payer is asked to approve.
    /// * `exam_type` - The exam the payment is for, sent with the request.
    /// * `gateway` - The gateway that initiates the mobile-money charge.
    /// * `prompt_delay` - Wait between a successful initiation and the prompt step.
    pub fn new(
        amount: Amount,
        exam_type: impl Into<String>,
        gateway: DynMomoGateway,
        prompt_delay: Duration,
    ) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            modal: PaymentModal::new(amount, exam_type),
            gateway,
            prompt_delay,
            closed: Arc::new(closed),
        }
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            closed: Arc::clone(&self.closed),
        }
    }

    pub fn is_open(&self) -> bool {
        self.modal.is_open()
    }

    pub fn session(&self) -> Option<&PaymentSession> {
        self.modal.session()
    }

    /// Opens a fresh session, discarding any previous one.
    pub fn open(&mut self) -> Result<()> {
        self.closed.send_replace(false);
        self.modal.apply(ModalEvent::Open)?;
        Ok(())
    }

    /// Returns true when an open session was closed.
    pub fn close(&mut self) -> Result<bool> {
        self.closed.send_replace(true);
        Ok(self.modal.apply(ModalEvent::Close)? == Effect::Closed)
    }

    pub fn input(&mut self, raw: &str) -> Result<()> {
        self.sync_close()?;
        self.modal.apply(ModalEvent::PhoneChanged(raw.to_string()))?;
        Ok(())
    }

    pub fn proceed(&mut self) -> Result<()> {
        self.sync_close()?;
        self.modal.apply(ModalEvent::Proceed)?;
        Ok(())
    }

    pub fn back(&mut self) -> Result<()> {
        self.sync_close()?;
        self.modal.apply(ModalEvent::Back)?;
        Ok(())
    }

    /// Confirms the payment and waits until the approval prompt is showing.
    ///
    /// On a gateway failure the session returns to the input step and the
    /// failure message is returned. Closing the modal meanwhile yields
    /// [`GateError::Cancelled`].
    pub async fn confirm(&mut self) -> Result<()> {
        self.sync_close()?;
        let Effect::Initiate { epoch, request } = self.modal.apply(ModalEvent::Confirm)? else {
            return Ok(());
        };
        tracing::info!(
            network = %request.network,
            amount = %request.amount,
            exam_type = %request.exam_type,
            "initiating momo payment"
        );

        let gateway = Arc::clone(&self.gateway);
        let mut closed = self.closed.subscribe();
        let initiated = tokio::select! {
            result = gateway.initiate(&request) => Some(result),
            _ = closed.wait_for(|closed| *closed) => None,
        };
        let Some(result) = initiated else {
            return self.cancel(epoch);
        };

        let event = match result {
            Ok(()) => ModalEvent::InitiationSucceeded { epoch },
            Err(e) => ModalEvent::InitiationFailed {
                epoch,
                message: Some(match e {
                    GateError::InitiationError(message) => message,
                    other => other.to_string(),
                }),
            },
        };
        match self.modal.apply(event)? {
            Effect::AwaitPrompt { epoch } => self.await_prompt(epoch).await,
            Effect::Reverted { message } => {
                tracing::warn!(reason = %message, "momo initiation failed");
                Err(GateError::InitiationError(message))
            }
            _ => Err(GateError::ModalClosed),
        }
    }

    /// Records the payer's approval and closes the modal.
    pub fn approve(&mut self) -> Result<PaymentSuccess> {
        self.sync_close()?;
        match self.modal.apply(ModalEvent::Approve)? {
            Effect::Completed(success) => {
                tracing::info!(
                    network = %success.network,
                    amount = %success.amount,
                    "momo payment approved"
                );
                Ok(success)
            }
            _ => Err(GateError::ModalClosed),
        }
    }

    async fn await_prompt(&mut self, epoch: u64) -> Result<()> {
        let mut closed = self.closed.subscribe();
        let ready = tokio::select! {
            _ = tokio::time::sleep(self.prompt_delay) => true,
            _ = closed.wait_for(|closed| *closed) => false,
        };
        if !ready {
            return self.cancel(epoch);
        }
        self.modal.apply(ModalEvent::PromptReady { epoch })?;
        Ok(())
    }

    fn cancel(&mut self, epoch: u64) -> Result<()> {
        self.modal.apply(ModalEvent::Close)?;
        tracing::debug!(epoch, "payment cancelled by close");
        Err(GateError::Cancelled)
    }

    // Applies a close requested through a `CloseHandle` while nothing was awaiting.
    fn sync_close(&mut self) -> Result<()> {
        if *self.closed.borrow() && self.modal.is_open() {
            self.modal.apply(ModalEvent::Close)?;
        }
        Ok(())
    }
}
