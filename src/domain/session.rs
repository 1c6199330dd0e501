//! Mobile-money payment modal.
//!
//! The modal is a synchronous state machine. Every user action and every
//! async completion is an [`ModalEvent`] fed to [`PaymentModal::apply`], which
//! mutates the session and returns the [`Effect`] the caller has to run next.
//!
//! ```text
//!   Open ──▶ Input ──Proceed──▶ Confirm ──Confirm──▶ Processing ──PromptReady──▶ Prompt
//!              ▲                  │                     │                         │
//!              └──────Back────────┘                     │                      Approve
//!              ▲                                        │                         ▼
//!              └──────────InitiationFailed──────────────┘                   Completed
//! ```
//!
//! Async completions carry the epoch of the session that started them. Each
//! `Open` starts a new epoch, so a completion that belongs to an abandoned
//! session is ignored.

use crate::domain::money::Amount;
use crate::domain::network::{self, Network};
use crate::error::{GateError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_PHONE_DIGITS: usize = 10;

pub const INVALID_NETWORK: &str =
    "Invalid network. Please use MTN, AirtelTigo, or Telecel number.";
pub const INCOMPLETE_NUMBER: &str = "Please enter a valid 10-digit phone number";
pub const UNSUPPORTED_NETWORK: &str = "Please use a valid MTN, AirtelTigo, or Telecel number";
pub const INITIATION_FAILED: &str = "Payment initiation failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Input,
    Confirm,
    Processing,
    Prompt,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Input => "input",
            Step::Confirm => "confirm",
            Step::Processing => "processing",
            Step::Prompt => "prompt",
        };
        f.write_str(name)
    }
}

/// State of one open modal.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSession {
    phone_number: String,
    detected_network: Option<Network>,
    step: Step,
    amount: Amount,
    exam_type: String,
    error: Option<String>,
    epoch: u64,
}

impl PaymentSession {
    fn new(amount: Amount, exam_type: String, epoch: u64) -> Self {
        Self {
            phone_number: String::new(),
            detected_network: None,
            step: Step::Input,
            amount,
            exam_type,
            error: None,
            epoch,
        }
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn detected_network(&self) -> Option<Network> {
        self.detected_network
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn exam_type(&self) -> &str {
        &self.exam_type
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn formatted_number(&self) -> String {
        network::format_phone_number(&self.phone_number)
    }

    /// True when the number is complete and belongs to a known carrier.
    pub fn can_proceed(&self) -> bool {
        self.step == Step::Input
            && self.phone_number.len() == MAX_PHONE_DIGITS
            && self.detected_network.is_some()
    }

    // The network is only ever derived from the digits held in `phone_number`.
    fn refresh_detection(&mut self) {
        let len = self.phone_number.len();
        if len >= 3 {
            self.detected_network = network::detect_network(&self.phone_number);
            self.error = if len >= MAX_PHONE_DIGITS && self.detected_network.is_none() {
                Some(INVALID_NETWORK.to_string())
            } else {
                None
            };
        } else {
            self.detected_network = None;
            self.error = None;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent {
    Open,
    Close,
    PhoneChanged(String),
    Proceed,
    Back,
    Confirm,
    InitiationSucceeded { epoch: u64 },
    InitiationFailed { epoch: u64, message: Option<String> },
    PromptReady { epoch: u64 },
    Approve,
}

/// What the gateway needs to push an approval prompt to the payer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoPaymentRequest {
    pub momo_number: String,
    pub network: Network,
    pub amount: Amount,
    pub exam_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSuccess {
    pub momo_number: String,
    pub network: Network,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Call the gateway, then report back with `InitiationSucceeded`/`InitiationFailed`.
    Initiate { epoch: u64, request: MomoPaymentRequest },
    /// Wait for the prompt delay, then report `PromptReady`.
    AwaitPrompt { epoch: u64 },
    /// Initiation failed and the session is back at `Input`.
    Reverted { message: String },
    Completed(PaymentSuccess),
    Closed,
}

/// The payment modal for one purchase amount.
#[derive(Debug, Clone)]
pub struct PaymentModal {
    amount: Amount,
    exam_type: String,
    session: Option<PaymentSession>,
    last_epoch: u64,
}

impl PaymentModal {
    pub fn new(amount: Amount, exam_type: impl Into<String>) -> Self {
        Self {
            amount,
            exam_type: exam_type.into(),
            session: None,
            last_epoch: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&PaymentSession> {
        self.session.as_ref()
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn exam_type(&self) -> &str {
        &self.exam_type
    }

    /// The single transition function.
    pub fn apply(&mut self, event: ModalEvent) -> Result<Effect> {
        tracing::trace!(?event, "modal event");
        match event {
            ModalEvent::Open => {
                self.last_epoch += 1;
                self.session = Some(PaymentSession::new(
                    self.amount,
                    self.exam_type.clone(),
                    self.last_epoch,
                ));
                tracing::debug!(epoch = self.last_epoch, "payment modal opened");
                Ok(Effect::None)
            }
            ModalEvent::Close => match self.session.take() {
                Some(session) => {
                    tracing::debug!(
                        epoch = session.epoch,
                        step = %session.step,
                        "payment modal closed"
                    );
                    Ok(Effect::Closed)
                }
                None => Ok(Effect::None),
            },
            ModalEvent::PhoneChanged(raw) => {
                let session = self.session_in(Step::Input, "edit the number")?;
                let cleaned = network::digits(&raw);
                if cleaned.len() > MAX_PHONE_DIGITS {
                    return Ok(Effect::None);
                }
                session.phone_number = cleaned;
                session.refresh_detection();
                Ok(Effect::None)
            }
            ModalEvent::Proceed => {
                let session = self.session_in(Step::Input, "proceed")?;
                if session.phone_number.len() < MAX_PHONE_DIGITS {
                    session.error = Some(INCOMPLETE_NUMBER.to_string());
                    return Err(GateError::ValidationError(INCOMPLETE_NUMBER.to_string()));
                }
                if session.detected_network.is_none() {
                    session.error = Some(UNSUPPORTED_NETWORK.to_string());
                    return Err(GateError::ValidationError(UNSUPPORTED_NETWORK.to_string()));
                }
                session.step = Step::Confirm;
                tracing::debug!(network = ?session.detected_network, "number accepted");
                Ok(Effect::None)
            }
            ModalEvent::Back => {
                let session = self.session_in(Step::Confirm, "go back")?;
                session.step = Step::Input;
                Ok(Effect::None)
            }
            ModalEvent::Confirm => {
                let session = self.session_in(Step::Confirm, "confirm")?;
                let network = session
                    .detected_network
                    .ok_or_else(|| GateError::ValidationError(UNSUPPORTED_NETWORK.to_string()))?;
                session.step = Step::Processing;
                let request = MomoPaymentRequest {
                    momo_number: session.phone_number.clone(),
                    network,
                    amount: session.amount,
                    exam_type: session.exam_type.clone(),
                };
                Ok(Effect::Initiate {
                    epoch: session.epoch,
                    request,
                })
            }
            ModalEvent::InitiationSucceeded { epoch } => Ok(match self.current(epoch) {
                Some(_) => Effect::AwaitPrompt { epoch },
                None => Effect::None,
            }),
            ModalEvent::InitiationFailed { epoch, message } => {
                let Some(session) = self.current(epoch) else {
                    return Ok(Effect::None);
                };
                let message = message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| INITIATION_FAILED.to_string());
                session.step = Step::Input;
                session.error = Some(message.clone());
                Ok(Effect::Reverted { message })
            }
            ModalEvent::PromptReady { epoch } => {
                if let Some(session) = self.current(epoch) {
                    session.step = Step::Prompt;
                }
                Ok(Effect::None)
            }
            ModalEvent::Approve => {
                self.session_in(Step::Prompt, "approve")?;
                let Some(session) = self.session.take() else {
                    return Err(GateError::ModalClosed);
                };
                let network = session
                    .detected_network
                    .ok_or_else(|| GateError::ValidationError(UNSUPPORTED_NETWORK.to_string()))?;
                Ok(Effect::Completed(PaymentSuccess {
                    momo_number: session.phone_number,
                    network,
                    amount: session.amount,
                }))
            }
        }
    }

    fn session_in(&mut self, step: Step, action: &'static str) -> Result<&mut PaymentSession> {
        let session = self.session.as_mut().ok_or(GateError::ModalClosed)?;
        if session.step != step {
            return Err(GateError::InvalidTransition {
                action,
                step: session.step,
            });
        }
        Ok(session)
    }

    // Processing session matching `epoch`, or None when the completion is stale.
    fn current(&mut self, epoch: u64) -> Option<&mut PaymentSession> {
        match self.session.as_mut() {
            Some(session) if session.epoch == epoch && session.step == Step::Processing => {
                Some(session)
            }
            _ => {
                tracing::debug!(epoch, "ignoring stale payment completion");
                None
            }
        }
    }
}
