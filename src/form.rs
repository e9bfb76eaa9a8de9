// 📝 Registration Form - input validation and the two submit flows
//
// Input is checked here, before the registration workflow runs.
// Exactly one flow is active per surface:
// - Direct: register immediately
// - Simulated: a backend that accepts or rejects after a delay

use crate::catalog::Catalog;
use crate::registration::{register, RegistrationError};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const PENDING_MESSAGE: &str = "Submitting registration...";
pub const BACKEND_SUCCESS_MESSAGE: &str = "Registration successful!";

// ============================================================================
// FORM INPUT
// ============================================================================

/// Raw form fields as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    /// Selected event id, still unparsed
    pub event_select: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please fill all fields correctly.")]
    Incomplete,

    #[error("Please enter a valid email.")]
    InvalidEmail,
}

/// A form that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub event_id: u32,
}

impl RegistrationForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        event_select: impl Into<String>,
    ) -> Self {
        RegistrationForm {
            name: name.into(),
            email: email.into(),
            event_select: event_select.into(),
        }
    }

    pub fn validate(&self) -> Result<Submission, FormError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let event_id = u32::from_str(self.event_select.trim()).ok();

        let event_id = match event_id {
            Some(id) if !name.is_empty() && !email.is_empty() => id,
            _ => return Err(FormError::Incomplete),
        };

        if !email.contains('@') {
            return Err(FormError::InvalidEmail);
        }

        Ok(Submission {
            name: name.to_string(),
            email: email.to_string(),
            event_id,
        })
    }

    pub fn reset(&mut self) {
        *self = RegistrationForm::default();
    }
}

// ============================================================================
// SUBMIT FLOWS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitFlow {
    #[default]
    Direct,
    Simulated,
}

impl FromStr for SubmitFlow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(SubmitFlow::Direct),
            "simulated" => Ok(SubmitFlow::Simulated),
            other => Err(format!("unknown submit flow: {other:?} (expected direct or simulated)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("Registration failed. Please try again.")]
    Rejected,
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub event_id: u32,
    pub seats_left: u32,
    pub message: String,
}

/// Direct flow: validate, then register right away
pub fn submit_direct(
    catalog: &mut Catalog,
    form: &RegistrationForm,
    reference_date: NaiveDate,
) -> Result<Confirmation, SubmitError> {
    let submission = form.validate()?;
    let seats_left = register(catalog, submission.event_id, reference_date)?;

    Ok(Confirmation {
        event_id: submission.event_id,
        seats_left,
        message: format!("Thanks {}! You have registered successfully.", submission.name),
    })
}

/// Stand-in for a remote registration endpoint
pub trait RegistrationBackend {
    /// Whether the backend accepts this submission
    fn accept(&mut self, submission: &Submission) -> bool;

    /// Artificial round-trip time
    fn latency(&self) -> Duration;
}

/// Accepts with probability `success_rate` after `delay`
#[derive(Debug)]
pub struct SimulatedBackend {
    success_rate: f64,
    delay: Duration,
    rng: StdRng,
}

impl SimulatedBackend {
    pub fn new(success_rate: f64, delay: Duration) -> Self {
        SimulatedBackend {
            success_rate: success_rate.clamp(0.0, 1.0),
            delay,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible outcomes
    pub fn seeded(success_rate: f64, delay: Duration, seed: u64) -> Self {
        SimulatedBackend {
            success_rate: success_rate.clamp(0.0, 1.0),
            delay,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RegistrationBackend for SimulatedBackend {
    fn accept(&mut self, submission: &Submission) -> bool {
        let accepted = self.rng.gen_bool(self.success_rate);
        tracing::debug!(event_id = submission.event_id, accepted, "simulated backend decision");
        accepted
    }

    fn latency(&self) -> Duration {
        self.delay
    }
}

/// Apply a backend decision to the catalog. Rejected submissions touch nothing.
pub fn complete_submission(
    catalog: &mut Catalog,
    submission: &Submission,
    accepted: bool,
    reference_date: NaiveDate,
) -> Result<Confirmation, SubmitError> {
    if !accepted {
        tracing::warn!(event_id = submission.event_id, "backend rejected registration");
        return Err(SubmitError::Rejected);
    }

    let seats_left = register(catalog, submission.event_id, reference_date)?;
    Ok(Confirmation {
        event_id: submission.event_id,
        seats_left,
        message: BACKEND_SUCCESS_MESSAGE.to_string(),
    })
}

/// Simulated flow: validate, wait for the backend, then register on acceptance
pub async fn submit_simulated<B: RegistrationBackend>(
    catalog: &mut Catalog,
    backend: &mut B,
    form: &RegistrationForm,
    reference_date: NaiveDate,
) -> Result<Confirmation, SubmitError> {
    let submission = form.validate()?;
    let accepted = backend.accept(&submission);
    tokio::time::sleep(backend.latency()).await;
    complete_submission(catalog, &submission, accepted, reference_date)
}

// ============================================================================
// TESTS
// ============================================================================
