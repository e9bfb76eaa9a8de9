// ✍️ Registration Workflow - validate, then consume exactly one seat

use crate::catalog::{is_valid, Catalog};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Event not found.")]
    NotFound(u32),

    #[error("Event is full or already passed.")]
    Unavailable { id: u32, name: String },
}

impl RegistrationError {
    pub fn event_id(&self) -> u32 {
        match self {
            RegistrationError::NotFound(id) => *id,
            RegistrationError::Unavailable { id, .. } => *id,
        }
    }
}

/// Register one attendee for event `id`.
///
/// Returns the remaining seat count after the decrement. No record is
/// touched when this fails.
pub fn register(
    catalog: &mut Catalog,
    id: u32,
    reference_date: NaiveDate,
) -> Result<u32, RegistrationError> {
    let event = catalog.find_mut(id).ok_or_else(|| {
        tracing::warn!(event_id = id, "registration failed: event not found");
        RegistrationError::NotFound(id)
    })?;

    if !is_valid(event, reference_date) {
        tracing::warn!(event_id = id, event = %event.name, "registration failed: full or past");
        return Err(RegistrationError::Unavailable {
            id,
            name: event.name.clone(),
        });
    }

    event.seats -= 1;
    tracing::info!(event_id = id, event = %event.name, seats_left = event.seats, "registered");
    Ok(event.seats)
}

// ============================================================================
// REGISTRAR
// ============================================================================

/// Registration handle bound to one event.
///
/// Counts the registrations it has performed itself; failed attempts
/// leave the counter alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registrar {
    event_id: u32,
    total_registrations: u32,
}

impl Registrar {
    pub fn new(event_id: u32) -> Self {
        Registrar {
            event_id,
            total_registrations: 0,
        }
    }

    pub fn event_id(&self) -> u32 {
        self.event_id
    }

    pub fn total_registrations(&self) -> u32 {
        self.total_registrations
    }

    pub fn register(
        &mut self,
        catalog: &mut Catalog,
        reference_date: NaiveDate,
    ) -> Result<u32, RegistrationError> {
        let seats_left = register(catalog, self.event_id, reference_date)?;
        self.total_registrations += 1;
        Ok(seats_left)
    }
}

// ============================================================================
// TESTS
// ============================================================================
