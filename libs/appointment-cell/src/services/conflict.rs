use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::gateway::AppointmentGateway;
use crate::models::{Appointment, BookingError};

/// Guards against two active appointments of one provider sharing a start time.
pub struct ConflictDetectionService {
    gateway: Arc<dyn AppointmentGateway>,
}

impl ConflictDetectionService {
    pub fn new(gateway: Arc<dyn AppointmentGateway>) -> Self {
        Self { gateway }
    }

    /// Fail with `SlotAlreadyTaken` when another pending or confirmed appointment
    /// of `provider_id` starts at `scheduled_at`.
    pub async fn ensure_slot_free(
        &self,
        provider_id: Uuid,
        scheduled_at: NaiveDateTime,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), BookingError> {
        debug!("Checking conflicts for provider {} at {}", provider_id, scheduled_at);

        let existing = self.gateway.find_active_at(provider_id, scheduled_at).await?;
        let conflicts = conflicting(&existing, exclude_appointment_id);

        if let Some(conflict) = conflicts.first() {
            warn!(
                "Provider {} already booked at {} (appointment {})",
                provider_id, scheduled_at, conflict.id
            );
            return Err(BookingError::SlotAlreadyTaken { requested: scheduled_at });
        }

        Ok(())
    }
}

/// Active appointments other than the one being moved.
fn conflicting(existing: &[Appointment], exclude_appointment_id: Option<Uuid>) -> Vec<&Appointment> {
    existing
        .iter()
        .filter(|appointment| appointment.status.is_active())
        .filter(|appointment| Some(appointment.id) != exclude_appointment_id)
        .collect()
}
