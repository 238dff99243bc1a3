use tracing::{debug, warn};

use crate::models::{Appointment, AppointmentAction, AppointmentStatus, BookingError, LifecycleError};
use crate::services::payment::PaymentService;

/// Status workflow of an appointment. Pure: no I/O, no clock.
#[derive(Debug, Clone, Default)]
pub struct AppointmentLifecycleService {
    payment_service: PaymentService,
}

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all valid next statuses for a given current status
    pub fn valid_transitions(&self, current_status: AppointmentStatus) -> &'static [AppointmentStatus] {
        match current_status {
            AppointmentStatus::Pending => &[AppointmentStatus::Confirmed, AppointmentStatus::Cancelled],
            AppointmentStatus::Confirmed => &[AppointmentStatus::Completed, AppointmentStatus::Cancelled],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
        }
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), LifecycleError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(LifecycleError::InvalidTransition {
                from: current_status,
                to: new_status,
            });
        }

        Ok(())
    }

    /// Copy of `appointment` in `target` status; the input is left untouched.
    pub fn transition_status(
        &self,
        appointment: &Appointment,
        target: AppointmentStatus,
    ) -> Result<Appointment, LifecycleError> {
        self.validate_status_transition(appointment.status, target)?;

        Ok(Appointment {
            status: target,
            ..appointment.clone()
        })
    }

    pub fn is_terminal(&self, status: AppointmentStatus) -> bool {
        self.valid_transitions(status).is_empty()
    }

    /// Only pending and confirmed appointments may move to another slot.
    pub fn ensure_reschedulable(&self, appointment: &Appointment) -> Result<(), BookingError> {
        if !appointment.status.is_active() {
            warn!(
                "Reschedule rejected for appointment {} in status {}",
                appointment.id, appointment.status
            );
            return Err(BookingError::NotReschedulable(appointment.status));
        }
        Ok(())
    }

    pub fn available_actions(&self, appointment: &Appointment) -> Vec<AppointmentAction> {
        let mut actions = match appointment.status {
            AppointmentStatus::Pending => vec![
                AppointmentAction::Confirm,
                AppointmentAction::Cancel,
                AppointmentAction::Reschedule,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentAction::Complete,
                AppointmentAction::Cancel,
                AppointmentAction::Reschedule,
            ],
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => Vec::new(),
        };

        if self.payment_service.can_pay_now(appointment) {
            actions.push(AppointmentAction::PayNow);
        }

        actions
    }
}

/// Free-standing form of [`AppointmentLifecycleService::transition_status`].
pub fn transition_status(
    appointment: &Appointment,
    target: AppointmentStatus,
) -> Result<Appointment, LifecycleError> {
    AppointmentLifecycleService::new().transition_status(appointment, target)
}
