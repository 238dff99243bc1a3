use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use availability_cell::{AvailabilityGateway, Slot, SupabaseAvailabilityGateway};
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::GatewayError;
use shared_utils::{Clock, SystemClock};

use crate::gateway::{AppointmentGateway, SupabaseAppointmentGateway};
use crate::models::{
    Appointment, AppointmentPatch, AppointmentStatus, BookAppointmentRequest, BookingError,
    CancelledBy, LifecycleError, NewAppointment, PaymentStatus,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::payment::PaymentService;
use crate::services::validation::validate_scheduled_at;

/// Books, moves and advances appointments against the configured availability.
pub struct BookingService {
    availability_gateway: Arc<dyn AvailabilityGateway>,
    appointment_gateway: Arc<dyn AppointmentGateway>,
    clock: Arc<dyn Clock>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
    payment_service: PaymentService,
    window_days: u32,
    prevent_double_booking: bool,
}

impl BookingService {
    pub fn new(
        availability_gateway: Arc<dyn AvailabilityGateway>,
        appointment_gateway: Arc<dyn AppointmentGateway>,
        clock: Arc<dyn Clock>,
        config: &AppConfig,
    ) -> Self {
        let conflict_service = ConflictDetectionService::new(Arc::clone(&appointment_gateway));

        Self {
            availability_gateway,
            appointment_gateway,
            clock,
            conflict_service,
            lifecycle_service: AppointmentLifecycleService::new(),
            payment_service: PaymentService::new(),
            window_days: config.booking_window_days,
            prevent_double_booking: config.prevent_double_booking,
        }
    }

    /// Service backed by the Supabase store and the system clock.
    pub fn with_supabase(config: &AppConfig, auth_token: &str) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let availability_gateway = Arc::new(SupabaseAvailabilityGateway::new(Arc::clone(&supabase), auth_token));
        let appointment_gateway = Arc::new(SupabaseAppointmentGateway::new(supabase, auth_token));

        Self::new(availability_gateway, appointment_gateway, Arc::new(SystemClock), config)
    }

    pub fn lifecycle(&self) -> &AppointmentLifecycleService {
        &self.lifecycle_service
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, GatewayError> {
        self.appointment_gateway.get(appointment_id).await
    }

    /// Book a new appointment in `pending` status.
    pub async fn create_appointment(&self, request: BookAppointmentRequest) -> Result<Appointment, BookingError> {
        info!(
            "Booking appointment for patient {} with provider {} at {}",
            request.patient_id, request.provider_id, request.scheduled_at
        );

        let slot = self
            .validate_slot(request.service_offering_id, request.scheduled_at)
            .await?;

        if self.prevent_double_booking {
            self.conflict_service
                .ensure_slot_free(request.provider_id, slot.starts_at(), None)
                .await?;
        }

        let new_appointment = NewAppointment {
            patient_id: request.patient_id,
            provider_id: request.provider_id,
            service_offering_id: request.service_offering_id,
            scheduled_at: slot.starts_at(),
            status: AppointmentStatus::Pending,
            payment_status: PaymentStatus::None,
            payment_method: request.payment_method,
            notes: request.notes,
        };

        let appointment = self
            .appointment_gateway
            .create(new_appointment)
            .await
            .map_err(|e| slot_taken_on_conflict(e, slot))?;

        // Online payments start out pending once the booking exists.
        let initial_payment = self.payment_service.initial_status(appointment.payment_method);
        let appointment = if initial_payment != appointment.payment_status {
            // The booking already exists; a failed payment write must not hide it.
            match self
                .appointment_gateway
                .update(appointment.id, AppointmentPatch::payment(initial_payment))
                .await
            {
                Ok(updated) => updated,
                Err(e) => {
                    warn!(
                        "Appointment {} booked but payment status stays {}: {}",
                        appointment.id, appointment.payment_status, e
                    );
                    appointment
                }
            }
        } else {
            appointment
        };

        info!("Appointment {} booked for {}", appointment.id, appointment.scheduled_at);
        Ok(appointment)
    }

    /// Move a pending or confirmed appointment to another currently offered slot.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        new_scheduled_at: NaiveDateTime,
    ) -> Result<Appointment, BookingError> {
        info!("Rescheduling appointment {} to {}", appointment_id, new_scheduled_at);

        let current = self.appointment_gateway.get(appointment_id).await?;
        self.lifecycle_service.ensure_reschedulable(&current)?;

        let slot = self
            .validate_slot(current.service_offering_id, new_scheduled_at)
            .await?;

        if self.prevent_double_booking {
            self.conflict_service
                .ensure_slot_free(current.provider_id, slot.starts_at(), Some(appointment_id))
                .await?;
        }

        let updated = self
            .appointment_gateway
            .update(appointment_id, AppointmentPatch::reschedule(slot.starts_at()))
            .await
            .map_err(|e| slot_taken_on_conflict(e, slot))?;

        info!("Appointment {} moved from {} to {}", appointment_id, current.scheduled_at, updated.scheduled_at);
        Ok(updated)
    }

    /// Validate the transition against the stored status, then persist it.
    pub async fn transition_status(
        &self,
        appointment_id: Uuid,
        target: AppointmentStatus,
    ) -> Result<Appointment, LifecycleError> {
        let current = self.appointment_gateway.get(appointment_id).await?;
        let next = self.lifecycle_service.transition_status(&current, target)?;

        let updated = self.appointment_gateway.set_status(appointment_id, next.status).await?;
        info!("Appointment {} status: {} -> {}", appointment_id, current.status, updated.status);
        Ok(updated)
    }

    pub async fn confirm_appointment(&self, appointment_id: Uuid) -> Result<Appointment, LifecycleError> {
        self.transition_status(appointment_id, AppointmentStatus::Confirmed).await
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        cancelled_by: CancelledBy,
    ) -> Result<Appointment, LifecycleError> {
        info!("Appointment {} cancellation requested by {:?}", appointment_id, cancelled_by);
        self.transition_status(appointment_id, AppointmentStatus::Cancelled).await
    }

    pub async fn complete_appointment(&self, appointment_id: Uuid) -> Result<Appointment, LifecycleError> {
        self.transition_status(appointment_id, AppointmentStatus::Completed).await
    }

    /// Record a payment outcome. The lifecycle status is left as is.
    pub async fn record_payment_status(
        &self,
        appointment_id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<Appointment, GatewayError> {
        debug!("Recording payment status {} for appointment {}", payment_status, appointment_id);
        self.appointment_gateway
            .update(appointment_id, AppointmentPatch::payment(payment_status))
            .await
    }

    async fn validate_slot(
        &self,
        service_offering_id: Uuid,
        scheduled_at: NaiveDateTime,
    ) -> Result<Slot, BookingError> {
        let availability = self.availability_gateway.list(service_offering_id).await?;
        let now = self.clock.now();

        validate_scheduled_at(&availability, scheduled_at, now, self.window_days).map_err(|e| {
            warn!("Rejected {} for service offering {}: {}", scheduled_at, service_offering_id, e);
            e
        })
    }
}

fn slot_taken_on_conflict(error: GatewayError, slot: Slot) -> BookingError {
    match error {
        GatewayError::Conflict(_) => BookingError::SlotAlreadyTaken {
            requested: slot.starts_at(),
        },
        other => BookingError::Gateway(other),
    }
}
