#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime, Weekday};
use uuid::Uuid;

use appointment_cell::{
    Appointment, AppointmentGateway, AppointmentPatch, AppointmentStatus, BookingService,
    NewAppointment, PaymentMethod, PaymentStatus,
};
use availability_cell::{AvailabilityGateway, AvailabilityPatch, NewAvailability, WeeklyAvailability};
use shared_models::GatewayError;
use shared_utils::test_utils::{at, init_test_tracing, TestConfig};
use shared_utils::FixedClock;

/// Availability store held in memory.
#[derive(Default)]
pub struct InMemoryAvailability {
    blocks: Mutex<Vec<WeeklyAvailability>>,
}

impl InMemoryAvailability {
    pub fn add_block(&self, service_offering_id: Uuid, day: Weekday, start: (u32, u32), end: (u32, u32)) {
        self.blocks.lock().unwrap().push(WeeklyAvailability {
            id: Uuid::new_v4(),
            service_offering_id,
            day_of_week: day,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        });
    }
}

#[async_trait]
impl AvailabilityGateway for InMemoryAvailability {
    async fn list(&self, service_offering_id: Uuid) -> Result<Vec<WeeklyAvailability>, GatewayError> {
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .iter()
            .filter(|block| block.service_offering_id == service_offering_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<WeeklyAvailability, GatewayError> {
        self.blocks
            .lock()
            .unwrap()
            .iter()
            .find(|block| block.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound("Availability not found".into()))
    }

    async fn create(&self, availability: NewAvailability) -> Result<WeeklyAvailability, GatewayError> {
        let block = WeeklyAvailability {
            id: Uuid::new_v4(),
            service_offering_id: availability.service_offering_id,
            day_of_week: availability.day_of_week,
            start_time: availability.start_time,
            end_time: availability.end_time,
        };
        self.blocks.lock().unwrap().push(block.clone());
        Ok(block)
    }

    async fn update(&self, id: Uuid, patch: AvailabilityPatch) -> Result<WeeklyAvailability, GatewayError> {
        let mut blocks = self.blocks.lock().unwrap();
        let block = blocks
            .iter_mut()
            .find(|block| block.id == id)
            .ok_or_else(|| GatewayError::NotFound("Availability not found".into()))?;

        if let Some(day) = patch.day_of_week {
            block.day_of_week = day;
        }
        if let Some(start) = patch.start_time {
            block.start_time = start;
        }
        if let Some(end) = patch.end_time {
            block.end_time = end;
        }
        Ok(block.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), GatewayError> {
        self.blocks.lock().unwrap().retain(|block| block.id != id);
        Ok(())
    }
}

/// Appointment store held in memory. With `unique_slots` it behaves like a
/// uniqueness constraint on (provider, scheduled_at) over active rows.
#[derive(Default)]
pub struct InMemoryAppointments {
    rows: Mutex<HashMap<Uuid, Appointment>>,
    unique_slots: bool,
}

impl InMemoryAppointments {
    pub fn with_unique_slots() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            unique_slots: true,
        }
    }

    pub fn insert(&self, appointment: Appointment) {
        self.rows.lock().unwrap().insert(appointment.id, appointment);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn stored(&self, id: Uuid) -> Option<Appointment> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn slot_taken(
        rows: &HashMap<Uuid, Appointment>,
        provider_id: Uuid,
        scheduled_at: NaiveDateTime,
        except: Option<Uuid>,
    ) -> bool {
        rows.values().any(|row| {
            row.provider_id == provider_id
                && row.scheduled_at == scheduled_at
                && row.status.is_active()
                && Some(row.id) != except
        })
    }
}

#[async_trait]
impl AppointmentGateway for InMemoryAppointments {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, GatewayError> {
        let mut rows = self.rows.lock().unwrap();
        if self.unique_slots && Self::slot_taken(&rows, appointment.provider_id, appointment.scheduled_at, None) {
            return Err(GatewayError::Conflict("duplicate key value violates unique constraint".into()));
        }

        let created = Appointment {
            id: Uuid::new_v4(),
            patient_id: appointment.patient_id,
            provider_id: appointment.provider_id,
            service_offering_id: appointment.service_offering_id,
            scheduled_at: appointment.scheduled_at,
            status: appointment.status,
            payment_status: appointment.payment_status,
            payment_method: appointment.payment_method,
            notes: appointment.notes,
        };
        rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, GatewayError> {
        self.stored(id)
            .ok_or_else(|| GatewayError::NotFound("Appointment not found".into()))
    }

    async fn update(&self, id: Uuid, patch: AppointmentPatch) -> Result<Appointment, GatewayError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(scheduled_at) = patch.scheduled_at {
            let provider_id = rows
                .get(&id)
                .map(|row| row.provider_id)
                .ok_or_else(|| GatewayError::NotFound("Appointment not found".into()))?;
            if self.unique_slots && Self::slot_taken(&rows, provider_id, scheduled_at, Some(id)) {
                return Err(GatewayError::Conflict("duplicate key value violates unique constraint".into()));
            }
        }

        let row = rows
            .get_mut(&id)
            .ok_or_else(|| GatewayError::NotFound("Appointment not found".into()))?;
        if let Some(scheduled_at) = patch.scheduled_at {
            row.scheduled_at = scheduled_at;
        }
        if let Some(payment_status) = patch.payment_status {
            row.payment_status = payment_status;
        }
        if let Some(notes) = patch.notes {
            row.notes = Some(notes);
        }
        Ok(row.clone())
    }

    async fn set_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, GatewayError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&id)
            .ok_or_else(|| GatewayError::NotFound("Appointment not found".into()))?;
        row.status = status;
        Ok(row.clone())
    }

    async fn find_active_at(
        &self,
        provider_id: Uuid,
        scheduled_at: NaiveDateTime,
    ) -> Result<Vec<Appointment>, GatewayError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|row| row.provider_id == provider_id && row.scheduled_at == scheduled_at && row.status.is_active())
            .cloned()
            .collect())
    }
}

pub fn appointment(status: AppointmentStatus, scheduled_at: NaiveDateTime) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        provider_id: Uuid::new_v4(),
        service_offering_id: Uuid::new_v4(),
        scheduled_at,
        status,
        payment_status: PaymentStatus::None,
        payment_method: PaymentMethod::InPerson,
        notes: None,
    }
}

/// Booking service over in-memory stores. The clock starts on Monday
/// 2025-06-16 08:00 and the offering is open Mondays 09:00-10:00.
pub struct TestSetup {
    pub service: BookingService,
    pub availability: Arc<InMemoryAvailability>,
    pub appointments: Arc<InMemoryAppointments>,
    pub clock: Arc<FixedClock>,
    pub service_offering_id: Uuid,
    pub provider_id: Uuid,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::build(InMemoryAppointments::default(), TestConfig::default())
    }

    pub fn build(appointments: InMemoryAppointments, config: TestConfig) -> Self {
        init_test_tracing();

        let service_offering_id = Uuid::new_v4();
        let availability = Arc::new(InMemoryAvailability::default());
        availability.add_block(service_offering_id, Weekday::Mon, (9, 0), (10, 0));

        let appointments = Arc::new(appointments);
        let clock = Arc::new(FixedClock::new(at(2025, 6, 16, 8, 0)));
        let service = BookingService::new(
            availability.clone(),
            appointments.clone(),
            clock.clone(),
            &config.to_app_config(),
        );

        Self {
            service,
            availability,
            appointments,
            clock,
            service_offering_id,
            provider_id: Uuid::new_v4(),
        }
    }
}
