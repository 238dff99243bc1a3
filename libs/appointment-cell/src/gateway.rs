use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::SupabaseClient;
use shared_models::GatewayError;

use crate::models::{Appointment, AppointmentPatch, AppointmentStatus, NewAppointment};

/// Remote store of appointments.
#[async_trait]
pub trait AppointmentGateway: Send + Sync {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, GatewayError>;

    async fn get(&self, id: Uuid) -> Result<Appointment, GatewayError>;

    async fn update(&self, id: Uuid, patch: AppointmentPatch) -> Result<Appointment, GatewayError>;

    async fn set_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, GatewayError>;

    /// Pending or confirmed appointments of a provider starting exactly at `scheduled_at`.
    async fn find_active_at(
        &self,
        provider_id: Uuid,
        scheduled_at: NaiveDateTime,
    ) -> Result<Vec<Appointment>, GatewayError>;
}

const APPOINTMENTS_PATH: &str = "/rest/v1/appointments";

fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

pub struct SupabaseAppointmentGateway {
    supabase: Arc<SupabaseClient>,
    auth_token: String,
}

impl SupabaseAppointmentGateway {
    pub fn new(supabase: Arc<SupabaseClient>, auth_token: impl Into<String>) -> Self {
        Self {
            supabase,
            auth_token: auth_token.into(),
        }
    }

    fn first(rows: Vec<Appointment>, context: &str) -> Result<Appointment, GatewayError> {
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound(context.to_string()))
    }

    async fn patch(&self, id: Uuid, body: Value) -> Result<Appointment, GatewayError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, id);
        let rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(&self.auth_token),
                Some(body),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        Self::first(rows, "Appointment not found")
    }
}

#[async_trait]
impl AppointmentGateway for SupabaseAppointmentGateway {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, GatewayError> {
        debug!(
            "Inserting appointment for provider {} at {}",
            appointment.provider_id, appointment.scheduled_at
        );

        let appointment_data = json!({
            "patient_id": appointment.patient_id,
            "provider_id": appointment.provider_id,
            "service_offering_id": appointment.service_offering_id,
            "scheduled_at": format_timestamp(appointment.scheduled_at),
            "status": appointment.status.as_str(),
            "payment_status": appointment.payment_status.as_str(),
            "payment_method": appointment.payment_method.as_str(),
            "notes": appointment.notes,
        });

        let rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                APPOINTMENTS_PATH,
                Some(&self.auth_token),
                Some(appointment_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        Self::first(rows, "Failed to create appointment")
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, GatewayError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, id);
        let rows: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, Some(&self.auth_token), None)
            .await?;

        Self::first(rows, "Appointment not found")
    }

    async fn update(&self, id: Uuid, patch: AppointmentPatch) -> Result<Appointment, GatewayError> {
        let mut update_data = serde_json::Map::new();

        if let Some(scheduled_at) = patch.scheduled_at {
            update_data.insert("scheduled_at".to_string(), json!(format_timestamp(scheduled_at)));
        }
        if let Some(payment_status) = patch.payment_status {
            update_data.insert("payment_status".to_string(), json!(payment_status.as_str()));
        }
        if let Some(notes) = patch.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }

        self.patch(id, Value::Object(update_data)).await
    }

    async fn set_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, GatewayError> {
        debug!("Setting appointment {} status to {}", id, status);
        self.patch(id, json!({ "status": status.as_str() })).await
    }

    async fn find_active_at(
        &self,
        provider_id: Uuid,
        scheduled_at: NaiveDateTime,
    ) -> Result<Vec<Appointment>, GatewayError> {
        let path = format!(
            "{}?provider_id=eq.{}&scheduled_at=eq.{}&status=in.(pending,confirmed)",
            APPOINTMENTS_PATH,
            provider_id,
            format_timestamp(scheduled_at)
        );

        self.supabase
            .request(Method::GET, &path, Some(&self.auth_token), None)
            .await
    }
}
