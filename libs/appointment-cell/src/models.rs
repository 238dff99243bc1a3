use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::GatewayError;

// ==============================================================================
// APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub provider_id: Uuid,
    pub service_offering_id: Uuid,
    /// Clinic wall-clock start, always on a 30-minute slot boundary when booked.
    #[serde(deserialize_with = "wall_clock::deserialize")]
    pub scheduled_at: NaiveDateTime,
    pub status: AppointmentStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Stored timestamps arrive either bare (`timestamp`) or with an offset
/// (`timestamptz`). The offset is dropped and the wall-clock reading kept.
mod wall_clock {
    use chrono::{DateTime, NaiveDateTime};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDateTime, String> {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Ok(with_offset.naive_local());
        }
        raw.parse::<NaiveDateTime>()
            .map_err(|e| format!("invalid timestamp {:?}: {}", raw, e))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled appointments accept no further changes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    /// Statuses that still hold their slot.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment progress, tracked independently of [`AppointmentStatus`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    None,
    Pending,
    Approved,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::None => "none",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Online,
    #[default]
    InPerson,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::InPerson => "in_person",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    Patient,
    Provider,
}

/// Actions a UI may offer for an appointment in its current state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentAction {
    Confirm,
    Cancel,
    Complete,
    Reschedule,
    PayNow,
}

// ==============================================================================
// REQUEST / PAYLOAD MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub provider_id: Uuid,
    pub service_offering_id: Uuid,
    pub scheduled_at: NaiveDateTime,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Insert payload handed to the appointment store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub provider_id: Uuid,
    pub service_offering_id: Uuid,
    pub scheduled_at: NaiveDateTime,
    pub status: AppointmentStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Partial update; status changes go through `set_status` instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppointmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AppointmentPatch {
    pub fn reschedule(scheduled_at: NaiveDateTime) -> Self {
        Self {
            scheduled_at: Some(scheduled_at),
            ..Self::default()
        }
    }

    pub fn payment(payment_status: PaymentStatus) -> Self {
        Self {
            payment_status: Some(payment_status),
            ..Self::default()
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookingError {
    #[error("No availability configured for this service")]
    NoAvailabilityConfigured,

    #[error("Appointment slot not available: {requested}")]
    SlotNotAvailable { requested: NaiveDateTime },

    #[error("Appointment slot has already passed: {requested}")]
    StaleSlot { requested: NaiveDateTime },

    #[error("Appointment slot already taken: {requested}")]
    SlotAlreadyTaken { requested: NaiveDateTime },

    #[error("Appointment cannot be rescheduled in current status: {0}")]
    NotReschedulable(AppointmentStatus),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl BookingError {
    /// The caller should ask the user for a different time.
    pub fn requires_new_time(&self) -> bool {
        matches!(
            self,
            BookingError::SlotNotAvailable { .. }
                | BookingError::StaleSlot { .. }
                | BookingError::SlotAlreadyTaken { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
