use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use shared_models::GatewayError;

/// Length of every bookable slot.
pub const SLOT_MINUTES: i64 = 30;

/// Slots starting up to this many minutes before "now" stay bookable today.
pub const TODAY_GRACE_MINUTES: i64 = 5;

pub const DEFAULT_WINDOW_DAYS: u32 = 60;

// ==============================================================================
// WEEKLY AVAILABILITY
// ==============================================================================

/// One recurring weekly block of open hours for a service offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub id: Uuid,
    pub service_offering_id: Uuid,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl WeeklyAvailability {
    pub fn has_valid_range(&self) -> bool {
        self.start_time < self.end_time
    }

    pub fn overlaps(&self, day_of_week: Weekday, start_time: NaiveTime, end_time: NaiveTime) -> bool {
        self.day_of_week == day_of_week && start_time < self.end_time && end_time > self.start_time
    }
}

/// Payload handed to the gateway when a block is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAvailability {
    pub service_offering_id: Uuid,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityPatch {
    pub day_of_week: Option<Weekday>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl AvailabilityPatch {
    pub fn is_empty(&self) -> bool {
        self.day_of_week.is_none() && self.start_time.is_none() && self.end_time.is_none()
    }
}

// ==============================================================================
// REQUEST MODELS (UI encoding: 0 = Sunday .. 6 = Saturday)
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityRequest {
    pub service_offering_id: Uuid,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub day_of_week: Option<i32>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

// ==============================================================================
// SLOTS
// ==============================================================================

/// A concrete bookable `(date, start time)` pair. Always `SLOT_MINUTES` long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
}

impl Slot {
    pub fn new(date: NaiveDate, start_time: NaiveTime) -> Self {
        Self { date, start_time }
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.starts_at() + Duration::minutes(SLOT_MINUTES)
    }

    /// `HH:mm`, the way times are shown to patients.
    pub fn label(&self) -> String {
        self.start_time.format("%H:%M").to_string()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.label())
    }
}

/// Inputs of one slot enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOptions {
    pub now: NaiveDateTime,
    /// Days covered starting with today; the day `today + window_days` is excluded.
    pub window_days: u32,
    /// Restrict enumeration to a single date.
    pub selected_date: Option<NaiveDate>,
}

impl SlotOptions {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            window_days: DEFAULT_WINDOW_DAYS,
            selected_date: None,
        }
    }

    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days;
        self
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.selected_date = Some(date);
        self
    }
}

/// Outcome of checking a requested start time against the generated slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotCheck {
    Available(Slot),
    /// On the schedule grid, but already behind "now" and the grace window.
    Stale,
    Unavailable,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    #[error("Day of week must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    InvalidDayOfWeek(i32),

    #[error("Start time {start} must be before end time {end}")]
    InvalidAvailabilityRange { start: NaiveTime, end: NaiveTime },

    #[error("Availability conflicts with existing schedule on {day}")]
    OverlappingAvailability { day: Weekday, existing_id: Uuid },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
