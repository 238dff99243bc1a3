use std::sync::Once;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use shared_config::AppConfig;

static TRACING: Once = Once::new();

/// Install a `fmt` subscriber once per test binary. Honors `RUST_LOG`.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
            ))
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub booking_window_days: u32,
    pub prevent_double_booking: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            booking_window_days: 60,
            prevent_double_booking: true,
        }
    }
}

impl TestConfig {
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            booking_window_days: self.booking_window_days,
            prevent_double_booking: self.prevent_double_booking,
        }
    }
}

/// Calendar helper for fixtures: 2025-06-16 is a Monday.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid fixture time")
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(year, month, day).and_time(time(hour, minute))
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    /// A `service_availability` row in storage encoding (1=Monday..7=Sunday).
    pub fn availability_row(
        id: Uuid,
        service_offering_id: Uuid,
        storage_day: i32,
        start_time: &str,
        end_time: &str,
    ) -> Value {
        json!({
            "id": id,
            "service_offering_id": service_offering_id,
            "day_of_week": storage_day,
            "start_time": start_time,
            "end_time": end_time,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn appointment_row(
        id: Uuid,
        patient_id: Uuid,
        provider_id: Uuid,
        service_offering_id: Uuid,
        scheduled_at: &str,
        status: &str,
        payment_status: &str,
    ) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "provider_id": provider_id,
            "service_offering_id": service_offering_id,
            "scheduled_at": scheduled_at,
            "status": status,
            "payment_status": payment_status,
            "payment_method": "in_person",
            "notes": null,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
