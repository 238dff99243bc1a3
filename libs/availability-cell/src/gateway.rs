use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveTime;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::SupabaseClient;
use shared_models::GatewayError;

use crate::models::{AvailabilityError, AvailabilityPatch, NewAvailability, WeeklyAvailability};
use crate::weekday;

/// Remote store of weekly availability blocks.
#[async_trait]
pub trait AvailabilityGateway: Send + Sync {
    async fn list(&self, service_offering_id: Uuid) -> Result<Vec<WeeklyAvailability>, GatewayError>;

    async fn get(&self, id: Uuid) -> Result<WeeklyAvailability, GatewayError>;

    async fn create(&self, availability: NewAvailability) -> Result<WeeklyAvailability, GatewayError>;

    async fn update(&self, id: Uuid, patch: AvailabilityPatch) -> Result<WeeklyAvailability, GatewayError>;

    async fn delete(&self, id: Uuid) -> Result<(), GatewayError>;
}

/// Row shape of `service_availability` (storage weekday encoding).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRow {
    pub id: Uuid,
    pub service_offering_id: Uuid,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl TryFrom<AvailabilityRow> for WeeklyAvailability {
    type Error = AvailabilityError;

    fn try_from(row: AvailabilityRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            service_offering_id: row.service_offering_id,
            day_of_week: weekday::from_storage_index(row.day_of_week)?,
            start_time: row.start_time,
            end_time: row.end_time,
        })
    }
}

const AVAILABILITY_PATH: &str = "/rest/v1/service_availability";

pub struct SupabaseAvailabilityGateway {
    supabase: Arc<SupabaseClient>,
    auth_token: String,
}

impl SupabaseAvailabilityGateway {
    pub fn new(supabase: Arc<SupabaseClient>, auth_token: impl Into<String>) -> Self {
        Self {
            supabase,
            auth_token: auth_token.into(),
        }
    }

    fn first_row(rows: Vec<AvailabilityRow>, context: &str) -> Result<WeeklyAvailability, GatewayError> {
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound(context.to_string()))?;

        WeeklyAvailability::try_from(row).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

#[async_trait]
impl AvailabilityGateway for SupabaseAvailabilityGateway {
    async fn list(&self, service_offering_id: Uuid) -> Result<Vec<WeeklyAvailability>, GatewayError> {
        debug!("Fetching availability for service offering: {}", service_offering_id);

        let path = format!(
            "{}?service_offering_id=eq.{}&order=day_of_week.asc,start_time.asc",
            AVAILABILITY_PATH, service_offering_id
        );
        let rows: Vec<AvailabilityRow> = self
            .supabase
            .request(Method::GET, &path, Some(&self.auth_token), None)
            .await?;

        let availabilities = rows
            .into_iter()
            .filter_map(|row| {
                let row_id = row.id;
                match WeeklyAvailability::try_from(row) {
                    Ok(availability) => Some(availability),
                    Err(e) => {
                        warn!("Skipping availability row {}: {}", row_id, e);
                        None
                    }
                }
            })
            .collect();

        Ok(availabilities)
    }

    async fn get(&self, id: Uuid) -> Result<WeeklyAvailability, GatewayError> {
        let path = format!("{}?id=eq.{}", AVAILABILITY_PATH, id);
        let rows: Vec<AvailabilityRow> = self
            .supabase
            .request(Method::GET, &path, Some(&self.auth_token), None)
            .await?;

        Self::first_row(rows, "Availability not found")
    }

    async fn create(&self, availability: NewAvailability) -> Result<WeeklyAvailability, GatewayError> {
        let availability_data = json!({
            "service_offering_id": availability.service_offering_id,
            "day_of_week": weekday::to_storage_index(availability.day_of_week),
            "start_time": format_time(availability.start_time),
            "end_time": format_time(availability.end_time),
        });

        let rows: Vec<AvailabilityRow> = self
            .supabase
            .request_with_headers(
                Method::POST,
                AVAILABILITY_PATH,
                Some(&self.auth_token),
                Some(availability_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        Self::first_row(rows, "Failed to create availability")
    }

    async fn update(&self, id: Uuid, patch: AvailabilityPatch) -> Result<WeeklyAvailability, GatewayError> {
        let mut update_data = serde_json::Map::new();

        if let Some(day) = patch.day_of_week {
            update_data.insert("day_of_week".to_string(), json!(weekday::to_storage_index(day)));
        }
        if let Some(start) = patch.start_time {
            update_data.insert("start_time".to_string(), json!(format_time(start)));
        }
        if let Some(end) = patch.end_time {
            update_data.insert("end_time".to_string(), json!(format_time(end)));
        }

        let path = format!("{}?id=eq.{}", AVAILABILITY_PATH, id);
        let rows: Vec<AvailabilityRow> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(&self.auth_token),
                Some(Value::Object(update_data)),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        Self::first_row(rows, "Availability not found")
    }

    async fn delete(&self, id: Uuid) -> Result<(), GatewayError> {
        debug!("Deleting availability: {}", id);

        let path = format!("{}?id=eq.{}", AVAILABILITY_PATH, id);
        self.supabase
            .execute(Method::DELETE, &path, Some(&self.auth_token), None)
            .await
    }
}
