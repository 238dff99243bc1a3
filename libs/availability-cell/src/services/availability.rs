use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Weekday};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_utils::{Clock, SystemClock};

use crate::gateway::{AvailabilityGateway, SupabaseAvailabilityGateway};
use crate::models::{
    AvailabilityError, AvailabilityPatch, CreateAvailabilityRequest, NewAvailability, Slot,
    SlotOptions, UpdateAvailabilityRequest, WeeklyAvailability,
};
use crate::services::slots::SlotGenerator;
use crate::weekday;

pub struct AvailabilityService {
    gateway: Arc<dyn AvailabilityGateway>,
    clock: Arc<dyn Clock>,
    window_days: u32,
}

impl AvailabilityService {
    pub fn new(gateway: Arc<dyn AvailabilityGateway>, clock: Arc<dyn Clock>, config: &AppConfig) -> Self {
        Self {
            gateway,
            clock,
            window_days: config.booking_window_days,
        }
    }

    /// Service backed by the Supabase store and the system clock.
    pub fn with_supabase(config: &AppConfig, auth_token: &str) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let gateway = Arc::new(SupabaseAvailabilityGateway::new(supabase, auth_token));
        Self::new(gateway, Arc::new(SystemClock), config)
    }

    pub async fn list_availability(
        &self,
        service_offering_id: Uuid,
    ) -> Result<Vec<WeeklyAvailability>, AvailabilityError> {
        Ok(self.gateway.list(service_offering_id).await?)
    }

    /// Create a weekly block; the request carries the UI weekday encoding.
    pub async fn create_availability(
        &self,
        request: CreateAvailabilityRequest,
    ) -> Result<WeeklyAvailability, AvailabilityError> {
        debug!("Creating availability for service offering: {}", request.service_offering_id);

        let day_of_week = weekday::from_ui_index(request.day_of_week)?;
        validate_range(request.start_time, request.end_time)?;

        let existing = self.gateway.list(request.service_offering_id).await?;
        check_availability_conflicts(&existing, day_of_week, request.start_time, request.end_time, None)?;

        let availability = self
            .gateway
            .create(NewAvailability {
                service_offering_id: request.service_offering_id,
                day_of_week,
                start_time: request.start_time,
                end_time: request.end_time,
            })
            .await?;

        info!("Availability created with ID: {}", availability.id);
        Ok(availability)
    }

    pub async fn update_availability(
        &self,
        availability_id: Uuid,
        request: UpdateAvailabilityRequest,
    ) -> Result<WeeklyAvailability, AvailabilityError> {
        debug!("Updating availability: {}", availability_id);

        let current = self.gateway.get(availability_id).await?;

        let day_of_week = request
            .day_of_week
            .map(weekday::from_ui_index)
            .transpose()?;
        let patch = AvailabilityPatch {
            day_of_week,
            start_time: request.start_time,
            end_time: request.end_time,
        };

        if patch.is_empty() {
            return Ok(current);
        }

        let day = patch.day_of_week.unwrap_or(current.day_of_week);
        let start_time = patch.start_time.unwrap_or(current.start_time);
        let end_time = patch.end_time.unwrap_or(current.end_time);
        validate_range(start_time, end_time)?;

        let siblings = self.gateway.list(current.service_offering_id).await?;
        check_availability_conflicts(&siblings, day, start_time, end_time, Some(availability_id))?;

        Ok(self.gateway.update(availability_id, patch).await?)
    }

    pub async fn delete_availability(&self, availability_id: Uuid) -> Result<(), AvailabilityError> {
        debug!("Deleting availability: {}", availability_id);

        // Booked appointments keep their time; only future slot generation changes.
        self.gateway.delete(availability_id).await?;
        Ok(())
    }

    pub async fn get_available_dates(
        &self,
        service_offering_id: Uuid,
    ) -> Result<Vec<NaiveDate>, AvailabilityError> {
        let availability = self.gateway.list(service_offering_id).await?;
        let generator = SlotGenerator::new(&availability, self.slot_options(None));

        Ok(generator.available_dates().collect())
    }

    /// Slots for one offering, optionally narrowed to a single date.
    pub async fn get_available_slots(
        &self,
        service_offering_id: Uuid,
        selected_date: Option<NaiveDate>,
    ) -> Result<Vec<Slot>, AvailabilityError> {
        debug!(
            "Calculating available slots for service offering {} (date: {:?})",
            service_offering_id, selected_date
        );

        let availability = self.gateway.list(service_offering_id).await?;
        let generator = SlotGenerator::new(&availability, self.slot_options(selected_date));
        let slots: Vec<Slot> = generator.slots().collect();

        debug!("Found {} available slots", slots.len());
        Ok(slots)
    }

    pub fn slot_options(&self, selected_date: Option<NaiveDate>) -> SlotOptions {
        let options = SlotOptions::new(self.clock.now()).with_window_days(self.window_days);
        match selected_date {
            Some(date) => options.on_date(date),
            None => options,
        }
    }
}

fn validate_range(start: NaiveTime, end: NaiveTime) -> Result<(), AvailabilityError> {
    if start >= end {
        return Err(AvailabilityError::InvalidAvailabilityRange { start, end });
    }
    Ok(())
}

fn check_availability_conflicts(
    existing: &[WeeklyAvailability],
    day_of_week: Weekday,
    start_time: NaiveTime,
    end_time: NaiveTime,
    exclude_id: Option<Uuid>,
) -> Result<(), AvailabilityError> {
    let conflict = existing
        .iter()
        .filter(|avail| Some(avail.id) != exclude_id)
        .find(|avail| avail.overlaps(day_of_week, start_time, end_time));

    if let Some(avail) = conflict {
        warn!(
            "Availability {} - {} on {} overlaps existing block {}",
            start_time, end_time, day_of_week, avail.id
        );
        return Err(AvailabilityError::OverlappingAvailability {
            day: day_of_week,
            existing_id: avail.id,
        });
    }

    Ok(())
}
