use chrono::NaiveDateTime;
use tracing::{debug, warn};

use availability_cell::{Slot, SlotCheck, SlotGenerator, SlotOptions, WeeklyAvailability};

use crate::models::BookingError;

/// Check that `scheduled_at` is a slot the generator would offer right now.
///
/// Shared by booking and rescheduling so both see the same grid, the same
/// Sunday closure and the same today cutoff. Off-grid times are rejected,
/// never rounded.
pub fn validate_scheduled_at(
    availability: &[WeeklyAvailability],
    scheduled_at: NaiveDateTime,
    now: NaiveDateTime,
    window_days: u32,
) -> Result<Slot, BookingError> {
    let options = SlotOptions::new(now)
        .with_window_days(window_days)
        .on_date(scheduled_at.date());
    let generator = SlotGenerator::new(availability, options);

    // Rows with an empty range count as no availability at all
    if generator.is_empty() {
        warn!("No usable availability configured; rejecting {}", scheduled_at);
        return Err(BookingError::NoAvailabilityConfigured);
    }

    match generator.check(scheduled_at) {
        SlotCheck::Available(slot) => {
            debug!("Requested time {} matches slot {}", scheduled_at, slot);
            Ok(slot)
        }
        SlotCheck::Stale => Err(BookingError::StaleSlot { requested: scheduled_at }),
        SlotCheck::Unavailable => Err(BookingError::SlotNotAvailable { requested: scheduled_at }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, NaiveTime, Weekday};
    use uuid::Uuid;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn monday_morning() -> Vec<WeeklyAvailability> {
        vec![WeeklyAvailability {
            id: Uuid::new_v4(),
            service_offering_id: Uuid::new_v4(),
            day_of_week: Weekday::Mon,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        }]
    }

    #[test]
    fn test_on_grid_time_is_accepted() {
        let slot = validate_scheduled_at(&monday_morning(), at(16, 9, 30), at(16, 8, 0), 60).unwrap();
        assert_eq!(slot.label(), "09:30");
    }

    #[test]
    fn test_seconds_are_not_rounded() {
        let requested = at(16, 9, 0) + chrono::Duration::seconds(1);
        assert_matches!(
            validate_scheduled_at(&monday_morning(), requested, at(16, 8, 0), 60),
            Err(BookingError::SlotNotAvailable { .. })
        );
    }

    #[test]
    fn test_only_empty_ranges_means_no_availability() {
        let mut blocks = monday_morning();
        blocks[0].end_time = blocks[0].start_time;

        assert_matches!(
            validate_scheduled_at(&blocks, at(16, 9, 0), at(16, 8, 0), 60),
            Err(BookingError::NoAvailabilityConfigured)
        );
        assert_matches!(
            validate_scheduled_at(&[], at(16, 9, 0), at(16, 8, 0), 60),
            Err(BookingError::NoAvailabilityConfigured)
        );
    }

    #[test]
    fn test_next_week_is_outside_a_one_day_window() {
        assert_matches!(
            validate_scheduled_at(&monday_morning(), at(23, 9, 0), at(16, 8, 0), 1),
            Err(BookingError::SlotNotAvailable { .. })
        );
    }
}
