//! Weekday encodings at the system boundaries.
//!
//! Inside the crate a weekday is always a `chrono::Weekday`. Two integer
//! encodings exist outside of it:
//!
//! * UI: `0 = Sunday .. 6 = Saturday`
//! * storage: `1 = Monday .. 7 = Sunday` (ISO 8601)
//!
//! Older storage rows were written with the UI encoding, so `0` is read back
//! as Sunday. `0` is not a valid ISO value, which keeps the read unambiguous.
//! Writes always use the ISO encoding.

use chrono::Weekday;

use crate::models::AvailabilityError;

pub fn from_ui_index(index: i32) -> Result<Weekday, AvailabilityError> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(AvailabilityError::InvalidDayOfWeek(other)),
    }
}

pub fn to_ui_index(day: Weekday) -> i32 {
    day.num_days_from_sunday() as i32
}

pub fn from_storage_index(index: i32) -> Result<Weekday, AvailabilityError> {
    match index {
        // legacy rows
        0 => Ok(Weekday::Sun),
        1..=7 => from_ui_index(index % 7),
        other => Err(AvailabilityError::InvalidDayOfWeek(other)),
    }
}

pub fn to_storage_index(day: Weekday) -> i32 {
    day.number_from_monday() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const WEEK: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    #[test]
    fn test_ui_encoding() {
        assert_eq!(from_ui_index(0).unwrap(), Weekday::Sun);
        assert_eq!(from_ui_index(1).unwrap(), Weekday::Mon);
        assert_eq!(from_ui_index(6).unwrap(), Weekday::Sat);
        assert_matches!(from_ui_index(7), Err(AvailabilityError::InvalidDayOfWeek(7)));
        assert_matches!(from_ui_index(-1), Err(AvailabilityError::InvalidDayOfWeek(-1)));
    }

    #[test]
    fn test_storage_encoding() {
        assert_eq!(from_storage_index(1).unwrap(), Weekday::Mon);
        assert_eq!(from_storage_index(6).unwrap(), Weekday::Sat);
        assert_eq!(from_storage_index(7).unwrap(), Weekday::Sun);
        assert_eq!(from_storage_index(0).unwrap(), Weekday::Sun);
        assert_matches!(from_storage_index(8), Err(AvailabilityError::InvalidDayOfWeek(8)));
    }

    #[test]
    fn test_every_weekday_survives_both_boundaries() {
        for day in WEEK {
            assert_eq!(from_ui_index(to_ui_index(day)).unwrap(), day);
            assert_eq!(from_storage_index(to_storage_index(day)).unwrap(), day);
        }
        assert_eq!(to_storage_index(Weekday::Sun), 7);
        assert_eq!(to_ui_index(Weekday::Sun), 0);
    }
}
