// libs/availability-cell/src/services/slots.rs
//
// Recurring weekly availability -> concrete bookable slots.
// Pure: no I/O, no clock reads. "now" arrives through SlotOptions.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use tracing::debug;

use crate::models::{Slot, SlotCheck, SlotOptions, WeeklyAvailability, SLOT_MINUTES, TODAY_GRACE_MINUTES};

/// An availability block reduced to minutes since midnight.
#[derive(Debug, Clone, Copy)]
struct Block {
    day: Weekday,
    start_minute: i64,
    end_minute: i64,
}

impl Block {
    fn slot_starts(&self) -> impl Iterator<Item = i64> + '_ {
        (0..)
            .map(move |step| self.start_minute + step * SLOT_MINUTES)
            .take_while(move |minute| minute + SLOT_MINUTES <= self.end_minute)
    }

    fn is_on_grid(&self, minute: i64) -> bool {
        minute >= self.start_minute
            && minute + SLOT_MINUTES <= self.end_minute
            && (minute - self.start_minute) % SLOT_MINUTES == 0
    }
}

/// Enumerates the bookable slots of one service offering.
///
/// The generator is immutable; `available_dates` and `slots` borrow it and
/// start over on every call, so the same generator can be walked repeatedly
/// and always yields the same sequence.
#[derive(Debug, Clone)]
pub struct SlotGenerator {
    blocks: Vec<Block>,
    options: SlotOptions,
}

impl SlotGenerator {
    pub fn new(availability: &[WeeklyAvailability], options: SlotOptions) -> Self {
        let blocks = availability
            .iter()
            .filter_map(|avail| {
                if !avail.has_valid_range() {
                    debug!(
                        "Skipping availability {} with empty range {} - {}",
                        avail.id, avail.start_time, avail.end_time
                    );
                    return None;
                }

                Some(Block {
                    day: avail.day_of_week,
                    start_minute: minute_of_day(avail.start_time),
                    end_minute: minute_of_day(avail.end_time),
                })
            })
            .collect();

        Self { blocks, options }
    }

    pub fn options(&self) -> &SlotOptions {
        &self.options
    }

    pub fn today(&self) -> NaiveDate {
        self.options.now.date()
    }

    /// True when no usable block survived construction.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Inside `[today, today + window_days)` and matching `selected_date`, if any.
    pub fn in_window(&self, date: NaiveDate) -> bool {
        let offset = (date - self.today()).num_days();
        offset >= 0
            && offset < i64::from(self.options.window_days)
            && self.options.selected_date.map_or(true, |selected| selected == date)
    }

    /// Sundays are always closed, whatever the configured blocks say.
    fn is_open_on(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday();
        weekday != Weekday::Sun && self.blocks.iter().any(|block| block.day == weekday)
    }

    pub fn is_available_date(&self, date: NaiveDate) -> bool {
        self.in_window(date) && self.is_open_on(date)
    }

    pub fn available_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.today()
            .iter_days()
            .take(self.options.window_days as usize)
            .filter(move |date| self.is_available_date(*date))
    }

    /// Slots of a single date, ascending and without duplicate start times.
    pub fn slots_on(&self, date: NaiveDate) -> Vec<Slot> {
        if !self.is_available_date(date) {
            return Vec::new();
        }

        let weekday = date.weekday();
        let starts: BTreeSet<i64> = self
            .blocks
            .iter()
            .filter(|block| block.day == weekday)
            .flat_map(|block| block.slot_starts())
            .collect();

        let cutoff = (date == self.today()).then(|| self.cutoff());

        starts
            .into_iter()
            .filter_map(time_of_minute)
            .map(|start_time| Slot::new(date, start_time))
            .filter(|slot| cutoff.map_or(true, |cutoff| slot.starts_at() > cutoff))
            .collect()
    }

    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.available_dates().flat_map(move |date| self.slots_on(date))
    }

    /// Classify a requested start time against the slots this generator yields.
    pub fn check(&self, requested: NaiveDateTime) -> SlotCheck {
        if requested.second() != 0 || requested.nanosecond() != 0 {
            return SlotCheck::Unavailable;
        }

        let slot = Slot::new(requested.date(), requested.time());
        if self.slots_on(slot.date).contains(&slot) {
            return SlotCheck::Available(slot);
        }

        if self.is_on_schedule(requested) && requested <= self.cutoff() {
            return SlotCheck::Stale;
        }

        SlotCheck::Unavailable
    }

    /// Starts at or before this instant are no longer offered.
    fn cutoff(&self) -> NaiveDateTime {
        self.options.now - Duration::minutes(TODAY_GRACE_MINUTES)
    }

    fn is_on_schedule(&self, at: NaiveDateTime) -> bool {
        let weekday = at.date().weekday();
        if weekday == Weekday::Sun {
            return false;
        }

        let minute = minute_of_day(at.time());
        self.blocks
            .iter()
            .any(|block| block.day == weekday && block.is_on_grid(minute))
    }
}

/// Pure entry point: every slot of the window, ordered by date then time.
pub fn generate_slots(availability: &[WeeklyAvailability], options: SlotOptions) -> Vec<Slot> {
    let generator = SlotGenerator::new(availability, options);
    let slots: Vec<Slot> = generator.slots().collect();
    debug!("Generated {} slots from {} availability blocks", slots.len(), availability.len());
    slots
}

fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight() / 60)
}

fn time_of_minute(minute: i64) -> Option<NaiveTime> {
    let seconds = u32::try_from(minute * 60).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
}
