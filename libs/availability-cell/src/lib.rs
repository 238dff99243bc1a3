pub mod gateway;
pub mod models;
pub mod services;
pub mod weekday;

// Re-export the slot engine surface for the booking side
pub use gateway::{AvailabilityGateway, SupabaseAvailabilityGateway};
pub use models::{
    AvailabilityError, AvailabilityPatch, NewAvailability, Slot, SlotCheck, SlotOptions,
    WeeklyAvailability, DEFAULT_WINDOW_DAYS, SLOT_MINUTES, TODAY_GRACE_MINUTES,
};
pub use services::{generate_slots, AvailabilityService, SlotGenerator};
