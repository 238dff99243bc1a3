pub mod gateway;
pub mod models;
pub mod services;

pub use gateway::{AppointmentGateway, SupabaseAppointmentGateway};
pub use models::{
    Appointment, AppointmentAction, AppointmentPatch, AppointmentStatus, BookAppointmentRequest,
    BookingError, CancelledBy, LifecycleError, NewAppointment, PaymentMethod, PaymentStatus,
};
pub use services::{
    transition_status, validate_scheduled_at, AppointmentLifecycleService, BookingService,
    ConflictDetectionService, PaymentService,
};
