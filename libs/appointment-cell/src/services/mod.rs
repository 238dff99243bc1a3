pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod payment;
pub mod validation;

pub use booking::BookingService;
pub use conflict::ConflictDetectionService;
pub use lifecycle::{transition_status, AppointmentLifecycleService};
pub use payment::PaymentService;
pub use validation::validate_scheduled_at;
