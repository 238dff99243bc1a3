use tracing::debug;

use crate::models::{Appointment, PaymentMethod, PaymentStatus};

/// Payment overlay. Never reads or changes the lifecycle status.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentService;

impl PaymentService {
    pub fn new() -> Self {
        Self
    }

    /// "Pay now" is offered for online-paid appointments that are not yet approved.
    pub fn can_pay_now(&self, appointment: &Appointment) -> bool {
        appointment.payment_method == PaymentMethod::Online
            && matches!(
                appointment.payment_status,
                PaymentStatus::None | PaymentStatus::Pending | PaymentStatus::Rejected
            )
    }

    /// Payment status a freshly booked appointment should move to once created.
    pub fn initial_status(&self, method: PaymentMethod) -> PaymentStatus {
        match method {
            PaymentMethod::Online => PaymentStatus::Pending,
            PaymentMethod::InPerson => PaymentStatus::None,
        }
    }

    pub fn apply_payment_status(&self, appointment: &Appointment, payment_status: PaymentStatus) -> Appointment {
        debug!(
            "Payment status for appointment {}: {} -> {}",
            appointment.id, appointment.payment_status, payment_status
        );

        Appointment {
            payment_status,
            ..appointment.clone()
        }
    }
}
