pub mod billing_interval;
pub mod notification_type;
pub mod payment_status;
pub mod payment_type;
pub mod role;
