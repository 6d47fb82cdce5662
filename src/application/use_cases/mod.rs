pub mod notification;
pub mod payment;
pub mod plan;
pub mod player_plan;
pub mod recurring_billing;
