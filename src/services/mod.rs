pub mod billing;
pub mod customers;
pub mod orders;
pub mod profiles;
pub mod reminders;
pub mod sharing;
pub mod tracking;
