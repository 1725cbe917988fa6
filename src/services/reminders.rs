//! Due-date reminder predicates for the dashboard.
//!
//! All three predicates require the order to be incomplete. They are pure
//! functions of `(due_date, today)` so the dashboard can classify an order
//! set in one pass.

use chrono::{Days, NaiveDate};

/// Order is overdue: incomplete and due strictly before today.
pub fn is_overdue(is_completed: bool, due_date: NaiveDate, today: NaiveDate) -> bool {
    !is_completed && due_date < today
}

/// Order is due exactly tomorrow.
pub fn is_due_tomorrow(is_completed: bool, due_date: NaiveDate, today: NaiveDate) -> bool {
    !is_completed && Some(due_date) == today.checked_add_days(Days::new(1))
}

/// Order is due soon: strictly between today and three days from now.
/// Note that due-tomorrow is a subset of due-soon.
pub fn is_due_soon(is_completed: bool, due_date: NaiveDate, today: NaiveDate) -> bool {
    if is_completed {
        return false;
    }
    match today.checked_add_days(Days::new(3)) {
        Some(horizon) => due_date > today && due_date < horizon,
        None => false,
    }
}
